pub mod calendar;
pub mod selector;
pub mod symbology;

pub use calendar::{get_expiration_date, ContractMonth, DeliveryCycle};
pub use selector::{build_schedule, ContractSymbol, Schedule, ScheduleEntry, ScheduleParams, YearDigits};
pub use symbology::SymbologyManager;
