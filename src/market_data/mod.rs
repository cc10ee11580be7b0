pub mod events;
pub mod normalizer;
pub mod reader;

pub use events::{DecodeSummary, TradeRecord};
pub use reader::DbnFileReader;
