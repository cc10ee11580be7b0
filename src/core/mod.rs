pub mod error;
pub mod traits;
pub mod types;

pub use error::{DecodeError, FrontMonthError, Result};
pub use traits::*;
pub use types::*;
