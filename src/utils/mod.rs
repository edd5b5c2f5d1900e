pub mod clock;
pub mod error;
pub mod macros;

pub use error::{ApiError, Error, Result};
