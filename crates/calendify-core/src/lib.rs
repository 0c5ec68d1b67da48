pub mod config;
pub mod error;
pub mod model;
pub mod types;

pub use error::{CalendifyError, Result};
