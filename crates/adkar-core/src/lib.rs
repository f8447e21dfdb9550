pub mod config;
pub mod error;
pub mod types;

pub use config::AdkarConfig;
pub use error::{AdkarError, Result};
pub use types::*;
