//! Common crate
//!
//! Shared types and error handling for the Floe connector crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DataType, Row, Value};
