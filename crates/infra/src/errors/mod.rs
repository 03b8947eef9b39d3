//! Infrastructure error handling

pub mod conversions;

pub use conversions::{error_for_status, InfraError};
