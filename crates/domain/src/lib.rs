//! # Rendezvous Domain
//!
//! Business domain types and models for the clinic scheduling core.
//!
//! This crate contains:
//! - Appointment, interval and availability types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The French time expression resolver and spoken date formatting
//!
//! ## Architecture
//! - No dependencies on other Rendezvous crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export time expression utilities
pub use utils::format::format_slot;
pub use utils::time_expression::{ParseFailure, ParseResult, TimeExpressionResolver};
