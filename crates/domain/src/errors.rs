//! Error types used throughout the application
//!
//! Every backend fault is translated into one of these variants before it
//! reaches the scheduling logic. Callers never see the raw transport error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Rendezvous
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RendezvousError {
    /// Unrecognized or invalid time expression.
    #[error("Parse failure: {0}")]
    Parse(String),

    /// The requested interval is already taken at the backend.
    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    /// The referenced appointment no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected our credentials or scopes.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Communication or backend error with no more specific cause.
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RendezvousError {
    /// Short, stable label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_failure",
            Self::SlotConflict(_) => "slot_conflict",
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Transient(_) => "transient_failure",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Result type alias for Rendezvous operations
pub type Result<T> = std::result::Result<T, RendezvousError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = RendezvousError::SlotConflict("11/01/2024 à 14h00".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "SlotConflict");
        assert_eq!(json["message"], "11/01/2024 à 14h00");
    }

    #[test]
    fn kind_labels_are_distinct() {
        let kinds = [
            RendezvousError::Parse(String::new()).kind(),
            RendezvousError::SlotConflict(String::new()).kind(),
            RendezvousError::NotFound(String::new()).kind(),
            RendezvousError::PermissionDenied(String::new()).kind(),
            RendezvousError::Transient(String::new()).kind(),
        ];

        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
