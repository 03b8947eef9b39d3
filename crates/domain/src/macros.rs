//! Macro for implementing Display and FromStr for status enums
//!
//! Backend payloads carry lifecycle states as plain strings. This macro keeps
//! the mapping between those strings and our enums in one declaration.
//!
//! # Example
//!
//! ```rust
//! use rendezvous_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ReminderStatus {
//!     Scheduled,
//!     Sent,
//! }
//!
//! impl_status_conversions!(ReminderStatus {
//!     Scheduled => "scheduled",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(ReminderStatus::Sent.to_string(), "sent");
//! assert_eq!("SCHEDULED".parse::<ReminderStatus>(), Ok(ReminderStatus::Scheduled));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the lowercase wire string
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
