//! Pure helpers for turning caller speech into domain values and back.

pub mod contact;
pub mod format;
pub mod time_expression;
