//! # Rendezvous Infrastructure
//!
//! Infrastructure implementations of core scheduling ports.
//!
//! This crate contains:
//! - Configuration loading (environment, TOML/JSON files)
//! - HTTP client with domain error classification
//! - The Google Calendar adapter and its service-account authentication
//!
//! ## Architecture
//! - Implements traits defined in `rendezvous-core`
//! - Depends on `rendezvous-domain` and `rendezvous-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::calendar::{
    AccessTokenProvider, GoogleCalendarAdapter, ServiceAccountKey, ServiceAccountTokenProvider,
    StaticTokenProvider,
};
