//! Google Calendar integration
//!
//! Provides service-account authentication and the adapter implementing the
//! appointment repository and free/busy ports.

pub mod google;
pub mod oauth;
pub mod types;

pub use google::GoogleCalendarAdapter;
pub use oauth::{
    AccessTokenProvider, ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider,
};
