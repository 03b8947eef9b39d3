//! HTTP plumbing shared by the calendar integration

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
