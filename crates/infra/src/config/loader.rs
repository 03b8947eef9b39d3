//! Configuration loader
//!
//! Loads the calendar and scheduling configuration from environment variables
//! or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If credentials are not in the environment, falls back to loading from
//!    file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GOOGLE_SERVICE_ACCOUNT_FILE`: Service-account JSON key (required unless
//!   `GOOGLE_CALENDAR_ACCESS_TOKEN` is set)
//! - `GOOGLE_CALENDAR_ACCESS_TOKEN`: Pre-issued OAuth access token
//! - `GOOGLE_CALENDAR_ID`: Calendar identifier (default `primary`)
//! - `RENDEZVOUS_TIMEZONE`: Clinic timezone (default `Europe/Paris`)
//! - `RENDEZVOUS_API_BASE_URL`: Calendar API base URL
//! - `RENDEZVOUS_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `RENDEZVOUS_APPOINTMENT_MINUTES`: Default appointment length
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./rendezvous.toml` or `./rendezvous.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rendezvous_domain::{RendezvousConfig, RendezvousError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the credentials
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RendezvousError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value is out of range (unknown timezone, non-positive duration)
pub fn load() -> Result<RendezvousConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Credentials must be present; every other setting falls back to its
/// default.
///
/// # Errors
/// Returns `RendezvousError::Config` if credentials are missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<RendezvousConfig> {
    let access_token = std::env::var("GOOGLE_CALENDAR_ACCESS_TOKEN").ok();
    let credentials_path = match std::env::var("GOOGLE_SERVICE_ACCOUNT_FILE") {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) if access_token.is_some() => None,
        Err(_) => {
            return Err(RendezvousError::Config(
                "Missing required environment variable: GOOGLE_SERVICE_ACCOUNT_FILE".into(),
            ))
        }
    };

    let mut config = RendezvousConfig::default();
    config.calendar.credentials_path = credentials_path;
    config.calendar.access_token = access_token;

    if let Ok(calendar_id) = std::env::var("GOOGLE_CALENDAR_ID") {
        config.calendar.calendar_id = calendar_id;
    }
    if let Ok(timezone) = std::env::var("RENDEZVOUS_TIMEZONE") {
        config.calendar.timezone = timezone;
    }
    if let Ok(base_url) = std::env::var("RENDEZVOUS_API_BASE_URL") {
        config.calendar.api_base_url = base_url;
    }
    if let Some(timeout) = env_parse::<u64>("RENDEZVOUS_REQUEST_TIMEOUT_SECS")? {
        config.calendar.request_timeout_secs = timeout;
    }
    if let Some(minutes) = env_parse::<i64>("RENDEZVOUS_APPOINTMENT_MINUTES")? {
        config.scheduling.appointment_minutes = minutes;
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `RendezvousError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<RendezvousConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RendezvousError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RendezvousError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RendezvousError::Config(format!("Failed to read config file: {e}")))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<RendezvousConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RendezvousError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RendezvousError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RendezvousError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn validate(config: RendezvousConfig) -> Result<RendezvousConfig> {
    config.calendar.timezone()?;
    config.scheduling.validate()?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["rendezvous.toml", "rendezvous.json", "config.toml", "config.json"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `RendezvousError::Config` if the variable is set but does not
/// parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| RendezvousError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
