//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! handing it to the calendar adapter.

use std::io::Write;
use std::path::PathBuf;

use rendezvous_domain::RendezvousError;
use rendezvous_infra::{config, GoogleCalendarAdapter};
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = format!(
        r#"{{
        "calendar": {{
            "calendar_id": "cabinet@example.fr",
            "credentials_path": "{}",
            "request_timeout_secs": 12
        }},
        "scheduling": {{
            "appointment_minutes": 20,
            "lookahead_days": 14,
            "upcoming_limit": 10,
            "cancel_candidates": 4,
            "appointment_title": "Consultation"
        }}
    }}"#,
        fixture("service_account.json").display()
    );
    let path = write_config(&json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load JSON config");

    assert_eq!(config.calendar.calendar_id, "cabinet@example.fr");
    assert_eq!(config.calendar.request_timeout_secs, 12);
    assert_eq!(config.calendar.timezone, "Europe/Paris");
    assert_eq!(config.scheduling.appointment_minutes, 20);
    assert_eq!(config.scheduling.lookahead_days, 14);
    assert_eq!(config.scheduling.upcoming_limit, 10);
    assert_eq!(config.scheduling.cancel_candidates, 4);
    assert_eq!(config.scheduling.appointment_title, "Consultation");

    // The adapter accepts the loaded calendar section as-is
    let adapter = GoogleCalendarAdapter::from_config(&config.calendar)
        .expect("adapter from service-account config");
    assert_eq!(adapter.calendar_id(), "cabinet@example.fr");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[calendar]
calendar_id = "primary"
timezone = "Europe/Paris"
api_base_url = "http://127.0.0.1:8089/calendar/v3"

[scheduling]
appointment_minutes = 45
"#;
    let path = write_config(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load TOML config");

    assert_eq!(config.calendar.calendar_id, "primary");
    assert_eq!(config.calendar.api_base_url, "http://127.0.0.1:8089/calendar/v3");
    assert_eq!(config.scheduling.appointment_minutes, 45);
    assert_eq!(config.scheduling.appointment_duration().unwrap(), chrono::Duration::minutes(45));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let path = write_config("{}", "json");

    let config = config::load_from_file(Some(path.clone())).expect("empty config uses defaults");

    assert_eq!(config.calendar.calendar_id, "primary");
    assert_eq!(config.calendar.credentials_path, None);
    assert_eq!(config.scheduling.appointment_minutes, 30);
    assert_eq!(config.scheduling.lookahead_days, 7);
    assert_eq!(config.scheduling.upcoming_limit, 5);
    assert_eq!(config.scheduling.cancel_candidates, 3);

    // No credentials anywhere: the adapter refuses to start
    assert!(matches!(
        GoogleCalendarAdapter::from_config(&config.calendar),
        Err(RendezvousError::Config(_))
    ));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/rendezvous.json".into()));

    match result {
        Err(RendezvousError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    match config::load_from_file(Some(path.clone())) {
        Err(RendezvousError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_unknown_timezone() {
    let path = write_config("[calendar]\ntimezone = \"Mars/Olympus\"\n", "toml");

    let result = config::load_from_file(Some(path.clone()));
    assert!(matches!(result, Err(RendezvousError::Config(_))));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_adapter_rejects_unreadable_key_file() {
    let path = write_config(
        "[calendar]\ncredentials_path = \"/nonexistent/service_account.json\"\n",
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("path is not checked at load");
    assert!(matches!(
        GoogleCalendarAdapter::from_config(&config.calendar),
        Err(RendezvousError::Config(_))
    ));

    std::fs::remove_file(path).ok();
}
