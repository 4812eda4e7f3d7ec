//! Integration tests for configuration resolution
//!
//! Covers the priority order (CLI > environment > config file > default)
//! and TOML parsing. Tests that touch the process environment are
//! serialized.

use emosense_common::config::{
    read_service_url_from, resolve_service_url, DEFAULT_SERVICE_URL, SERVICE_URL_ENV,
};
use serial_test::serial;
use std::io::Write;

#[test]
#[serial]
fn cli_argument_takes_priority_over_environment() {
    std::env::set_var(SERVICE_URL_ENV, "http://env-host:9000");

    let url = resolve_service_url(Some("http://cli-host:7000/"));
    assert_eq!(url, "http://cli-host:7000");

    std::env::remove_var(SERVICE_URL_ENV);
}

#[test]
#[serial]
fn environment_used_when_no_cli_argument() {
    std::env::set_var(SERVICE_URL_ENV, "http://env-host:9000/");

    let url = resolve_service_url(None);
    assert_eq!(url, "http://env-host:9000");

    std::env::remove_var(SERVICE_URL_ENV);
}

#[test]
#[serial]
fn empty_environment_value_is_ignored() {
    std::env::set_var(SERVICE_URL_ENV, "   ");

    let url = resolve_service_url(None);
    // Falls through to config file / default; either way, not blank.
    assert!(!url.trim().is_empty());

    std::env::remove_var(SERVICE_URL_ENV);
}

#[test]
#[serial]
fn default_applies_without_cli_or_environment() {
    std::env::remove_var(SERVICE_URL_ENV);

    // No user config file in the test environment is assumed; when one
    // exists this still verifies a usable URL comes back.
    let url = resolve_service_url(None);
    assert!(url.starts_with("http"));
    assert!(!url.ends_with('/'));
}

#[test]
fn config_file_service_url_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "service_url = \"http://file-host:8000\"").unwrap();

    let url = read_service_url_from(&path);
    assert_eq!(url.as_deref(), Some("http://file-host:8000"));
}

#[test]
fn config_file_without_key_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "other_key = 42").unwrap();

    assert_eq!(read_service_url_from(&path), None);
}

#[test]
fn malformed_config_file_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "service_url = [not toml").unwrap();

    assert_eq!(read_service_url_from(&path), None);
}

#[test]
fn missing_config_file_yields_none() {
    let path = std::path::PathBuf::from("/nonexistent/emosense/config.toml");
    assert_eq!(read_service_url_from(&path), None);
}

#[test]
#[serial]
fn default_service_url_constant_is_the_fallback_shape() {
    assert_eq!(DEFAULT_SERVICE_URL, "http://127.0.0.1:8386");
}
