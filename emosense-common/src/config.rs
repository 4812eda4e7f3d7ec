//! Configuration loading and service address resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Compiled default for the inference service origin.
///
/// The service also hosts the uploaded/segmented WAV files, so this address
/// doubles as the base for resolving relative audio paths in results.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8386";

/// Environment variable consulted when no CLI argument is given
pub const SERVICE_URL_ENV: &str = "EMOSENSE_SERVICE_URL";

/// Resolve the inference service base URL following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`service_url` key)
/// 4. Compiled default (fallback)
///
/// The returned URL never carries a trailing slash.
pub fn resolve_service_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return normalize_base_url(url);
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
        if !url.trim().is_empty() {
            return normalize_base_url(&url);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Some(url) = read_service_url_from(&config_path) {
            return normalize_base_url(&url);
        }
    }

    // Priority 4: Compiled default
    DEFAULT_SERVICE_URL.to_string()
}

/// Read the `service_url` key from a TOML config file, if present
pub fn read_service_url_from(config_path: &PathBuf) -> Option<String> {
    let toml_content = std::fs::read_to_string(config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&toml_content).ok()?;
    config
        .get("service_url")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Get the configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/emosense/config.toml first, then /etc/emosense/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("emosense").join("config.toml"));
        let system_config = PathBuf::from("/etc/emosense/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("emosense").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Strip any trailing slash so joins with relative paths are unambiguous
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8386/"),
            "http://127.0.0.1:8386"
        );
        assert_eq!(
            normalize_base_url("  http://host:1234  "),
            "http://host:1234"
        );
    }

    #[test]
    fn default_has_no_trailing_slash() {
        assert!(!DEFAULT_SERVICE_URL.ends_with('/'));
    }
}
