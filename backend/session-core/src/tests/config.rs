use crate::DEFAULT_API_BASE_URL;
use crate::config::{API_URL_ENV_VAR, ApiConfig, ClientConfig, TIMEOUT_ENV_VAR};
use crate::error::ConfigError;

use std::env;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    // SAFETY: every test touching these variables runs under #[serial].
    unsafe {
        env::remove_var(API_URL_ENV_VAR);
        env::remove_var(TIMEOUT_ENV_VAR);
    }
}

#[test]
fn given_missing_config_file_when_loading_then_returns_defaults() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().expect("temp dir");

    // WHEN: Loading
    let config = ClientConfig::load(dir.path()).expect("defaults");

    // THEN: Defaults point at the local API
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.api.timeout(), Duration::from_secs(10));
}

/// **VALUE**: Verifies a saved config loads back unchanged.
///
/// **BUG THIS CATCHES**: Would catch the atomic write leaving only the temp file
/// behind, or a serde attribute that drops a field on save.
#[test]
fn given_saved_config_when_loading_then_values_survive() {
    // GIVEN: A config with non-default values saved to disk
    let dir = TempDir::new().expect("temp dir");
    let mut config = ClientConfig::default();
    config.api = ApiConfig::new("https://portal.example.org/api/v1/").with_timeout_secs(30);
    config.save(dir.path()).expect("save");

    // WHEN: Loading it back
    let loaded = ClientConfig::load(dir.path()).expect("load");

    // THEN: Same values, no temp file left
    assert_eq!(loaded, config);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn given_corrupt_config_file_when_loading_then_returns_parse_error() {
    // GIVEN: A config file that is not JSON
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{ not json").expect("write");

    // WHEN: Loading
    let result = ClientConfig::load(dir.path());

    // THEN: Corruption is reported, not papered over with defaults
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_invalid_values_when_validating_then_returns_validation_error() {
    let cases = [
        ApiConfig::new("ftp://portal.example.org/"),
        ApiConfig::new("not a url"),
        ApiConfig::default().with_timeout_secs(0),
        ApiConfig::default().with_timeout_secs(301),
    ];

    for api in cases {
        let config = ClientConfig {
            api: api.clone(),
            ..ClientConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "expected {api:?} to be rejected"
        );
    }
}

#[test]
fn given_future_version_when_validating_then_returns_validation_error() {
    let config = ClientConfig {
        version: 99,
        ..ClientConfig::default()
    };

    assert!(config.validate().is_err());
}

/// **VALUE**: Verifies environment variables override the file.
///
/// **WHY THIS MATTERS**: The CLI is pointed at staging servers through
/// `PORTAL_API_URL` without editing the saved config.
#[test]
#[serial]
fn given_env_overrides_when_applied_then_replace_file_values() {
    // GIVEN: Both override variables set
    clear_env();
    // SAFETY: serialized with every other env-mutating test.
    unsafe {
        env::set_var(API_URL_ENV_VAR, "https://staging.example.org/api/v1/");
        env::set_var(TIMEOUT_ENV_VAR, " 42 ");
    }

    // WHEN: Applying overrides to defaults
    let mut config = ClientConfig::default();
    let result = config.apply_env_overrides();
    clear_env();

    // THEN: Both values come from the environment
    result.expect("overrides apply");
    assert_eq!(config.api.base_url, "https://staging.example.org/api/v1/");
    assert_eq!(config.api.timeout_secs, 42);
}

#[test]
#[serial]
fn given_non_numeric_timeout_env_when_applied_then_returns_validation_error() {
    clear_env();
    // SAFETY: serialized with every other env-mutating test.
    unsafe {
        env::set_var(TIMEOUT_ENV_VAR, "soon");
    }

    let result = ClientConfig::default().apply_env_overrides();
    clear_env();

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}
