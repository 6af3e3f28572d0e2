//! Tests for the configuration module.
//!
//! This module contains tests for configuration loading, validation, and usage.

use std::net::SocketAddr;
use std::time::Duration;

use test_case::test_case;

use super::TestFixture;
use crate::config::{limits::LimitsConfig, ConfigLoader, KapiliConfig, Validate};
use crate::error::config::ConfigError;
use crate::protocol::jsonrpc::DispatcherOptions;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = KapiliConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.request_timeout(), Some(Duration::from_secs(30)));
}

/// Test that configuration validation catches invalid values.
#[test_case(|c: &mut KapiliConfig| c.server.worker_threads = 0 ; "zero worker threads")]
#[test_case(|c: &mut KapiliConfig| c.server.name = "  ".to_string() ; "blank name")]
#[test_case(|c: &mut KapiliConfig| c.server.rpc_path = "rpc".to_string() ; "relative rpc path")]
#[test_case(|c: &mut KapiliConfig| c.server.debug_path = c.server.rpc_path.clone() ; "debug path shadows rpc path")]
#[test_case(|c: &mut KapiliConfig| c.limits.max_message_size = 0 ; "zero message size")]
#[test_case(|c: &mut KapiliConfig| c.log.level = "verbose".to_string() ; "unknown log level")]
fn test_config_validation(mutate: fn(&mut KapiliConfig)) {
    let mut config = KapiliConfig::default();
    mutate(&mut config);
    assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_debug_path_may_equal_rpc_path_when_disabled() {
    let mut config = KapiliConfig::default();
    config.server.enable_debug = false;
    config.server.debug_path = config.server.rpc_path.clone();
    assert!(config.validate().is_ok());
}

#[test]
fn test_oversized_message_limit_is_out_of_range() {
    let limits = LimitsConfig {
        max_message_size: usize::MAX,
        ..LimitsConfig::default()
    };
    assert!(matches!(
        limits.validate(),
        Err(ConfigError::ValueOutOfRange { .. })
    ));
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_file(
            "config_file_test.toml",
            r#"
            [server]
            name = "test-server"
            address = "0.0.0.0:9000"
            worker_threads = 2
            request_timeout_ms = 0

            [limits]
            max_batch_size = 10
            "#,
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_FILE").load().unwrap();

    assert_eq!(config.server.name, "test-server");
    assert_eq!(config.server.address, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
    assert_eq!(config.server.worker_threads, 2);
    assert_eq!(config.server.request_timeout(), None);
    assert_eq!(config.limits.max_batch_size, 10);

    // Other values should be defaults
    assert_eq!(config.server.rpc_path, "/rpc");
    assert_eq!(config.log.level, "info");
}

#[test]
fn test_load_json_config() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_file("config.json", r#"{ "log": { "level": "debug", "json": true } }"#)
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_JSON").load().unwrap();
    assert_eq!(config.log.level, "debug");
    assert!(config.log.json);
}

/// Test loading configuration with environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_file("config_env_test.toml", "[server]\nname = \"file-server\"\n")
        .unwrap();
    fixture.set_env("TEST_ENV__SERVER__NAME", "env-server");
    fixture.set_env("TEST_ENV__LIMITS__MAX_BATCH_SIZE", "7");

    let config = ConfigLoader::new(Some(&path), "TEST_ENV").load().unwrap();

    assert_eq!(config.server.name, "env-server");
    assert_eq!(config.limits.max_batch_size, 7);
}

#[test]
fn test_missing_file_is_reported() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.temp_dir.path().join("absent.toml");

    let err = ConfigLoader::new(Some(&path), "TEST_MISSING").load().unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(p) if p == path));
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_file("config.ini", "name = x").unwrap();

    let err = ConfigLoader::new(Some(&path), "TEST_INI").load().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

/// Test that loading an invalid configuration file returns an error.
#[test]
fn test_load_invalid_config() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_file("invalid.toml", "[server\nname = test-server\"\n")
        .unwrap();

    assert!(ConfigLoader::new(Some(&path), "TEST_INVALID").load().is_err());
}

#[test]
fn test_loaded_values_are_validated() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_file("zero.toml", "[server]\nworker_threads = 0\n")
        .unwrap();

    let err = ConfigLoader::new(Some(&path), "TEST_ZERO").load().unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_default_config_renders_as_toml() {
    let rendered = toml::to_string_pretty(&KapiliConfig::default()).unwrap();
    let parsed: KapiliConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.server.rpc_path, "/rpc");
}

#[test]
fn test_dispatcher_options_from_config() {
    let mut config = KapiliConfig::default();
    config.server.request_timeout_ms = 250;
    config.limits.max_batch_size = 3;

    let options = DispatcherOptions::from(&config);
    assert_eq!(options.request_timeout, Some(Duration::from_millis(250)));
    assert_eq!(options.max_batch_size, 3);
}
