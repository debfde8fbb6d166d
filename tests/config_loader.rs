use promptcanvas::config::{Config, ConfigError, ProviderConfig, ServerConfig};

/// Test that Config::default() produces the documented defaults.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.server.bind_addr, "127.0.0.1:8787");
    assert!(config.server.log_ansi);

    assert_eq!(
        config.provider.base_url,
        "https://generativelanguage.googleapis.com"
    );
    assert_eq!(config.provider.model, "gemini-2.5-flash");
    assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.provider.temperature, 0.2);
    assert_eq!(config.provider.connect_timeout_seconds, 10);
    assert_eq!(config.provider.request_timeout_seconds, 120);
    assert_eq!(config.provider.idle_timeout_seconds, 30);
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("promptcanvas/config.toml"));
}

/// Test validation passes for the default config.
#[test]
fn test_validation_passes_for_default() {
    assert!(Config::default().validate().is_ok());
}

/// Test validation fails when the bind address is not host:port.
#[test]
fn test_validation_fails_invalid_bind_addr() {
    let config = Config {
        server: ServerConfig {
            bind_addr: "not-an-address".to_string(),
            log_ansi: true,
        },
        provider: ProviderConfig::default(),
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("not-an-address"), "got: {message}");
            assert!(message.contains("host:port"), "got: {message}");
        }
        other => panic!("Expected ValidationError, got: {other:?}"),
    }
}

/// Test validation fails when the model is blank.
#[test]
fn test_validation_fails_empty_model() {
    let config = Config {
        server: ServerConfig::default(),
        provider: ProviderConfig {
            model: "  ".to_string(),
            ..ProviderConfig::default()
        },
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("model"), "got: {message}");
        }
        other => panic!("Expected ValidationError, got: {other:?}"),
    }
}

/// Test validation fails when the provider base URL is empty.
#[test]
fn test_validation_fails_empty_base_url() {
    let config = Config {
        server: ServerConfig::default(),
        provider: ProviderConfig {
            base_url: String::new(),
            ..ProviderConfig::default()
        },
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("base_url"), "got: {message}");
        }
        other => panic!("Expected ValidationError, got: {other:?}"),
    }
}

/// Test validation fails when the key variable name is empty.
#[test]
fn test_validation_fails_empty_api_key_env() {
    let config = Config {
        server: ServerConfig::default(),
        provider: ProviderConfig {
            api_key_env: String::new(),
            ..ProviderConfig::default()
        },
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("api_key_env"), "got: {message}");
        }
        other => panic!("Expected ValidationError, got: {other:?}"),
    }
}

/// Test validation fails when the temperature leaves [0, 2].
#[test]
fn test_validation_fails_temperature_out_of_range() {
    for temperature in [-0.1, 2.1] {
        let config = Config {
            server: ServerConfig::default(),
            provider: ProviderConfig {
                temperature,
                ..ProviderConfig::default()
            },
        };

        match config.validate().unwrap_err() {
            ConfigError::ValidationError { message } => {
                assert!(message.contains("range"), "got: {message}");
            }
            other => panic!("Expected ValidationError, got: {other:?}"),
        }
    }
}

/// Test validation fails when any timeout is zero.
#[test]
fn test_validation_fails_zero_timeout() {
    let config = Config {
        server: ServerConfig::default(),
        provider: ProviderConfig {
            idle_timeout_seconds: 0,
            ..ProviderConfig::default()
        },
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("idle_timeout_seconds"), "got: {message}");
            assert!(message.contains("greater than zero"), "got: {message}");
        }
        other => panic!("Expected ValidationError, got: {other:?}"),
    }
}

/// Test that a partial TOML file fills missing fields with defaults.
#[test]
fn test_parse_partial_toml_fills_defaults() {
    let toml_content = r#"
[provider]
model = "gemini-2.5-pro"
temperature = 0.7
"#;

    let config: Config = toml::from_str(toml_content).expect("Should parse valid TOML");

    assert_eq!(config.provider.model, "gemini-2.5-pro");
    assert_eq!(config.provider.temperature, 0.7);
    // Untouched fields keep their defaults.
    assert_eq!(config.server.bind_addr, "127.0.0.1:8787");
    assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.provider.idle_timeout_seconds, 30);
}

/// Test that invalid TOML produces a parse error.
#[test]
fn test_parse_invalid_toml() {
    let invalid_toml = "this is not valid toml [[[";

    let result: Result<Config, _> = toml::from_str(invalid_toml);
    assert!(result.is_err());
}

/// Test the real user flow: write a file, load it, use the values.
#[test]
fn test_load_from_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
bind_addr = "127.0.0.1:9000"
log_ansi = false

[provider]
model = "gemini-2.5-pro"
api_key_env = "MY_GEMINI_KEY"
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).expect("Should load valid config");
    assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
    assert!(!config.server.log_ansi);
    assert_eq!(config.provider.model, "gemini-2.5-pro");
    assert_eq!(config.provider.api_key_env, "MY_GEMINI_KEY");
}

/// Test that load_from reports a missing file as a read error.
#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    match Config::load_from(&path).unwrap_err() {
        ConfigError::ReadError { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected ReadError, got: {other:?}"),
    }
}

/// Test that unparseable file content surfaces as a parse error.
#[test]
fn test_load_from_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml [[[").unwrap();

    match Config::load_from(&path).unwrap_err() {
        ConfigError::ParseError { .. } => {}
        other => panic!("Expected ParseError, got: {other:?}"),
    }
}

/// Test that a file that parses but fails validation is rejected.
#[test]
fn test_load_from_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[provider]
temperature = 3.5
"#,
    )
    .unwrap();

    let err = Config::load_from(&path).unwrap_err().to_string();
    assert!(err.contains("3.5"), "got: {err}");
}

/// Test round-trip serialization/deserialization.
#[test]
fn test_config_roundtrip() {
    let original = Config::default();
    let serialized = toml::to_string(&original).expect("Should serialize");
    let deserialized: Config = toml::from_str(&serialized).expect("Should deserialize");

    assert_eq!(original.server.bind_addr, deserialized.server.bind_addr);
    assert_eq!(original.provider.model, deserialized.provider.model);
    assert_eq!(
        original.provider.idle_timeout_seconds,
        deserialized.provider.idle_timeout_seconds
    );
}
