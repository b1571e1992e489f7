//! Integration tests for stampede-config

use stampede_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

const ALL_VARS: [&str; 12] = [
    "PORT",
    "STAMPEDE_ENGINE_KIND",
    "STAMPEDE_ENGINE_URL",
    "STAMPEDE_ENGINE_NAMESPACE",
    "STAMPEDE_ENGINE_TIMEOUT",
    "STAMPEDE_SHUFFLE_SEED",
    "STAMPEDE_MAX_WORKFLOW_COUNT",
    "STAMPEDE_SERVER_BIND_ADDRESS",
    "STAMPEDE_SERVER_PORT",
    "STAMPEDE_LOG_LEVEL",
    "STAMPEDE_LOG_FORMAT",
    "STAMPEDE_UNUSED",
];

/// Every known variable unset, then the given ones set
fn vars<'a>(set: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
    let mut vars: Vec<(&str, Option<&str>)> = ALL_VARS
        .iter()
        .filter(|name| !set.iter().any(|(set_name, _)| set_name == *name))
        .map(|name| (*name, None))
        .collect();
    vars.extend(set.iter().map(|(name, value)| (*name, Some(*value))));
    vars
}

#[test]
fn test_default_config_validation() {
    let config = StampedeConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    with_vars(
        vars(&[
            ("STAMPEDE_ENGINE_URL", "http://engine.internal:7243"),
            ("STAMPEDE_ENGINE_NAMESPACE", "load-tests"),
            ("STAMPEDE_ENGINE_TIMEOUT", "60"),
            ("STAMPEDE_ENGINE_KIND", "memory"),
            ("STAMPEDE_SHUFFLE_SEED", "99"),
            ("STAMPEDE_MAX_WORKFLOW_COUNT", "5000"),
            ("STAMPEDE_LOG_LEVEL", "debug"),
            ("STAMPEDE_LOG_FORMAT", "json"),
        ]),
        || {
            let config = ConfigLoader::new().from_env().unwrap();

            assert_eq!(config.engine.base_url, "http://engine.internal:7243");
            assert_eq!(config.engine.namespace, "load-tests");
            assert_eq!(config.engine.timeout, Duration::from_secs(60));
            assert_eq!(config.engine.kind, EngineKind::Memory);
            assert_eq!(config.dispatch.shuffle_seed, Some(99));
            assert_eq!(config.dispatch.max_workflow_count, 5000);
            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.logging.format, LogFormat::Json);
        },
    );
}

#[test]
fn test_port_overrides() {
    with_vars(vars(&[("PORT", "8080")]), || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert_eq!(config.server.port, 8080);
    });

    with_vars(
        vars(&[("PORT", "8080"), ("STAMPEDE_SERVER_PORT", "9090")]),
        || {
            let config = ConfigLoader::new().from_env().unwrap();
            assert_eq!(config.server.port, 9090);
        },
    );
}

#[test]
fn test_invalid_env_values_are_errors() {
    with_vars(vars(&[("STAMPEDE_ENGINE_TIMEOUT", "soon")]), || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    });

    with_vars(vars(&[("STAMPEDE_LOG_LEVEL", "loud")]), || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vars(&[("STAMPEDE_MAX_WORKFLOW_COUNT", "-1")]), || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    });

    with_vars(vars(&[("STAMPEDE_MAX_WORKFLOW_COUNT", "0")]), || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { ref domain, .. } if domain == "dispatch"));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(
        vec![
            ("LOADTEST_ENGINE_NAMESPACE", Some("custom")),
            ("STAMPEDE_ENGINE_NAMESPACE", Some("ignored")),
            ("PORT", None),
        ],
        || {
            let config = ConfigLoader::with_prefix("LOADTEST").from_env().unwrap();
            assert_eq!(config.engine.namespace, "custom");
        },
    );
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = StampedeConfig::generate_sample();
    let parsed: StampedeConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, StampedeConfig::default());
}

#[test]
fn test_load_from_file_with_env_override() {
    let yaml = r#"
engine:
  base_url: "https://engine.example.com"
  namespace: "perf"
  timeout: 15
  page_size: 250

dispatch:
  default_workflow_count: 500
  default_id_prefix: "Nightly"
  shuffle_seed: 7

server:
  port: 4000
  cors: ["http://localhost:3000"]
  enable_tracing: false

logging:
  level: warn
  format: compact
"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(vars(&[("STAMPEDE_ENGINE_NAMESPACE", "override")]), || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();

        assert_eq!(config.engine.base_url, "https://engine.example.com");
        assert_eq!(config.engine.namespace, "override");
        assert_eq!(config.engine.timeout, Duration::from_secs(15));
        assert_eq!(config.engine.page_size, 250);
        assert_eq!(config.engine.priority_task_queue, "priority-queue");
        assert_eq!(config.dispatch.default_workflow_count, 500);
        assert_eq!(config.dispatch.default_id_prefix, "Nightly");
        assert_eq!(config.dispatch.shuffle_seed, Some(7));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.cors, vec!["http://localhost:3000".to_string()]);
        assert!(!config.server.enable_tracing);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.format, LogFormat::Compact);
    });
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"engine:\n  base_url: \"not a url\"\n").unwrap();

    with_vars(vars(&[]), || {
        let err = ConfigLoader::new().from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { ref domain, .. } if domain == "engine"));
    });
}

#[test]
fn test_missing_file_is_read_error() {
    let err = ConfigLoader::new()
        .from_file("/nonexistent/stampede.yaml")
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileReadError(_)));
}
