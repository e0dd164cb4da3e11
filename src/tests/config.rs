// src/tests/config.rs
use std::fs;
use tempfile::tempdir;

use crate::config_loader::{load_config, ErrorLogConfig, LogConfig};
use crate::log_event::Level;
use crate::router::Router;
use crate::sanitizer::DEFAULT_MAX_DEPTH;

#[test]
pub fn missing_file_yields_defaults() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("absent.toml");
    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.default_module, "app");
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.error_log, ErrorLogConfig::default());
}

#[test]
pub fn toml_file_overrides_defaults() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("logroute.toml");
    fs::write(
        &path,
        r#"
default_module = "billing"
max_depth = 4

[error_log]
min_level = "warn"
print_trace = true
utc_offset_minutes = -300
"#,
    )
    .unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.default_module, "billing");
    assert_eq!(config.max_depth, 4);
    assert_eq!(config.error_log.min_level, Level::Warning);
    assert!(config.error_log.print_trace);
    assert!(config.error_log.print_context);
    assert_eq!(config.error_log.utc_offset_minutes, Some(-300));
}

#[test]
pub fn invalid_values_fail_fast() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "default_module = \"  \"\n").unwrap();
    let err = load_config(path.to_str()).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("default_module"));

    fs::write(&path, "[error_log]\nmin_level = \"loud\"\n").unwrap();
    assert!(load_config(path.to_str()).unwrap_err().is_config());
}

#[test]
pub fn validate_rejects_bad_format_and_depth() {
    let mut config = LogConfig::default();
    assert!(config.validate().is_ok());

    config.max_depth = 0;
    assert!(config.validate().is_err());

    config.max_depth = 3;
    config.error_log.date_format = "%Q".to_string();
    assert!(config.validate().is_err());

    config.error_log.date_format = "%H".to_string();
    config.error_log.utc_offset_minutes = Some(24 * 60);
    assert!(config.validate().is_err());
}

#[test]
pub fn router_from_config_uses_default_module() {
    let config = LogConfig {
        default_module: "jobs".to_string(),
        ..LogConfig::default()
    };
    let router = Router::from_config(&config);
    assert_eq!(router.default_module(), "jobs");
    assert!(!router.has_default_logger());
}

#[test]
pub fn level_parses_names_and_numbers() {
    assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warning);
    assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
    assert_eq!("1".parse::<Level>().unwrap(), Level::Debug);
    assert!("verbose".parse::<Level>().is_err());
    assert!(Level::Debug < Level::Info && Level::Warning < Level::Error);
    assert_eq!(serde_json::to_string(&Level::Warning).unwrap(), "\"WARNING\"");
    assert_eq!(serde_json::from_str::<Level>("2").unwrap(), Level::Info);
}
