use figment::Jail;

use logroute::config_loader::{load_config, DEFAULT_CONFIG_FILE};
use logroute::Level;

#[test]
pub fn environment_overrides_file_and_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r#"
default_module = "from_file"
max_depth = 8

[error_log]
min_level = "debug"
"#,
        )?;
        jail.set_env("LOGROUTE_MAX_DEPTH", "4");
        jail.set_env("LOGROUTE_ERROR_LOG__MIN_LEVEL", "error");

        let config = load_config(None).map_err(|e| e.to_string())?;
        assert_eq!(config.default_module, "from_file");
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.error_log.min_level, Level::Error);
        Ok(())
    });
}

#[test]
pub fn invalid_environment_value_is_a_config_error() {
    Jail::expect_with(|jail| {
        jail.set_env("LOGROUTE_DEFAULT_MODULE", " ");
        let err = load_config(None).expect_err("blank module must be rejected");
        assert!(err.is_config());
        Ok(())
    });
}
