use std::ffi::{OsStr, OsString};
use std::sync::Mutex;

use alto_config::{
    discover_config_path, init_tracing, AltoConfig, CapturePolicy, ConfigError, LoggingConfig,
    ALTO_CONFIG_ENV_VAR, CONFIG_FILE_NAME,
};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: impl AsRef<OsStr>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(ALTO_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    assert_eq!(discover_config_path(dir.path()), None);
    let config = AltoConfig::load_for_workspace(dir.path()).unwrap();
    assert_eq!(config, AltoConfig::default());
}

#[test]
fn discovers_config_in_workspace_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(ALTO_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[refactor]\ncapture_policy = \"precise\"\n").unwrap();

    assert_eq!(discover_config_path(dir.path()), Some(path));
    let config = AltoConfig::load_for_workspace(dir.path()).unwrap();
    assert_eq!(config.refactor.capture_policy, CapturePolicy::Precise);
}

#[test]
fn env_var_overrides_discovery() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
    let custom = dir.path().join("custom.toml");
    std::fs::write(&custom, "[refactor]\ndefault_procedure_name = \"Helper\"\n").unwrap();
    let _env = EnvVarGuard::set(ALTO_CONFIG_ENV_VAR, &custom);

    let config = AltoConfig::load_for_workspace(dir.path()).unwrap();
    assert_eq!(config.refactor.default_procedure_name, "Helper");
}

#[test]
fn unreadable_file_reports_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = AltoConfig::load(&missing).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("nope.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rust_log_refines_the_configured_level() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let config = LoggingConfig {
        level: "Warning".to_owned(),
        json: false,
    };

    let _env = EnvVarGuard::set("RUST_LOG", "alto_refactor=trace");
    let filter = config.env_filter().to_string();
    assert!(filter.contains("warn"), "{filter}");
    assert!(filter.contains("alto_refactor=trace"), "{filter}");

    let _env = EnvVarGuard::unset("RUST_LOG");
    assert_eq!(config.env_filter().to_string(), "warn");
}

#[test]
fn tracing_can_be_initialised_repeatedly() {
    let config = AltoConfig::from_toml_str("[logging]\nlevel = \"debug\"\njson = true\n").unwrap();
    init_tracing(&config.logging);
    init_tracing(&LoggingConfig::default());
    tracing::debug!(target: "alto.config", "subscriber installed");
}
