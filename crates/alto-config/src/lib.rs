//! Configuration for the alto refactoring engine.
//!
//! Configuration lives in an `alto.toml` file at the workspace root (or the
//! path named by `ALTO_CONFIG`). Every field has a default, so an empty file
//! and a missing file behave the same.

use std::path::{Path, PathBuf};
use std::sync::Once;

use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding config discovery.
pub const ALTO_CONFIG_ENV_VAR: &str = "ALTO_CONFIG";

/// File name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "alto.toml";

/// How variables touched by an extracted range are passed to the new procedure.
///
/// See [`DEFAULT_CAPTURE_POLICY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CapturePolicy {
    /// Every variable referenced outside the range, and every parameter of
    /// the enclosing procedure, becomes a `var` parameter.
    AlwaysByReference,
    /// Variables only read before the range are passed by value.
    Precise,
}

/// The capture policy used unless configured otherwise.
pub const DEFAULT_CAPTURE_POLICY: CapturePolicy = CapturePolicy::AlwaysByReference;

impl Default for CapturePolicy {
    fn default() -> Self {
        DEFAULT_CAPTURE_POLICY
    }
}

/// AL procedure access modifiers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    Local,
    Protected,
    #[default]
    Internal,
    Public,
}

impl AccessModifier {
    /// Keyword placed in front of `procedure`; public procedures have none.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            AccessModifier::Local => Some("local"),
            AccessModifier::Protected => Some("protected"),
            AccessModifier::Internal => Some("internal"),
            AccessModifier::Public => None,
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "local" => Some(AccessModifier::Local),
            "protected" => Some(AccessModifier::Protected),
            "internal" => Some(AccessModifier::Internal),
            "public" => Some(AccessModifier::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RefactorConfig {
    /// How captured variables become parameters of an extracted procedure.
    #[serde(default)]
    pub capture_policy: CapturePolicy,

    /// Name proposed for an extracted procedure before de-duplication.
    #[serde(default = "RefactorConfig::default_procedure_name")]
    pub default_procedure_name: String,

    /// Name of the return variable when an extracted expression yields a value.
    #[serde(default = "RefactorConfig::default_return_variable_name")]
    pub return_variable_name: String,

    /// Access modifier for procedures created in another object.
    #[serde(default)]
    pub external_access_modifier: AccessModifier,

    /// Report the created procedure's name so the editor can reveal it.
    #[serde(default = "default_true")]
    pub jump_to_created_position: bool,

    /// Move comments directly above the selection into the new procedure.
    ///
    /// By default they stay at the call site.
    #[serde(default)]
    pub move_leading_comments: bool,
}

fn default_true() -> bool {
    true
}

impl RefactorConfig {
    fn default_procedure_name() -> String {
        "NewProcedure".to_owned()
    }

    fn default_return_variable_name() -> String {
        "returnValue".to_owned()
    }
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            capture_policy: CapturePolicy::default(),
            default_procedure_name: Self::default_procedure_name(),
            return_variable_name: Self::default_return_variable_name(),
            external_access_modifier: AccessModifier::default(),
            jump_to_created_position: true,
            move_leading_comments: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`trace` .. `error`) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// `level` as an `EnvFilter` directive. Bare level names are matched
    /// case-insensitively; anything else is taken as a directive string.
    fn level_directive(level: &str) -> String {
        let level = level.trim();
        match level.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            known @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => known.to_owned(),
            _ => level.to_owned(),
        }
    }

    /// The configured level, refined by `RUST_LOG` when it is set. Directives
    /// that fail to parse fall back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = Self::level_directive(&self.level);
        let from_env = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let candidates = match from_env {
            Some(env) => vec![format!("{configured},{}", env.trim()), env],
            None => Vec::new(),
        };
        candidates
            .into_iter()
            .chain([configured])
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AltoConfig {
    #[serde(default)]
    pub refactor: RefactorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` repeats the offending source line.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl AltoConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AltoConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the workspace configuration, falling back to defaults when no
    /// config file exists.
    pub fn load_for_workspace(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match discover_config_path(root.as_ref()) {
            Some(path) => {
                tracing::debug!(target: "alto.config", path = %path.display(), "loading config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let refactor = &self.refactor;
        for (field, value) in [
            ("refactor.default_procedure_name", &refactor.default_procedure_name),
            ("refactor.return_variable_name", &refactor.return_variable_name),
        ] {
            if !is_plain_identifier(value) {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("`{value}` is not a valid AL identifier"),
                });
            }
        }
        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `ALTO_CONFIG` if set, otherwise `alto.toml` in `root` when it exists.
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(ALTO_CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        return Some(if path.is_relative() {
            root.join(path)
        } else {
            path
        });
    }
    let candidate = root.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// JSON schema for `alto.toml`, for editor validation.
pub fn json_schema() -> RootSchema {
    schema_for!(AltoConfig)
}

static TRACING: Once = Once::new();

/// Installs a `fmt` subscriber writing to stderr, as JSON lines when
/// `config.json` is set. Later calls do nothing.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING.call_once(|| {
        let fmt = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(std::io::stderr)
            .with_ansi(false);
        let installed = if config.json {
            tracing::subscriber::set_global_default(fmt.json().finish())
        } else {
            tracing::subscriber::set_global_default(fmt.finish())
        };
        if let Err(err) = installed {
            tracing::debug!(target: "alto.config", %err, "keeping existing subscriber");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AltoConfig::from_toml_str("").unwrap();
        assert_eq!(config, AltoConfig::default());
        assert_eq!(config.refactor.capture_policy, DEFAULT_CAPTURE_POLICY);
        assert_eq!(config.refactor.default_procedure_name, "NewProcedure");
        assert_eq!(config.refactor.return_variable_name, "returnValue");
        assert_eq!(config.refactor.external_access_modifier, AccessModifier::Internal);
        assert!(config.refactor.jump_to_created_position);
    }

    #[test]
    fn parses_all_refactor_options() {
        let text = r#"
[refactor]
capture_policy = "precise"
default_procedure_name = "Helper"
return_variable_name = "Result"
external_access_modifier = "public"
jump_to_created_position = false
move_leading_comments = true

[logging]
level = "debug"
json = true
"#;
        let config = AltoConfig::from_toml_str(text).unwrap();
        assert_eq!(config.refactor.capture_policy, CapturePolicy::Precise);
        assert_eq!(config.refactor.default_procedure_name, "Helper");
        assert_eq!(config.refactor.external_access_modifier, AccessModifier::Public);
        assert!(config.refactor.move_leading_comments);
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AltoConfig::from_toml_str("[refactor]\nfoo = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        let err =
            AltoConfig::from_toml_str("[refactor]\ndefault_procedure_name = \"1abc\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "refactor.default_procedure_name",
                ..
            }
        ));
    }

    #[test]
    fn level_synonyms_are_normalized() {
        assert_eq!(LoggingConfig::level_directive("WARNING"), "warn");
        assert_eq!(LoggingConfig::level_directive("Debug"), "debug");
        assert_eq!(LoggingConfig::level_directive("  "), "info");
        assert_eq!(
            LoggingConfig::level_directive("alto_refactor=trace"),
            "alto_refactor=trace"
        );
    }

    #[test]
    fn access_modifier_keywords() {
        assert_eq!(AccessModifier::Local.keyword(), Some("local"));
        assert_eq!(AccessModifier::Public.keyword(), None);
        assert_eq!(AccessModifier::from_keyword("Internal"), Some(AccessModifier::Internal));
    }

    #[test]
    fn schema_lists_capture_policy() {
        let schema = serde_json::to_string(&json_schema()).unwrap();
        assert!(schema.contains("always-by-reference"));
        assert!(schema.contains("precise"));
    }
}
