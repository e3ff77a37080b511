//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. YAML files attached with [`SiftConfigLoader::with_file`] or
//!    [`SiftConfigLoader::with_optional_file`], then inline snippets
//! 2. `SIFT__`-prefixed environment variables, `__` separating nested keys
//!    (`SIFT__SEARCH__LIMIT=20` sets `search.limit`)
//!
//! After merging, `${VAR}` placeholders inside string values are expanded
//! recursively. Every field has a default, so an empty source set yields a
//! usable offline configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use sift_common::observability::LogFormat;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SIFT";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub version: Option<String>,
    pub search: SearchSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
}

/// Knobs for the search orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Result count requested from the provider.
    pub limit: u32,
    /// Upper bound on a single provider call before it counts as failed.
    pub timeout_secs: u64,
    /// Appended to the query for the title side channel (`"<q> - <suffix>"`).
    pub title_suffix: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: 10,
            timeout_secs: 10,
            title_suffix: "Search".to_string(),
        }
    }
}

/// Which search backend to talk to. The tag is `kind`; the payload lives in `config`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSettings {
    /// No backend; every dispatch falls back to synthesized results.
    #[default]
    Offline,
    Brave { config: BraveConfig },
    Remote { config: RemoteConfig },
}

#[derive(Debug, Clone, Deserialize)]
pub struct BraveConfig {
    pub auth_token: String,
    #[serde(default = "default_brave_endpoint")]
    pub endpoint: String,
}

/// A backend that already speaks the result-set JSON shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".to_string(),
        }
    }
}

fn default_brave_endpoint() -> String {
    "https://api.search.brave.com".into()
}

/// Expand `${VAR}` / `$VAR` in every string of `value`, following chains up
/// to [`MAXIMUM_ENV_EXPANSION_DEPTH`] levels. Unknown variables stay verbatim.
fn expand_placeholders(value: &mut Value) {
    match value {
        Value::String(text) if text.contains('$') => *text = expand_str(text),
        Value::Array(items) => items.iter_mut().for_each(expand_placeholders),
        Value::Object(fields) => fields.values_mut().for_each(expand_placeholders),
        _ => {}
    }
}

fn expand_str(raw: &str) -> String {
    let mut current = raw.to_owned();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        match shellexpand::env(&current) {
            Ok(next) if next != current => current = next.into_owned(),
            _ => break,
        }
    }
    current
}

fn validate(cfg: &SiftConfig) -> Result<(), ConfigError> {
    if cfg.search.limit == 0 {
        return Err(ConfigError::Message("search.limit must be at least 1".into()));
    }
    if cfg.search.timeout_secs == 0 {
        return Err(ConfigError::Message(
            "search.timeout_secs must be at least 1".into(),
        ));
    }
    match &cfg.provider {
        ProviderSettings::Brave { config } if config.auth_token.trim().is_empty() => Err(
            ConfigError::Message("provider.config.auth_token is empty".into()),
        ),
        ProviderSettings::Remote { config } if config.endpoint.trim().is_empty() => Err(
            ConfigError::Message("provider.config.endpoint is empty".into()),
        ),
        _ => Ok(()),
    }
}

/// Layers config sources and produces a validated [`SiftConfig`].
pub struct SiftConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiftConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiftConfigLoader {
    /// Start from defaults; environment overrides are applied by [`load`](Self::load).
    ///
    /// ```
    /// use sift_config::{ProviderSettings, SiftConfigLoader};
    ///
    /// let config = SiftConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.search.limit, 10);
    /// assert!(matches!(config.provider, ProviderSettings::Offline));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    fn source<S>(self, source: S) -> Self
    where
        S: config::Source + Send + Sync + 'static,
    {
        Self {
            builder: self.builder.add_source(source),
        }
    }

    /// A config file that must exist; the format follows the extension.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.source(File::from(path.as_ref()).required(true))
    }

    /// A config file that is skipped when absent (the default `sift.yaml`).
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.source(File::from(path.as_ref()).required(false))
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use sift_config::{ProviderSettings, SiftConfigLoader};
    ///
    /// let cfg = SiftConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// search:
    ///   limit: 5
    /// provider:
    ///   kind: remote
    ///   config:
    ///     endpoint: "https://search.internal/api"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.search.limit, 5);
    /// assert_eq!(cfg.search.title_suffix, "Search");
    /// assert!(matches!(cfg.provider, ProviderSettings::Remote { .. }));
    /// ```
    pub fn with_yaml_str(self, yaml: &str) -> Self {
        self.source(File::from_str(yaml, config::FileFormat::Yaml))
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use sift_config::{ProviderSettings, SiftConfigLoader};
    ///
    /// unsafe { std::env::set_var("DOC_BRAVE_TOKEN", "injected-from-env"); }
    ///
    /// let config = SiftConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// provider:
    ///   kind: brave
    ///   config:
    ///     auth_token: "${DOC_BRAVE_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.provider {
    ///     ProviderSettings::Brave { config } => {
    ///         assert_eq!(config.auth_token, "injected-from-env");
    ///         assert_eq!(config.endpoint, "https://api.search.brave.com");
    ///     }
    ///     other => panic!("expected brave provider, got {other:?}"),
    /// }
    ///
    /// unsafe { std::env::remove_var("DOC_BRAVE_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<SiftConfig, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true);
        let mut merged: Value = self.source(env).builder.build()?.try_deserialize()?;
        expand_placeholders(&mut merged);

        let config = SiftConfig::deserialize(merged).map_err(|e| ConfigError::Message(e.to_string()))?;
        validate(&config)?;
        Ok(config)
    }
}
