//! Loader for Verdant configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every section is optional)
//! 2. YAML files / inline YAML snippets, in the order they were added
//! 3. `VERDANT__`-prefixed environment variables, `__` separating path
//!    segments (`VERDANT__UPSTREAM__BASE_URL`, `VERDANT__CACHE__TTL_SECS`)
//!
//! After merging, every string value has `${VAR}` placeholders expanded
//! from the process environment.
//!
//! ```yaml
//! upstream:
//!   base_url: "http://localhost:5000"
//!   analyze_path: "api/claims/detect"
//!   api_key: "${VERDANT_API_KEY}"
//!   timeout_secs: 15
//!   retries: 2
//! cache:
//!   ttl_secs: 300
//! logging:
//!   format: text
//!   emit_stderr: false
//!   filter: info
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use verdant_common::observability::{LogConfig, LogFormat};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "VERDANT";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ANALYZE_PATH: &str = "api/claims/detect";
pub const DEFAULT_STATUS_PATH: &str = "api/nlp/status";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerdantConfig {
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Where and how to reach the upstream analysis service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub status_path: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            analyze_path: DEFAULT_ANALYZE_PATH.into(),
            status_path: DEFAULT_STATUS_PATH.into(),
            api_key: None,
            timeout_secs: 15,
            retries: 2,
        }
    }
}

impl UpstreamConfig {
    /// The API key, if one is actually configured.
    ///
    /// Empty strings and placeholders whose variable was never set
    /// (`${VERDANT_API_KEY}` left verbatim) count as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.contains("${"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `text` or `json`.
    pub format: String,
    pub emit_stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".into(),
            emit_stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Settings for [`verdant_common::observability::init_logging`].
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: LogFormat::from_name(&self.format),
            default_filter: self.filter.clone(),
        }
    }
}

/// `<config dir>/verdant/verdant.yaml`, e.g. `~/.config/verdant/verdant.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("verdant").join("verdant.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct VerdantConfigLoader {
    files: Vec<(PathBuf, bool)>,
    inline: Vec<String>,
}

impl Default for VerdantConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdantConfigLoader {
    /// Start from defaults plus `VERDANT__` environment overrides.
    ///
    /// ```
    /// use verdant_config::VerdantConfigLoader;
    ///
    /// let cfg = VerdantConfigLoader::new()
    ///     .with_yaml_str("cache:\n  ttl_secs: 60")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.cache.ttl_secs, 60);
    /// assert_eq!(cfg.upstream.analyze_path, "api/claims/detect");
    /// ```
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Attach a required YAML file; loading fails if it is missing.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a YAML file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.inline.push(yaml.to_string());
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use verdant_config::VerdantConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_VERDANT_KEY", "k-123"); }
    ///
    /// let cfg = VerdantConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// upstream:
    ///   base_url: "https://verify.example.org"
    ///   api_key: "${DOCTEST_VERDANT_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(cfg.upstream.base_url, "https://verify.example.org");
    /// assert_eq!(cfg.upstream.api_key(), Some("k-123"));
    ///
    /// unsafe { std::env::remove_var("DOCTEST_VERDANT_KEY"); }
    /// ```
    pub fn load(self) -> Result<VerdantConfig, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in &self.files {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(*required),
            );
        }
        for yaml in &self.inline {
            builder = builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${STATE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unresolved_api_key_counts_as_absent() {
        let mut up = UpstreamConfig::default();
        assert_eq!(up.api_key(), None);
        up.api_key = Some("${VERDANT_API_KEY}".into());
        assert_eq!(up.api_key(), None);
        up.api_key = Some("  ".into());
        assert_eq!(up.api_key(), None);
        up.api_key = Some(" real ".into());
        assert_eq!(up.api_key(), Some("real"));
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = VerdantConfig::default();
        assert_eq!(cfg.cache.ttl_secs, 300);
        assert_eq!(cfg.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.upstream.retries, 2);
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn logging_section_maps_onto_log_config() {
        let logging = LoggingConfig {
            format: "JSON".into(),
            emit_stderr: true,
            filter: "verdant_analysis=debug".into(),
            dir: Some(PathBuf::from("/var/log/verdant")),
        };
        let lc = logging.to_log_config("verdant");
        assert_eq!(lc.app_name, "verdant");
        assert_eq!(lc.format, LogFormat::Json);
        assert!(lc.emit_stderr);
        assert_eq!(lc.default_filter, "verdant_analysis=debug");
        assert_eq!(lc.log_dir, Some(PathBuf::from("/var/log/verdant")));

        let lc = LoggingConfig::default().to_log_config("verdant");
        assert_eq!(lc.format, LogFormat::Text);
        assert_eq!(lc.log_dir, None);
    }
}
