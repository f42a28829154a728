//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached, and `DOSSIER__`-prefixed
//! environment variables are applied last, so the environment always wins
//! (`DOSSIER__LLM__MODEL=gpt-4o` overrides `llm.model`). After merging, every
//! string value has `${VAR}` placeholders expanded, which is how credentials
//! are usually supplied:
//!
//! ```yaml
//! search:
//!   api_key: "${SERPAPI_KEY}"
//! llm:
//!   auth_token: "${OPENAI_API_KEY}"
//! ```
//!
//! Every section is optional; omitted values fall back to the defaults below.
use config::{Config, ConfigError, Environment, File};
use dossier_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

const MAX_EXPANSION_ROUNDS: usize = 8;
const ENV_PREFIX: &str = "DOSSIER";

/// Bounds on `search.results`, shared with the command line.
pub const MIN_RESULTS: u32 = 3;
pub const MAX_RESULTS: u32 = 10;

/// Top-level configuration, constructed once at process start and handed by
/// reference to every component that talks to a collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DossierConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub extract: ExtractConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Serpapi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    pub api_key: String,
    pub endpoint: String,
    /// Number of sources requested per run.
    pub results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Serpapi,
            api_key: String::new(),
            endpoint: default_serpapi_endpoint(),
            results: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Openai,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub auth_token: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Openai,
            model: "gpt-4o-mini".into(),
            auth_token: String::new(),
            temperature: 0.3,
            max_tokens: 500,
            endpoint: default_openai_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub timeout_secs: u64,
    pub max_chars: usize,
    pub user_agent: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_chars: 3000,
            user_agent: "Mozilla/5.0".into(),
        }
    }
}

/// Voice requested from the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTone {
    Academic,
    Simplified,
    Conversational,
}

impl fmt::Display for SummaryTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SummaryTone::Academic => "academic",
            SummaryTone::Simplified => "simplified",
            SummaryTone::Conversational => "conversational",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sources processed at once; 1 keeps the run strictly sequential.
    pub concurrency: usize,
    pub tone: Option<SummaryTone>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            tone: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            stderr: false,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

impl DossierConfig {
    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RESULTS..=MAX_RESULTS).contains(&self.search.results) {
            return Err(ConfigError::Message(format!(
                "search.results must be within {MIN_RESULTS}..={MAX_RESULTS}, got {}",
                self.search.results
            )));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::Message(
                "pipeline.concurrency must be at least 1".into(),
            ));
        }
        if self.extract.max_chars == 0 {
            return Err(ConfigError::Message(
                "extract.max_chars must be at least 1".into(),
            ));
        }
        if self.extract.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "extract.timeout_secs must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Message(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

fn default_serpapi_endpoint() -> String {
    "https://serpapi.com".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}

/// `~/.config/dossier/dossier.yaml` (platform equivalent), if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dossier").join("dossier.yaml"))
}

/// Expand `$VAR`/`${VAR}` in every string, in place.
fn expand_placeholders(value: &mut Value) {
    match value {
        Value::String(s) if s.contains('$') => *s = expand_str(s),
        Value::Array(items) => items.iter_mut().for_each(expand_placeholders),
        Value::Object(fields) => fields.values_mut().for_each(expand_placeholders),
        _ => {}
    }
}

/// Re-expand until the text stops changing, so a variable may refer to
/// another. Unset variables leave the text as it was; cycles stop after
/// `MAX_EXPANSION_ROUNDS`.
fn expand_str(raw: &str) -> String {
    let mut text = raw.to_string();
    for _ in 0..MAX_EXPANSION_ROUNDS {
        let Ok(next) = shellexpand::env(&text) else {
            break;
        };
        if next == text {
            break;
        }
        text = next.into_owned();
    }
    text
}

/// Layers files, inline YAML and `DOSSIER__` variables into a [`DossierConfig`].
pub struct DossierConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: Option<Environment>,
}

impl Default for DossierConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DossierConfigLoader {
    /// Start with defaults plus `DOSSIER__` env overrides.
    ///
    /// ```
    /// use dossier_config::DossierConfigLoader;
    ///
    /// let config = DossierConfigLoader::new()
    ///     .with_yaml_str("search:\n  results: 7")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.search.results, 7);
    /// assert_eq!(config.llm.model, "gpt-4o-mini");
    /// ```
    pub fn new() -> Self {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self {
            builder: Config::builder(),
            env: Some(env),
        }
    }

    /// Ignore the process environment (tests, embedding).
    pub fn without_env(mut self) -> Self {
        self.env = None;
        self
    }

    /// Required file; the format follows the extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so env-only deployments still load.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Inline YAML, merged like a file.
    ///
    /// ```
    /// use dossier_config::{DossierConfigLoader, SummaryTone};
    ///
    /// let cfg = DossierConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(
    ///         r#"
    /// pipeline:
    ///   concurrency: 3
    ///   tone: academic
    /// extract:
    ///   max_chars: 1200
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.pipeline.concurrency, 3);
    /// assert_eq!(cfg.pipeline.tone, Some(SummaryTone::Academic));
    /// assert_eq!(cfg.extract.max_chars, 1200);
    /// assert_eq!(cfg.extract.timeout_secs, 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge, expand placeholders, then validate.
    ///
    /// ```
    /// use dossier_config::DossierConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_OPENAI_TOKEN", "injected-from-env"); }
    ///
    /// let config = DossierConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: openai
    ///   model: "gpt-4o"
    ///   auth_token: "${DOC_OPENAI_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.model, "gpt-4o");
    /// assert_eq!(config.llm.auth_token, "injected-from-env");
    /// assert_eq!(config.llm.endpoint, "https://api.openai.com/v1");
    ///
    /// unsafe { std::env::remove_var("DOC_OPENAI_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<DossierConfig, ConfigError> {
        let builder = match self.env {
            Some(env) => self.builder.add_source(env),
            None => self.builder,
        };
        let mut v: Value = match builder.build()?.try_deserialize::<Value>()? {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        expand_placeholders(&mut v);

        let typed: DossierConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
