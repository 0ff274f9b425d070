//! Generator configuration.
//!
//! Configuration is an explicit value handed to the facade; nothing here
//! reads process state except [`GeneratorConfig::resolve_api_key`], which looks
//! up the environment variable the config names.
//!
//! ```toml
//! [provider]
//! base_url = "https://generativelanguage.googleapis.com/v1beta/openai"
//! model = "gemini-2.0-flash"
//! api_key_env = "GEMINI_API_KEY"
//! timeout_seconds = 90
//!
//! [pipeline]
//! execution = "concurrent"
//! strategy = "staged"
//!
//! [prompts.generate_faq_section]
//! version = "v2"
//! path = "prompts/faq.v2.txt"
//! ```

use crate::errors::ConfigError;
use crate::pipeline::{ExecutionMode, PipelineStrategy};
use crate::prompts::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generation capability settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Prompt template overrides keyed by stage name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, PromptOverride>,
    /// Directory relative override paths resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Settings for the OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token cap per stage call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Upper bound for `provider.timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

fn default_timeout() -> f64 {
    120.0
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    8192
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl ProviderConfig {
    /// Gets the timeout as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the value is negative, not finite,
    /// or too large for a `Duration`.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.timeout_seconds).map_err(|e| {
            ConfigError::Invalid(format!(
                "provider.timeout_seconds {} is not a usable duration: {e}",
                self.timeout_seconds
            ))
        })
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Whether stages run one after another or all at once.
    #[serde(default)]
    pub execution: ExecutionMode,
    /// Four staged fragments or one full-page call.
    #[serde(default)]
    pub strategy: PipelineStrategy,
}

/// Replacement template for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOverride {
    /// Version label recorded with every invocation.
    pub version: String,
    /// Inline template text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// File holding the template text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML or unknown values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads configuration from a TOML file.
    ///
    /// Relative prompt override paths resolve against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let mut config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse(msg) => {
                ConfigError::Parse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Rejects values no request could succeed with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = &self.provider;
        if !(provider.base_url.starts_with("http://") || provider.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "provider.base_url must be an http(s) URL, got '{}'",
                provider.base_url
            )));
        }
        if provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.model must not be empty".into()));
        }
        if provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.api_key_env must not be empty".into()));
        }
        if !provider.timeout_seconds.is_finite() || provider.timeout_seconds <= 0.0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_seconds must be positive".into(),
            ));
        }
        if provider.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "provider.timeout_seconds must be at most {MAX_TIMEOUT_SECONDS}"
            )));
        }
        if !(0.0..=2.0).contains(&provider.temperature) {
            return Err(ConfigError::Invalid(
                "provider.temperature must be between 0 and 2".into(),
            ));
        }
        if provider.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "provider.max_output_tokens must be positive".into(),
            ));
        }

        for (stage, prompt) in &self.prompts {
            if prompt.version.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "prompts.{stage}.version must not be empty"
                )));
            }
            if prompt.text.is_some() == prompt.path.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "prompts.{stage} needs exactly one of 'text' or 'path'"
                )));
            }
        }

        Ok(())
    }

    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` if the variable is unset or empty.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let env = &self.provider.api_key_env;
        match std::env::var(env) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingApiKey { env: env.clone() }),
        }
    }

    /// Loads the override template for a stage, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the template file cannot be read.
    pub fn prompt_override(&self, stage: &'static str) -> Result<Option<PromptTemplate>, ConfigError> {
        let Some(prompt) = self.prompts.get(stage) else {
            return Ok(None);
        };

        let body = match (&prompt.text, &prompt.path) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => {
                let full = match &self.base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                std::fs::read_to_string(&full).map_err(|e| ConfigError::io(&full, e))?
            }
            (None, None) => {
                return Err(ConfigError::Invalid(format!(
                    "prompts.{stage} needs exactly one of 'text' or 'path'"
                )))
            }
        };

        Ok(Some(PromptTemplate::custom(stage, prompt.version.clone(), body)))
    }
}
