//! Error types for the finpage framework.
//!
//! A request can fail in exactly three ways: a stage input violates its
//! contract, the generation capability cannot be reached, or the capability
//! answers with something that does not satisfy the stage's output schema.
//! Everything else (`Validation`, `Template`, `Config`) is a construction-time
//! defect surfaced before any request runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes attached to [`ContractErrorInfo`].
pub mod codes {
    /// Stage input failed its input schema.
    pub const INPUT: &str = "CONTRACT-001-INPUT";
    /// Capability output failed the output schema or a semantic check.
    pub const OUTPUT: &str = "CONTRACT-002-OUTPUT";
    /// Prompt template references a field the input schema does not declare.
    pub const TEMPLATE: &str = "CONTRACT-003-TEMPLATE";
    /// Two stages or contracts share a name or fragment slot.
    pub const DUPLICATE: &str = "CONTRACT-004-DUPLICATE";
    /// A pipeline or contract declares nothing.
    pub const EMPTY: &str = "CONTRACT-005-EMPTY";
    /// The generation capability failed.
    pub const UNAVAILABLE: &str = "CAPABILITY-001-UNAVAILABLE";
    /// Configuration could not be loaded or is inconsistent.
    pub const CONFIG: &str = "CONFIG-001-INVALID";
}

/// The main error type for finpage operations.
#[derive(Debug, Error)]
pub enum FinpageError {
    /// A stage input did not satisfy the stage's input schema.
    #[error("{0}")]
    ContractViolation(#[from] ContractViolation),

    /// The generation capability could not be reached or returned an error.
    #[error("{0}")]
    CapabilityUnavailable(#[from] CapabilityError),

    /// The capability responded, but the response broke the output schema.
    #[error("{0}")]
    OutputValidationFailed(#[from] OutputValidationError),

    /// A pipeline or contract definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A prompt template could not be expanded.
    #[error("{0}")]
    Template(#[from] TemplateError),

    /// Configuration could not be loaded or is inconsistent.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of a [`FinpageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller or programmer error on stage input.
    ContractViolation,
    /// External dependency failure.
    CapabilityUnavailable,
    /// Model output did not conform.
    OutputValidationFailed,
    /// Construction-time defect (pipeline, template or config).
    Misconfigured,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractViolation => write!(f, "contract_violation"),
            Self::CapabilityUnavailable => write!(f, "capability_unavailable"),
            Self::OutputValidationFailed => write!(f, "output_validation_failed"),
            Self::Misconfigured => write!(f, "misconfigured"),
        }
    }
}

impl FinpageError {
    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContractViolation(_) => ErrorKind::ContractViolation,
            Self::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            Self::OutputValidationFailed(_) => ErrorKind::OutputValidationFailed,
            Self::Validation(_) | Self::Template(_) | Self::Config(_) => ErrorKind::Misconfigured,
        }
    }

    /// Returns the stage the error originated in, when known.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::ContractViolation(err) => Some(&err.stage),
            Self::CapabilityUnavailable(err) => err.stage.as_deref(),
            Self::OutputValidationFailed(err) => Some(&err.stage),
            Self::Template(err) => Some(&err.template),
            Self::Validation(_) | Self::Config(_) => None,
        }
    }

    /// Structured diagnostics for logs and event payloads.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        match self {
            Self::ContractViolation(err) => {
                ContractErrorInfo::new(codes::INPUT, err.to_string())
                    .with_context_entry("stage", &err.stage)
            }
            Self::CapabilityUnavailable(err) => {
                let mut info = ContractErrorInfo::new(codes::UNAVAILABLE, err.to_string())
                    .with_context_entry("provider", &err.provider);
                if let Some(status) = err.status {
                    info = info.with_context_entry("status", status.to_string());
                }
                info
            }
            Self::OutputValidationFailed(err) => {
                ContractErrorInfo::new(codes::OUTPUT, err.to_string())
                    .with_context_entry("stage", &err.stage)
                    .with_context_entry("schema", &err.schema)
            }
            Self::Validation(err) => err
                .error_info
                .clone()
                .unwrap_or_else(|| ContractErrorInfo::new(codes::EMPTY, err.message.clone())),
            Self::Template(err) => ContractErrorInfo::new(codes::TEMPLATE, err.to_string())
                .with_fix_hint("Use only placeholders that name fields of the stage's input schema."),
            Self::Config(err) => ContractErrorInfo::new(codes::CONFIG, err.to_string()),
        }
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-002-OUTPUT").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON value for event payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// The offending field (or `$` for the payload itself).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldViolation {
    /// Creates a new field violation.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raised when a stage input does not satisfy its input schema.
///
/// Always produced before the generation capability is called.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' rejected its input: {}", join_violations(.violations))]
pub struct ContractViolation {
    /// The stage whose contract was violated.
    pub stage: String,
    /// The individual violations.
    pub violations: Vec<FieldViolation>,
}

impl ContractViolation {
    /// Creates a new contract violation.
    #[must_use]
    pub fn new(stage: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            stage: stage.into(),
            violations,
        }
    }

    /// Returns the first violation, if any.
    #[must_use]
    pub fn first(&self) -> Option<&FieldViolation> {
        self.violations.first()
    }
}

/// Raised when the generation capability cannot produce a response.
#[derive(Debug, Clone, Error)]
#[error("Generation capability '{provider}' unavailable{}: {message}", stage_suffix(.stage.as_deref()))]
pub struct CapabilityError {
    /// The capability implementation (e.g., "openai-compatible").
    pub provider: String,
    /// What went wrong.
    pub message: String,
    /// HTTP status, when the service answered with one.
    pub status: Option<u16>,
    /// Whether the call hit the configured timeout.
    pub timed_out: bool,
    /// The stage that made the call, attached by the invoker.
    pub stage: Option<String>,
}

fn stage_suffix(stage: Option<&str>) -> String {
    stage.map_or_else(String::new, |s| format!(" in stage '{s}'"))
}

impl CapabilityError {
    /// Creates a new capability error.
    #[must_use]
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
            status: None,
            timed_out: false,
            stage: None,
        }
    }

    /// Creates an error for a call that exceeded its timeout.
    #[must_use]
    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timed_out: true,
            ..Self::new(provider, message)
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the stage that made the call.
    #[must_use]
    pub fn for_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

/// Raised when a capability response does not conform to the output schema.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' produced output that violates '{schema}': {}", join_violations(.violations))]
pub struct OutputValidationError {
    /// The stage whose output was rejected.
    pub stage: String,
    /// The output schema name.
    pub schema: String,
    /// The individual violations.
    pub violations: Vec<FieldViolation>,
}

impl OutputValidationError {
    /// Creates a new output validation error.
    #[must_use]
    pub fn new(
        stage: impl Into<String>,
        schema: impl Into<String>,
        violations: Vec<FieldViolation>,
    ) -> Self {
        Self {
            stage: stage.into(),
            schema: schema.into(),
            violations,
        }
    }
}

/// Error raised when pipeline or contract validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }
}

/// Error raised when a prompt template cannot be expanded.
#[derive(Debug, Clone, Error)]
#[error("Template '{template}' references unknown field '{placeholder}'")]
pub struct TemplateError {
    /// The template name.
    pub template: String,
    /// The unresolved placeholder.
    pub placeholder: String,
}

impl TemplateError {
    /// Creates a new template error.
    #[must_use]
    pub fn new(template: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            placeholder: placeholder.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a file failed.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The API key environment variable is missing or empty.
    #[error("API key not found. Set the {env} environment variable.")]
    MissingApiKey {
        /// The environment variable name.
        env: String,
    },

    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ConfigError {
    /// Creates an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
