//! Capability trait and request/response types.

use crate::core::TokenUsage;
use crate::errors::CapabilityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One structured-output completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The stage issuing the request.
    pub stage: String,
    /// Fully expanded prompt text.
    pub prompt: String,
    /// Name of the output schema.
    pub schema_name: String,
    /// JSON Schema the output must follow.
    pub schema: serde_json::Value,
}

/// A completion as returned by the capability, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The structured output. Not yet checked against any schema.
    pub output: serde_json::Value,
    /// Model that served the request.
    pub model: String,
    /// Capability implementation name.
    pub provider: String,
    /// Token usage, when reported.
    #[serde(default)]
    pub usage: TokenUsage,
    /// Round-trip latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Why generation stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Creates a response carrying only an output payload.
    #[must_use]
    pub fn new(
        output: serde_json::Value,
        model: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            output,
            model: model.into(),
            provider: provider.into(),
            usage: TokenUsage::default(),
            latency_ms: None,
            finish_reason: None,
        }
    }

    /// Sets token usage.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// A text-completion service with structured output support.
///
/// Implementations own connection lifecycle, authentication and any retry
/// policy. A call either yields a payload or a [`CapabilityError`]; it must
/// not hang indefinitely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Requests output shaped like `request.schema`.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, CapabilityError>;
}
