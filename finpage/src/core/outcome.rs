//! The uniform result crossing the facade boundary.

use serde::{Deserialize, Serialize};

/// Message returned with every successful outcome.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Result of a `generate_webpage` call.
///
/// `content` is present exactly when `success` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Whether a document was produced.
    pub success: bool,
    /// The document markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Human-readable status or error summary.
    pub message: String,
}

impl GenerationOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            message: message.into(),
        }
    }
}
