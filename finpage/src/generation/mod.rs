//! The generation capability: an opaque structured-output completion service.
//!
//! The pipeline only ever sees [`GenerationCapability`]. The HTTP client for
//! OpenAI-compatible chat-completion endpoints lives behind the `http`
//! feature.

mod capability;
#[cfg(feature = "http")]
mod openai;

pub use capability::{CompletionRequest, CompletionResponse, GenerationCapability};
#[cfg(test)]
pub use capability::MockGenerationCapability;
#[cfg(feature = "http")]
pub use openai::OpenAiCompatibleClient;
