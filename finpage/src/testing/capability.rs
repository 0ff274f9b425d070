//! Scripted generation capability.

use super::fixtures;
use crate::core::TokenUsage;
use crate::errors::CapabilityError;
use crate::generation::{CompletionRequest, CompletionResponse, GenerationCapability};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const PROVIDER: &str = "scripted";
const MODEL: &str = "scripted-model";

/// What the capability answers for one output schema.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this payload as the structured output.
    Output(serde_json::Value),
    /// Fail the call.
    Failure(CapabilityError),
}

/// A [`GenerationCapability`] that answers from a script keyed by output
/// schema name.
///
/// Unscripted schemas fail with a `CapabilityError`.
#[derive(Debug, Default)]
pub struct ScriptedCapability {
    replies: HashMap<String, ScriptedReply>,
    delays: HashMap<String, Duration>,
    delay: Option<Duration>,
    usage: TokenUsage,
    call_count: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCapability {
    /// Creates a capability with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a capability that answers every built-in schema with a valid
    /// fixture.
    #[must_use]
    pub fn with_valid_outputs() -> Self {
        fixtures::valid_outputs()
            .into_iter()
            .fold(Self::new(), |cap, (schema, output)| cap.with_output(schema, output))
            .with_usage(TokenUsage::new(400, 900))
    }

    /// Scripts a successful payload.
    #[must_use]
    pub fn with_output(mut self, schema: impl Into<String>, output: serde_json::Value) -> Self {
        self.replies.insert(schema.into(), ScriptedReply::Output(output));
        self
    }

    /// Scripts a failure.
    #[must_use]
    pub fn with_failure(mut self, schema: impl Into<String>, error: CapabilityError) -> Self {
        self.replies.insert(schema.into(), ScriptedReply::Failure(error));
        self
    }

    /// Delays every call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delays calls for one schema, overriding the global delay.
    #[must_use]
    pub fn with_delay_for(mut self, schema: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(schema.into(), delay);
        self
    }

    /// Sets the usage reported with every response.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Returns the call count.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns every request received, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Returns the stage names that called, in arrival order.
    #[must_use]
    pub fn called_stages(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.stage.clone()).collect()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.requests.lock().clear();
    }
}

#[async_trait]
impl GenerationCapability for ScriptedCapability {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CapabilityError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let delay = self.delays.get(&request.schema_name).copied().or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.replies.get(&request.schema_name) {
            Some(ScriptedReply::Output(output)) => {
                Ok(CompletionResponse::new(output.clone(), MODEL, PROVIDER).with_usage(self.usage))
            }
            Some(ScriptedReply::Failure(error)) => Err(error.clone()),
            None => Err(CapabilityError::new(
                PROVIDER,
                format!("no reply scripted for schema '{}'", request.schema_name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(schema: &str) -> CompletionRequest {
        CompletionRequest {
            stage: "stage".to_string(),
            prompt: "prompt".to_string(),
            schema_name: schema.to_string(),
            schema: json!({}),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies() {
        let capability = ScriptedCapability::new()
            .with_output("Ok", json!({"a": 1}))
            .with_failure("Down", CapabilityError::new("p", "offline").with_status(503));

        let response = capability.complete(request("Ok")).await.unwrap();
        assert_eq!(response.output, json!({"a": 1}));
        assert_eq!(response.provider, PROVIDER);

        let err = capability.complete(request("Down")).await.unwrap_err();
        assert_eq!(err.status, Some(503));

        let err = capability.complete(request("Unknown")).await.unwrap_err();
        assert!(err.message.contains("Unknown"));

        assert_eq!(capability.call_count(), 3);
        assert_eq!(capability.requests().len(), 3);

        capability.reset();
        assert_eq!(capability.call_count(), 0);
        assert!(capability.called_stages().is_empty());
    }

    #[tokio::test]
    async fn test_valid_outputs_cover_every_schema() {
        let capability = ScriptedCapability::with_valid_outputs();
        for (schema, _) in fixtures::valid_outputs() {
            let response = capability.complete(request(schema)).await.unwrap();
            assert_eq!(response.usage.total(), 1300);
        }
    }
}
