//! Client for OpenAI-compatible chat-completion endpoints.

use super::{CompletionRequest, CompletionResponse, GenerationCapability};
use crate::config::ProviderConfig;
use crate::core::TokenUsage;
use crate::errors::{CapabilityError, ConfigError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

const PROVIDER: &str = "openai-compatible";

const SYSTEM_PREAMBLE: &str = "You generate content for financial webpages. \
Respond with a single JSON object that matches the requested schema exactly. \
Do not wrap it in markdown and do not add commentary.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Calls `POST {base_url}/chat/completions` with a JSON Schema response format.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
}

impl fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Creates a client from provider settings and a resolved API key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let timeout = config.timeout()?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout,
        })
    }

    /// The full completions URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PREAMBLE},
                {"role": "user", "content": request.prompt},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_output_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema,
                },
            },
        })
    }
}

/// Parses message content as JSON, tolerating a markdown code fence.
///
/// Content that is not JSON comes back as a JSON string so schema validation
/// rejects it.
fn parse_content(content: &str) -> serde_json::Value {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .unwrap_or_else(|_| serde_json::Value::String(content.to_string()))
}

#[async_trait]
impl GenerationCapability for OpenAiCompatibleClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CapabilityError> {
        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CapabilityError::timeout(
                        PROVIDER,
                        format!("no response within {}s", self.timeout.as_secs_f64()),
                    )
                } else {
                    CapabilityError::new(PROVIDER, format!("request failed: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(300).collect();
            return Err(CapabilityError::new(
                PROVIDER,
                format!("endpoint returned {status}: {detail}"),
            )
            .with_status(status.as_u16()));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| CapabilityError::new(PROVIDER, format!("unreadable response: {e}")))?;

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CapabilityError::new(PROVIDER, "response contained no choices"))?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| CapabilityError::new(PROVIDER, "response contained no message"))?;

        debug!(
            stage = %request.stage,
            schema = %request.schema_name,
            latency_ms,
            finish_reason = ?choice.finish_reason,
            "Completion received"
        );

        let usage = completion
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            output: parse_content(&content),
            model: completion.model.unwrap_or_else(|| self.model.clone()),
            provider: PROVIDER.to_string(),
            usage,
            latency_ms: Some(latency_ms),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> OpenAiCompatibleClient {
        let config = ProviderConfig {
            base_url: "https://llm.example.test/v1/".to_string(),
            ..ProviderConfig::default()
        };
        OpenAiCompatibleClient::new(&config, "secret").unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(client().endpoint(), "https://llm.example.test/v1/chat/completions");
    }

    #[test]
    fn test_request_body_carries_schema() {
        let request = CompletionRequest {
            stage: "generate_faq_section".to_string(),
            prompt: "Write a FAQ".to_string(),
            schema_name: "GenerateFaqSectionOutput".to_string(),
            schema: json!({"type": "object"}),
        };
        let body = client().body(&request);
        assert_eq!(body["messages"][1]["content"], "Write a FAQ");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "GenerateFaqSectionOutput");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", client()).contains("secret"));
    }

    #[test]
    fn test_parse_content() {
        assert_eq!(parse_content(r#"{"faqSection": "<dt>Q</dt>"}"#)["faqSection"], "<dt>Q</dt>");
        assert_eq!(parse_content("```json\n{\"a\": 1}\n```")["a"], 1);
        assert_eq!(parse_content("sorry, I can't"), json!("sorry, I can't"));
    }

    #[test]
    fn test_completion_deserializes_sparse_payload() {
        let payload: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{}"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert!(payload.model.is_none());
        assert!(payload.usage.is_none());
        assert_eq!(payload.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_capability_error() {
        let config = ProviderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2.0,
            ..ProviderConfig::default()
        };
        let client = OpenAiCompatibleClient::new(&config, "k").unwrap();
        let err = client
            .complete(CompletionRequest {
                stage: "s".to_string(),
                prompt: "p".to_string(),
                schema_name: "S".to_string(),
                schema: json!({}),
            })
            .await
            .unwrap_err();
        assert_eq!(err.provider, PROVIDER);
    }
}
