//! LLM Client — the single point of entry for all OpenAI API calls.
//!
//! No other module may call the chat-completions API directly; the analysis
//! pipeline reaches it only through the `AiAnalyzer` trait.
//!
//! Each call is a single attempt. Failures are reported with the remote status
//! or a transport error code so callers can tell them apart.
use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::ports::{AiAnalyzer, AiServiceFailure, Candidate, Completion};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl From<ChatCompletionResponse> for Completion {
    fn from(response: ChatCompletionResponse) -> Self {
        Completion {
            candidates: response
                .choices
                .into_iter()
                .map(|choice| Candidate {
                    content: choice.message.and_then(|m| m.content),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Wraps the OpenAI chat-completions API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.ai_timeout_secs))
                .build()?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes one call to the chat-completions endpoint with `prompt` as the
    /// only user message.
    pub async fn call(
        &self,
        prompt: &str,
        expect_json: bool,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let request_body = build_request(&self.model, prompt, expect_json);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = parse_error_body(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl AiAnalyzer for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        expect_json: bool,
    ) -> Result<Completion, AiServiceFailure> {
        self.call(prompt, expect_json)
            .await
            .map(Completion::from)
            .map_err(AiServiceFailure::from)
    }
}

impl From<LlmError> for AiServiceFailure {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api {
                status,
                code,
                message,
            } => AiServiceFailure {
                status: Some(status),
                code,
                message,
            },
            LlmError::Http(e) => AiServiceFailure {
                status: e.status().map(|s| s.as_u16()),
                code: transport_code(&e),
                message: e.to_string(),
            },
        }
    }
}

fn build_request<'a>(model: &'a str, prompt: &'a str, expect_json: bool) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        response_format: expect_json.then_some(ResponseFormat {
            format_type: "json_object",
        }),
    }
}

/// Pulls `error.code` and `error.message` out of an OpenAI error body,
/// falling back to the raw body text.
fn parse_error_body(body: String) -> (Option<String>, String) {
    match serde_json::from_str::<OpenAiError>(&body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (None, body),
    }
}

/// Derives an error code for failures where no HTTP response was received.
fn transport_code(err: &reqwest::Error) -> Option<String> {
    if err.is_timeout() {
        return Some("ETIMEDOUT".to_string());
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return errno_code(io.kind()).map(str::to_string);
        }
        source = cause.source();
    }

    None
}

/// Socket-level kinds with a conventional errno name. Other kinds have no
/// stable name worth showing.
fn errno_code(kind: std::io::ErrorKind) -> Option<&'static str> {
    use std::io::ErrorKind;

    match kind {
        ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        ErrorKind::ConnectionReset => Some("ECONNRESET"),
        ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        ErrorKind::NotConnected => Some("ENOTCONN"),
        ErrorKind::AddrNotAvailable => Some("EADDRNOTAVAIL"),
        ErrorKind::BrokenPipe => Some("EPIPE"),
        ErrorKind::TimedOut => Some("ETIMEDOUT"),
        _ => None,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_request_asks_for_json_object() {
        let body = serde_json::to_value(build_request("gpt-4", "analyze", true)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4",
                "messages": [{ "role": "user", "content": "analyze" }],
                "response_format": { "type": "json_object" }
            })
        );
    }

    #[test]
    fn test_request_without_json_omits_response_format() {
        let body = serde_json::to_value(build_request("gpt-4", "analyze", false)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_parse_error_body_reads_code() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let (code, message) = parse_error_body(body.to_string());
        assert_eq!(code.as_deref(), Some("invalid_api_key"));
        assert_eq!(message, "Incorrect API key provided");
    }

    #[test]
    fn test_parse_error_body_falls_back_to_raw_text() {
        let (code, message) = parse_error_body("Bad Gateway".to_string());
        assert_eq!(code, None);
        assert_eq!(message, "Bad Gateway");
    }

    #[test]
    fn test_api_error_keeps_status() {
        let failure = AiServiceFailure::from(LlmError::Api {
            status: 429,
            code: Some("rate_limit_exceeded".to_string()),
            message: "Rate limit reached".to_string(),
        });
        assert_eq!(failure.status, Some(429));
        assert_eq!(failure.code.as_deref(), Some("rate_limit_exceeded"));
    }

    #[test]
    fn test_response_maps_to_candidates() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "{\"skills\":[]}" } },
                { "message": { "role": "assistant" } },
                {}
            ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
        .unwrap();

        let completion = Completion::from(response);
        assert_eq!(completion.candidates.len(), 3);
        assert_eq!(
            completion.candidates[0].content.as_deref(),
            Some("{\"skills\":[]}")
        );
        assert_eq!(completion.candidates[1].content, None);
        assert_eq!(completion.candidates[2].content, None);
    }

    #[test]
    fn test_response_without_choices_is_empty() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(Completion::from(response).candidates.is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection_has_code_and_no_status() {
        // Port 1 on loopback has nothing listening.
        let err = Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();

        let failure = AiServiceFailure::from(LlmError::Http(err));
        assert_eq!(failure.status, None);
        assert_eq!(failure.code.as_deref(), Some("ECONNREFUSED"));
    }

    #[test]
    fn test_errno_code_names_socket_errors_only() {
        use std::io::ErrorKind;

        assert_eq!(errno_code(ErrorKind::ConnectionRefused), Some("ECONNREFUSED"));
        assert_eq!(errno_code(ErrorKind::ConnectionReset), Some("ECONNRESET"));
        assert_eq!(errno_code(ErrorKind::TimedOut), Some("ETIMEDOUT"));
        assert_eq!(errno_code(ErrorKind::Other), None);
        assert_eq!(errno_code(ErrorKind::NotFound), None);
        assert_eq!(errno_code(ErrorKind::InvalidData), None);
    }

    #[tokio::test]
    async fn test_unresolvable_host_has_no_code() {
        let err = Client::new()
            .get("http://resume-analyzer.invalid/")
            .send()
            .await
            .unwrap_err();

        let failure = AiServiceFailure::from(LlmError::Http(err));
        assert_eq!(failure.status, None);
        assert_eq!(failure.code, None);
    }
}
