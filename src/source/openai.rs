//! Chat-completions policy client (OpenAI-compatible endpoints).

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::policy::{PolicyClient, PolicyRequest};
use crate::config::PolicyConfig;
use crate::error::PolicyError;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking HTTP client for a chat-completions endpoint.
pub struct OpenAiPolicy {
    http: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiPolicy")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiPolicy {
    pub fn new(config: &PolicyConfig, api_key: String) -> Result<Self, PolicyError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PolicyError::Transport(e.to_string()))?;

        Ok(OpenAiPolicy {
            http,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Read the API key from the environment variable named in the config.
    pub fn from_env(config: &PolicyConfig) -> Result<Self, PolicyError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PolicyError::MissingCredentials(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }
}

fn chat_body<'a>(model: &'a str, max_tokens: u32, rules: &'a str, grid: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        max_tokens,
        messages: vec![
            ChatMessage {
                role: "system",
                content: rules,
            },
            ChatMessage {
                role: "user",
                content: grid,
            },
        ],
    }
}

/// Pull the first choice's text out of a chat-completions response body.
fn extract_content(body: &str) -> Result<String, PolicyError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| PolicyError::Malformed(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| PolicyError::Malformed("response has no message content".into()))
}

impl PolicyClient for OpenAiPolicy {
    #[instrument(skip_all, fields(model = %self.model))]
    fn request(&self, request: &PolicyRequest) -> Result<String, PolicyError> {
        let grid = request.grid_text();
        let body = chat_body(&self.model, self.max_tokens, &request.rules, &grid);

        debug!(url = %self.url, "sending policy request");
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    PolicyError::Timeout(self.timeout)
                } else {
                    PolicyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| PolicyError::Transport(e.to_string()))?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PolicyError::Unauthorized(format!("{status}: {text}")))
            }
            s if !s.is_success() => Err(PolicyError::Transport(format!("{status}: {text}"))),
            _ => extract_content(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PolicyConfig {
        PolicyConfig {
            endpoint: "https://example.test/v1/".into(),
            ..PolicyConfig::default()
        }
    }

    #[test]
    fn test_url_joins_endpoint() {
        let client = OpenAiPolicy::new(&config(), "sk-test-secret".into()).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains(r#"url: "https://example.test/v1/chat/completions""#));
        assert!(!debug.contains("sk-test-secret"));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let config = PolicyConfig {
            api_key_env: "CONNECT_FOUR_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..PolicyConfig::default()
        };
        let err = OpenAiPolicy::from_env(&config).unwrap_err();
        assert_eq!(
            err,
            PolicyError::MissingCredentials("CONNECT_FOUR_TEST_KEY_THAT_IS_NEVER_SET".into())
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_chat_body_shape() {
        let body = chat_body("gpt-3.5-turbo", 8, "rules", " 0  0");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 8);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "rules");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], " 0  0");
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"3"}}]}"#;
        assert_eq!(extract_content(body), Ok("3".to_string()));
    }

    #[test]
    fn test_extract_content_rejects_empty() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(PolicyError::Malformed(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(PolicyError::Malformed(_))
        ));
    }
}
