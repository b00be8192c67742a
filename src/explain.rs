//! Phrase explanations from a hosted completion API
//!
//! The server forwards a phrase the learner selected in the lyrics to a chat
//! completion model and returns a short explanation of everyday usage.
//! Provider failures never reach the learner: they are logged and replaced
//! by [`FALLBACK_EXPLANATION`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Returned instead of an explanation whenever the completion API fails
pub const FALLBACK_EXPLANATION: &str = "An error occurred while fetching the explanation.";

pub const SYSTEM_PROMPT: &str = "You are helping people learn languages through music.";

/// Build the user prompt for a selected phrase
pub fn user_prompt(phrase: &str) -> String {
    format!(
        "Explain how the following phrase is used in normal conversations, keep it short:\n\n'{}'",
        phrase
    )
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExplainError {
    #[error("No text selected.")]
    EmptyInput,
}

/// A completion backend able to explain a phrase
#[async_trait]
pub trait PhraseExplainer: Send + Sync {
    /// Returns the unique name of this backend (e.g., "openai")
    fn name(&self) -> &str;

    /// Ask the backend to explain a phrase; returns the raw response text
    async fn complete(&self, phrase: &str) -> Result<String>;
}

/// Explain a phrase, mapping any backend failure to the fallback message.
///
/// Blank input is rejected before the backend is called.
pub async fn explain_phrase(
    explainer: &dyn PhraseExplainer,
    text: &str,
) -> Result<String, ExplainError> {
    let phrase = text.trim();
    if phrase.is_empty() {
        return Err(ExplainError::EmptyInput);
    }

    match explainer.complete(phrase).await {
        Ok(explanation) => Ok(explanation.trim().to_string()),
        Err(e) => {
            tracing::error!("Error calling {} for an explanation: {:#}", explainer.name(), e);
            Ok(FALLBACK_EXPLANATION.to_string())
        }
    }
}

/// Settings for the OpenAI chat completions backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key; without one every request fails over to the fallback
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// OpenAI chat completions client
pub struct OpenAiExplainer {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiExplainer {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        if config.api_key.is_none() {
            tracing::warn!("No OpenAI API key configured; explanations will be unavailable");
        }

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PhraseExplainer for OpenAiExplainer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, phrase: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .context("OpenAI API key is not configured")?;

        let prompt = user_prompt(phrase);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        tracing::debug!("Requesting explanation from {} ({})", url, self.config.model);

        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Completion request failed")?
            .error_for_status()
            .context("Completion API returned an error status")?
            .json()
            .await
            .context("Failed to parse completion response")?;

        response
            .into_text()
            .context("Completion response contained no message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExplainer {
        calls: AtomicUsize,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl PhraseExplainer for CountingExplainer {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _phrase: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => anyhow::bail!("service unavailable"),
            }
        }
    }

    #[tokio::test]
    async fn test_blank_input_never_calls_backend() {
        let explainer = CountingExplainer {
            calls: AtomicUsize::new(0),
            reply: Some("unused"),
        };

        assert_eq!(explain_phrase(&explainer, "").await, Err(ExplainError::EmptyInput));
        assert_eq!(explain_phrase(&explainer, "  \n ").await, Err(ExplainError::EmptyInput));
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explanation_is_trimmed() {
        let explainer = CountingExplainer {
            calls: AtomicUsize::new(0),
            reply: Some("\n  \"Vivir mi vida\" means living my life.  \n"),
        };

        let explanation = explain_phrase(&explainer, "vivir mi vida").await.unwrap();
        assert_eq!(explanation, "\"Vivir mi vida\" means living my life.");
        assert_eq!(explainer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_fallback() {
        let explainer = CountingExplainer {
            calls: AtomicUsize::new(0),
            reply: None,
        };

        let explanation = explain_phrase(&explainer, "je veux").await.unwrap();
        assert_eq!(explanation, FALLBACK_EXPLANATION);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let explainer = OpenAiExplainer::new(OpenAiConfig::default()).unwrap();

        let err = explainer.complete("ya rayah").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
        assert_eq!(
            explain_phrase(&explainer, "ya rayah").await.unwrap(),
            FALLBACK_EXPLANATION
        );
    }

    #[test]
    fn test_request_shape() {
        let prompt = user_prompt("où t'es");
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: 150,
            temperature: 0.7,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("keep it short:\n\n'où t'es'"));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"id": "chatcmpl-1", "choices": [{"index": 0, "message": {"role": "assistant", "content": " Hi "}, "finish_reason": "stop"}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().as_deref(), Some(" Hi "));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }
}
