use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::settings::LlmSettings;

/// One message in OpenAI-compatible wire form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiMessage {
    pub role: &'static str,
    pub content: String,
}

impl ApiMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ApiMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can turn a chat request into the assistant's text.
///
/// A missing completion is returned as an empty string; callers decide on the
/// fallback.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// Chat-completion client for the LiteRouter gateway.
pub struct LiteRouterClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LiteRouterClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let Some(api_key) = settings.api_key.clone().filter(|key| !key.is_empty()) else {
            bail!("LITEROUTER_API_KEY is not set");
        };

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            api_key,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for LiteRouterClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "POST {} ({} messages, max_tokens {})",
            self.endpoint,
            request.messages.len(),
            request.max_tokens
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call chat API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat API error ({status}): {error_text}");
            return Err(anyhow!("API error: {status}"));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat API response")?;

        Ok(parsed.into_text())
    }
}
