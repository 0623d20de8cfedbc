//! OpenAI-compatible chat completions backend.
//!
//! This module provides a blocking client for a `/chat/completions` endpoint
//! and implements [`TextGenerator`] on top of it.

use crate::ai::backend::TextGenerator;
use crate::ai::fallback::FallbackPool;
use crate::ai::prompts::SYSTEM_PROMPT;
use crate::constants::{
    REMOTE_FREQUENCY_PENALTY, REMOTE_MAX_TOKENS, REMOTE_PRESENCE_PENALTY, REMOTE_TEMPERATURE,
    REMOTE_TOP_P,
};
use crate::errors::{AIError, AppError, AppResult};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (system, user, assistant)
    pub role: String,
    /// The content of the message
    pub content: String,
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemoteSampling {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for RemoteSampling {
    fn default() -> Self {
        Self {
            max_tokens: REMOTE_MAX_TOKENS,
            temperature: REMOTE_TEMPERATURE,
            top_p: REMOTE_TOP_P,
            frequency_penalty: REMOTE_FREQUENCY_PENALTY,
            presence_penalty: REMOTE_PRESENCE_PENALTY,
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(flatten)]
    sampling: RemoteSampling,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Builds the message sequence for one call: persona, prior turns, prompt.
pub fn build_messages(prompt: &str, history: Option<&str>) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];
    if let Some(history) = history.filter(|h| !h.trim().is_empty()) {
        messages.push(Message::user(history));
    }
    messages.push(Message::user(prompt));
    messages
}

/// Client for a remote chat completions API.
pub struct RemoteBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    sampling: RemoteSampling,
    client: Client,
    fallback: FallbackPool,
}

impl RemoteBackend {
    /// Creates a new remote backend.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1")
    /// * `model` - Chat model name (e.g., "gpt-3.5-turbo")
    /// * `api_key` - Bearer credential; a missing key only fails at call time
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            sampling: RemoteSampling::default(),
            client,
            fallback: FallbackPool::remote_default(),
        })
    }

    pub fn with_sampling(mut self, sampling: RemoteSampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sends a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No API key is configured
    /// - The API is not reachable or times out
    /// - Model is not found
    /// - API returns an error response or an unparsable body
    pub fn chat(&self, messages: &[Message]) -> AppResult<String> {
        let api_key = self.api_key.as_deref().ok_or(AIError::MissingCredential)?;
        debug!("Sending chat request with model: {}", self.model);

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            sampling: self.sampling,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(AIError::RemoteUnreachable)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(AIError::ModelNotFound(self.model.clone()).into());
            }

            return Err(
                AIError::InvalidResponse(format!("HTTP {}: {}", status, error_text)).into(),
            );
        }

        let completion: ChatCompletionResponse = response.json().map_err(|e| {
            AIError::InvalidResponse(format!("Failed to parse chat response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AIError::EmptyCompletion.into());
        }

        debug!("Received chat response");
        Ok(content)
    }
}

impl TextGenerator for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn try_generate(&self, prompt: &str, history: Option<&str>) -> AppResult<String> {
        self.chat(&build_messages(prompt, history))
    }

    fn fallback_pool(&self) -> &FallbackPool {
        &self.fallback
    }
}
