//! Generating agent for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Works against the OpenAI API as well as local servers exposing the same
//! schema (llama.cpp `server`, vLLM, Ollama).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::agent::GeneratingAgent;
use crate::chat::ChatMessage;
use crate::error::AgentError;

/// Stop markers always sent to the backend, ahead of the caller's own.
pub const DEFAULT_STOP_MARKERS: [&str; 2] = ["###", "\n\n"];

const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_SEED: u64 = 42;

/// Configuration for the chat-completions agent.
#[derive(Debug)]
pub struct ChatCompletionsConfig {
    /// Base URL up to and including the API version, e.g. `http://localhost:8080/v1`.
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<SecretString>,
    /// Maximum tokens to generate per turn.
    pub max_tokens: u32,
    /// Sampling seed, for reproducible runs on backends that honour it.
    pub seed: Option<u64>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_seconds: Option<u64>,
    /// Stop markers prepended to every request.
    pub default_stops: Vec<String>,
    /// Substrings deleted from every response (model-specific collapse artefacts).
    pub remove_strings: Vec<String>,
}

/// Agent backed by an OpenAI-compatible chat-completions endpoint.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAgent {
    config: Arc<ChatCompletionsConfig>,
    client: Client,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<&'a str>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionsResponse {
    choices: Vec<ChatCompletionsChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionsChoice {
    message: ChatCompletionsMsg,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionsMsg {
    content: Option<String>,
}

impl ChatCompletionsAgent {
    /// Creates a builder for the given endpoint and model.
    pub fn builder(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> ChatCompletionsAgentBuilder {
        ChatCompletionsAgentBuilder::new(base_url, model)
    }

    /// Creates an agent that reuses an existing HTTP client.
    pub fn with_client(client: Client, config: ChatCompletionsConfig) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn clean_response(&self, mut text: String) -> String {
        for needle in &self.config.remove_strings {
            if !needle.is_empty() {
                text = text.replace(needle.as_str(), "");
            }
        }
        text
    }
}

#[async_trait]
impl GeneratingAgent for ChatCompletionsAgent {
    async fn prompt(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String, AgentError> {
        let body = ChatCompletionsRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.config.max_tokens,
            seed: self.config.seed,
            temperature: self.config.temperature,
            stop: self
                .config
                .default_stops
                .iter()
                .chain(stop.iter())
                .map(String::as_str)
                .collect(),
            stream: false,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("chat-completions request payload: {}", json);
            }
        }

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let resp = request.send().await?;
        let status = resp.status();
        log::debug!("chat-completions HTTP status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = resp.text().await.unwrap_or_default();
            return Err(AgentError::AuthError(format!("{status}: {text}")));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AgentError::ProviderError(format!("{status}: {text}")));
        }

        let raw = resp.text().await?;
        let parsed: ChatCompletionsResponse = serde_json::from_str(&raw)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::ResponseFormatError {
                message: "response contained no message content".to_string(),
                raw_response: raw.clone(),
            })?;
        Ok(self.clean_response(content))
    }
}

/// Builder for [`ChatCompletionsAgent`].
#[derive(Debug)]
pub struct ChatCompletionsAgentBuilder {
    config: ChatCompletionsConfig,
}

impl ChatCompletionsAgentBuilder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            config: ChatCompletionsConfig {
                base_url: base_url.into(),
                model: model.into(),
                api_key: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                seed: Some(DEFAULT_SEED),
                temperature: None,
                timeout_seconds: None,
                default_stops: DEFAULT_STOP_MARKERS.iter().map(|s| s.to_string()).collect(),
                remove_strings: Vec::new(),
            },
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(key.into()));
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = Some(seconds);
        self
    }

    /// Replaces the stop markers sent with every request.
    pub fn default_stops(mut self, stops: Vec<String>) -> Self {
        self.config.default_stops = stops;
        self
    }

    pub fn remove_strings(mut self, strings: Vec<String>) -> Self {
        self.config.remove_strings = strings;
        self
    }

    /// Builds the agent with a fresh HTTP client.
    pub fn build(self) -> Result<ChatCompletionsAgent, AgentError> {
        let mut builder = Client::builder();
        if let Some(sec) = self.config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        let client = builder.build()?;
        Ok(ChatCompletionsAgent::with_client(client, self.config))
    }
}
