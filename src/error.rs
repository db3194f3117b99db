use std::io;

use thiserror::Error;

/// Errors raised by a [`GeneratingAgent`](crate::agent::GeneratingAgent) while producing text.
#[derive(Debug, Error)]
pub enum AgentError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Errors returned by the model backend
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// Backend response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

/// Errors raised while configuring or running a conversation or annotation job.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// Malformed or inconsistent configuration, detected before any turn runs.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The turn manager proposed a speaker that has no matching actor.
    #[error("turn {turn}: no participant named '{name}'")]
    UnknownParticipant { turn: usize, name: String },
    /// The generating agent failed while an actor was speaking.
    #[error("turn {turn}: generation failed for '{speaker}': {source}")]
    Generation {
        turn: usize,
        speaker: String,
        #[source]
        source: AgentError,
    },
    /// The orchestrator already produced all of its turns.
    #[error("conversation is already complete")]
    CompletedConversation,
    /// A previous turn failed; the run cannot continue.
    #[error("conversation was aborted at turn {turn}")]
    Aborted { turn: usize },
}

impl DialogueError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        DialogueError::Configuration(message.into())
    }
}

/// Errors raised while reading or writing configuration and transcript records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid record {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: DialogueError,
    },
    #[error("{0} is not a directory")]
    NotADirectory(String),
}
