use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::agent::GeneratingAgent;
use crate::chat::ChatMessage;
use crate::error::AgentError;

/// One recorded call to [`RecordingAgent::prompt`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub stop: Vec<String>,
}

impl RecordedCall {
    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn turn_prompt(&self) -> &str {
        &self.messages[1].content
    }
}

/// Agent double that records every prompt and answers from a script.
///
/// Once the script runs out it answers `reply {n}` where `n` is the 1-based
/// call number. Calls listed in `fail_on` return a provider error instead.
#[derive(Default)]
pub(crate) struct RecordingAgent {
    calls: Mutex<Vec<RecordedCall>>,
    script: Mutex<VecDeque<String>>,
    fail_on: Vec<usize>,
}

impl RecordingAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        })
    }

    pub fn failing_on(calls: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            fail_on: calls,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GeneratingAgent for RecordingAgent {
    async fn prompt(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String, AgentError> {
        let number = {
            let mut guard = self.calls.lock().expect("calls lock");
            guard.push(RecordedCall {
                messages: messages.to_vec(),
                stop: stop.to_vec(),
            });
            guard.len()
        };
        if self.fail_on.contains(&number) {
            return Err(AgentError::ProviderError(format!("call {number} failed")));
        }
        let scripted = self.script.lock().expect("script lock").pop_front();
        Ok(scripted.unwrap_or_else(|| format!("reply {number}")))
    }
}
