use async_trait::async_trait;

use crate::chat::ChatMessage;
use crate::error::AgentError;

/// Anything that can turn a structured prompt into text.
///
/// Implementations must stop generating at the first occurrence of any
/// marker in `stop` and must report backend failures as [`AgentError`]
/// rather than returning empty text. One agent may back several actors, so
/// implementations are shared behind an `Arc`.
#[async_trait]
pub trait GeneratingAgent: Send + Sync {
    async fn prompt(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String, AgentError>;
}
