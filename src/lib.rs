//! Synthetic multi-party discussions between LLM-driven personas.
//!
//! The crate builds simulated forum threads: several [`Actor`](dialogue::Actor)s,
//! each conditioned on a persona, take turns chosen by a
//! [`TurnManager`](dialogue::TurnManager) while a moderator may interject.
//! Finished transcripts can then be replayed against an annotator actor.
//!
//! Text generation is delegated to a [`GeneratingAgent`]; the bundled
//! [`ChatCompletionsAgent`](backends::ChatCompletionsAgent) talks to any
//! OpenAI-compatible `/chat/completions` endpoint.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use synth_dialogue::backends::ChatCompletionsAgent;
//! use synth_dialogue::records::{ConversationConfig, ConversationGenerator};
//! use synth_dialogue::GeneratingAgent;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversationConfig::from_file("conv.json")?;
//! let agent: Arc<dyn GeneratingAgent> =
//!     Arc::new(ChatCompletionsAgent::builder("http://localhost:8080/v1", "llama").build()?);
//! let generator = ConversationGenerator::new(config, agent.clone(), Some(agent))?;
//!
//! let mut conversation = generator.produce_conversation()?;
//! conversation.run().await?;
//! println!("{conversation}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod backends;
pub mod chat;
pub mod dialogue;
pub mod error;
pub mod memory;
pub mod persona;
pub mod records;
pub mod synthesis;

#[cfg(test)]
mod test_support;

pub use agent::GeneratingAgent;
pub use dialogue::{AnnotationConv, Conversation, ConversationState};
pub use error::{AgentError, DialogueError, RecordError};
