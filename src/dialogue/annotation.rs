//! Replaying a finished transcript against an annotator.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::chat::format_chat_message;
use crate::error::{DialogueError, RecordError};
use crate::memory::ContextWindow;
use crate::records::{read_record, timestamp_now};

use super::actor::Actor;
use super::conversation::ConversationRecord;
use super::events::{DialogueEvent, StopReason};
use super::transcript::{AnnotationEntry, TranscriptEntry};
use super::ConversationState;

/// The part of an exported conversation an annotation job needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTranscript {
    pub id: String,
    pub logs: Vec<TranscriptEntry>,
}

impl SourceTranscript {
    /// Loads a previously exported conversation; unrelated fields are ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        read_record(path.as_ref())
    }
}

impl From<&ConversationRecord> for SourceTranscript {
    fn from(record: &ConversationRecord) -> Self {
        Self {
            id: record.id.clone(),
            logs: record.logs.clone(),
        }
    }
}

/// Exported form of an annotation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub conv_id: String,
    pub timestamp: String,
    pub annotator_type: String,
    pub annotator_prompt: String,
    pub ctx_length: usize,
    pub logs: Vec<AnnotationEntry>,
}

/// Annotates each message of a source transcript in order.
///
/// The message being annotated is pushed into the window before the
/// annotator is asked, so with a window of one it sees only that message.
pub struct AnnotationConv {
    annotator: Actor,
    source: SourceTranscript,
    history: ContextWindow,
    annotations: Vec<AnnotationEntry>,
    state: ConversationState,
    event_sender: Option<mpsc::UnboundedSender<DialogueEvent>>,
}

impl AnnotationConv {
    #[must_use]
    pub fn new(annotator: Actor, source: SourceTranscript, history_ctx_len: usize) -> Self {
        Self {
            annotator,
            source,
            history: ContextWindow::new(history_ctx_len),
            annotations: Vec::new(),
            state: ConversationState::Initialized,
            event_sender: None,
        }
    }

    /// Creates an event receiver channel.
    #[must_use]
    pub fn create_event_channel(&mut self) -> mpsc::UnboundedReceiver<DialogueEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_sender = Some(tx);
        rx
    }

    #[must_use]
    pub const fn state(&self) -> ConversationState {
        self.state
    }

    #[must_use]
    pub fn source(&self) -> &SourceTranscript {
        &self.source
    }

    /// Annotations produced so far, aligned with the source transcript.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationEntry] {
        &self.annotations
    }

    #[must_use]
    pub const fn history(&self) -> &ContextWindow {
        &self.history
    }

    /// Annotates every source message. Runs once.
    pub async fn run(&mut self) -> Result<(), DialogueError> {
        match self.state {
            ConversationState::Complete => return Err(DialogueError::CompletedConversation),
            ConversationState::Failed => {
                return Err(DialogueError::Aborted {
                    turn: self.annotations.len(),
                })
            }
            ConversationState::Initialized | ConversationState::Running => {}
        }
        self.state = ConversationState::Running;
        self.emit_event(DialogueEvent::Started);
        log::debug!(
            "annotating conversation {} ({} messages)",
            self.source.id,
            self.source.logs.len()
        );

        for index in self.annotations.len()..self.source.logs.len() {
            let entry = &self.source.logs[index];
            self.history
                .push(format_chat_message(&entry.speaker, &entry.message));

            let history = self.history.entries();
            let annotation = match self.annotator.speak(&history).await {
                Ok(text) => text,
                Err(source) => {
                    let err = DialogueError::Generation {
                        turn: index,
                        speaker: entry.speaker.clone(),
                        source,
                    };
                    log::error!("annotation of {} failed: {err}", self.source.id);
                    self.state = ConversationState::Failed;
                    self.emit_event(DialogueEvent::Stopped {
                        reason: StopReason::Error(err.to_string()),
                    });
                    return Err(err);
                }
            };

            self.annotations.push(AnnotationEntry {
                message: entry.message.clone(),
                annotation: annotation.clone(),
            });
            self.emit_event(DialogueEvent::Annotated {
                index,
                speaker: entry.speaker.clone(),
                message: entry.message.clone(),
                annotation,
            });
        }

        self.state = ConversationState::Complete;
        self.emit_event(DialogueEvent::Stopped {
            reason: StopReason::Completed,
        });
        Ok(())
    }

    #[must_use]
    pub fn export(&self) -> AnnotationRecord {
        AnnotationRecord {
            conv_id: self.source.id.clone(),
            timestamp: timestamp_now(),
            annotator_type: self.annotator.role().type_name().to_string(),
            annotator_prompt: self.annotator.describe(),
            ctx_length: self.history.capacity(),
            logs: self.annotations.clone(),
        }
    }

    fn emit_event(&self, event: DialogueEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

impl fmt::Debug for AnnotationConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationConv")
            .field("source", &self.source.id)
            .field("annotator", &self.annotator)
            .field("annotated", &self.annotations.len())
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Display for AnnotationConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.export()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::agent::GeneratingAgent;
    use crate::test_support::RecordingAgent;

    fn annotator(agent: Arc<dyn GeneratingAgent>) -> Actor {
        Actor::builder("")
            .attributes(["a careful moderator"])
            .instructions("label each post as toxic or not")
            .annotator(agent)
    }

    fn source(messages: &[(&str, &str)]) -> SourceTranscript {
        SourceTranscript {
            id: "conv-1".to_string(),
            logs: messages
                .iter()
                .map(|(s, m)| TranscriptEntry::new(*s, *m))
                .collect(),
        }
    }

    #[tokio::test]
    async fn single_entry_window_sees_only_current_message() {
        let agent = RecordingAgent::new();
        let mut job = AnnotationConv::new(
            annotator(agent.clone()),
            source(&[("a", "one"), ("b", "two"), ("a", "three")]),
            1,
        );
        job.run().await.expect("run");

        assert_eq!(job.annotations().len(), 3);
        let calls = agent.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1].turn_prompt(),
            format!(
                "Conversation so far:\n\n{}\nOutput:",
                format_chat_message("b", "two")
            )
        );
        let messages: Vec<&str> = job.annotations().iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
        assert_eq!(job.annotations()[2].annotation, "reply 3");
    }

    #[tokio::test]
    async fn wider_window_accumulates_context() {
        let agent = RecordingAgent::new();
        let mut job = AnnotationConv::new(
            annotator(agent.clone()),
            source(&[("a", "one"), ("b", "two")]),
            4,
        );
        job.run().await.expect("run");
        assert_eq!(
            agent.calls()[1].turn_prompt(),
            format!(
                "Conversation so far:\n\n{}\n{}\nOutput:",
                format_chat_message("a", "one"),
                format_chat_message("b", "two")
            )
        );
    }

    #[tokio::test]
    async fn second_run_is_rejected() {
        let mut job = AnnotationConv::new(annotator(RecordingAgent::new()), source(&[("a", "x")]), 2);
        job.run().await.expect("run");
        assert!(matches!(
            job.run().await.unwrap_err(),
            DialogueError::CompletedConversation
        ));
    }

    #[tokio::test]
    async fn failure_aborts_with_partial_log() {
        let mut job = AnnotationConv::new(
            annotator(RecordingAgent::failing_on(vec![2])),
            source(&[("a", "x"), ("b", "y"), ("c", "z")]),
            2,
        );
        let err = job.run().await.unwrap_err();
        assert!(matches!(err, DialogueError::Generation { turn: 1, .. }));
        assert_eq!(job.annotations().len(), 1);
        assert_eq!(job.state(), ConversationState::Failed);
        assert!(matches!(
            job.run().await.unwrap_err(),
            DialogueError::Aborted { turn: 1 }
        ));
    }

    #[tokio::test]
    async fn empty_source_completes() {
        let agent = RecordingAgent::new();
        let mut job = AnnotationConv::new(annotator(agent.clone()), source(&[]), 2);
        job.run().await.expect("run");
        assert_eq!(job.state(), ConversationState::Complete);
        assert!(agent.calls().is_empty());
    }

    #[tokio::test]
    async fn export_carries_source_id_and_pairs() {
        let mut job = AnnotationConv::new(annotator(RecordingAgent::new()), source(&[("a", "x")]), 3);
        job.run().await.expect("run");
        let record = job.export();
        assert_eq!(record.conv_id, "conv-1");
        assert_eq!(record.annotator_type, "LLMAnnotator");
        assert_eq!(record.ctx_length, 3);
        let value = serde_json::to_value(&record).expect("json");
        assert_eq!(value["logs"], serde_json::json!([["x", "reply 1"]]));
    }

    #[test]
    fn source_loads_from_exported_conversation() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        write!(
            file,
            r#"{{"id": "abc", "timestamp": "24-01-01-00-00", "users": ["a"],
                "logs": [["a", "hi"], ["moderator", "welcome"]]}}"#
        )
        .expect("write");

        let source = SourceTranscript::from_file(file.path()).expect("load");
        assert_eq!(source.id, "abc");
        assert_eq!(source.logs[1], TranscriptEntry::new("moderator", "welcome"));
    }
}
