//! Transcript entries and the identifiers attached to exported documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a generated conversation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ConversationId(Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConversationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

/// One posted message. Serialized as a `[speaker, message]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TranscriptEntry {
    pub speaker: String,
    pub message: String,
}

impl TranscriptEntry {
    pub fn new(speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            message: message.into(),
        }
    }
}

impl From<(String, String)> for TranscriptEntry {
    fn from((speaker, message): (String, String)) -> Self {
        Self { speaker, message }
    }
}

impl From<TranscriptEntry> for (String, String) {
    fn from(entry: TranscriptEntry) -> Self {
        (entry.speaker, entry.message)
    }
}

/// One annotated message. Serialized as a `[message, annotation]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct AnnotationEntry {
    pub message: String,
    pub annotation: String,
}

impl From<(String, String)> for AnnotationEntry {
    fn from((message, annotation): (String, String)) -> Self {
        Self {
            message,
            annotation,
        }
    }
}

impl From<AnnotationEntry> for (String, String) {
    fn from(entry: AnnotationEntry) -> Self {
        (entry.message, entry.annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_serialize_as_pairs() {
        let entry = TranscriptEntry::new("alice", "hi");
        let json = serde_json::to_string(&entry).expect("serialize");
        assert_eq!(json, r#"["alice","hi"]"#);
        let back: TranscriptEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, entry);
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(serde_json::from_str::<TranscriptEntry>(r#"["only one"]"#).is_err());
        assert!(serde_json::from_str::<AnnotationEntry>(r#"{"message":"x"}"#).is_err());
    }
}
