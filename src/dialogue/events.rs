//! Progress events emitted while a conversation or annotation job runs.

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueEvent {
    /// The run has started.
    Started,

    /// A participant finished speaking.
    TurnCompleted {
        /// Zero-based regular turn the message belongs to.
        turn: usize,
        /// Name of the speaker.
        speaker: String,
        /// Raw generated text.
        message: String,
        /// Whether the speaker was the moderator.
        moderator: bool,
    },

    /// An input message was annotated.
    Annotated {
        /// Position of the message in the source transcript.
        index: usize,
        /// Speaker of the annotated message.
        speaker: String,
        /// The annotated message.
        message: String,
        /// The annotator's output.
        annotation: String,
    },

    /// The run has stopped.
    Stopped {
        /// Reason for stopping.
        reason: StopReason,
    },
}

/// Reason a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// All turns were produced.
    Completed,
    /// An unrecoverable error occurred.
    Error(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}
