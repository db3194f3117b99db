//! Multi-party dialogue generation and transcript annotation.
//!
//! A [`Conversation`] drives a fixed number of turns between [`Actor`]s,
//! choosing speakers through a [`TurnManager`] and optionally letting a
//! moderator interject on a [`ModeratorSchedule`]. An [`AnnotationConv`]
//! replays a finished transcript against a single annotator.

mod actor;
mod annotation;
mod conversation;
mod events;
mod moderator;
mod transcript;
mod turn;

pub use actor::{Actor, ActorBuilder, ActorRole, STOP_MARKERS};
pub use annotation::{AnnotationConv, AnnotationRecord, SourceTranscript};
pub use conversation::{Conversation, ConversationRecord};
pub use events::{DialogueEvent, StopReason};
pub use moderator::{ModeratorPlacement, ModeratorSchedule, ModeratorSettings, ModeratorTrigger};
pub use transcript::{AnnotationEntry, ConversationId, TranscriptEntry};
pub use turn::{
    build_turn_manager, RandomTurns, RoundRobin, TurnManager, TurnPolicy, TurnSettings, TurnState,
};

/// Lifecycle of a conversation or annotation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// Built but not started.
    #[default]
    Initialized,
    /// At least one step has run and more remain.
    Running,
    /// Every step was produced.
    Complete,
    /// A step failed; the partial transcript is kept.
    Failed,
}

impl ConversationState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}
