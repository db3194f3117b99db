//! Turn-by-turn orchestration of a multi-party discussion.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::chat::format_chat_message;
use crate::error::DialogueError;
use crate::memory::ContextWindow;
use crate::records::timestamp_now;

use super::actor::Actor;
use super::events::{DialogueEvent, StopReason};
use super::moderator::{ModeratorPlacement, ModeratorSchedule, ModeratorTrigger};
use super::transcript::{ConversationId, TranscriptEntry};
use super::turn::{TurnManager, TurnState};
use super::ConversationState;

/// Exported form of a finished (or failed) conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub timestamp: String,
    pub users: Vec<String>,
    pub user_types: Vec<String>,
    pub moderator: Option<String>,
    pub moderator_type: Option<String>,
    pub user_prompts: Vec<String>,
    pub moderator_prompt: Option<String>,
    /// Configured history window length.
    pub ctx_length: usize,
    pub logs: Vec<TranscriptEntry>,
}

#[derive(Debug)]
struct ModeratorSlot {
    actor: Actor,
    schedule: ModeratorSchedule,
}

#[derive(Debug, Clone, Copy)]
enum Speaker {
    User(usize),
    Moderator,
}

/// A discussion between named actors.
///
/// Each regular turn asks the [`TurnManager`] for a speaker, lets that actor
/// speak over the bounded history window, then records the utterance. A
/// moderator, when present, either answers after a regular turn or takes the
/// turn's place, depending on its [`ModeratorPlacement`].
pub struct Conversation {
    id: ConversationId,
    turn_manager: Box<dyn TurnManager>,
    users: Vec<Actor>,
    moderator: Option<ModeratorSlot>,
    conv_len: usize,
    history: ContextWindow,
    transcript: Vec<TranscriptEntry>,
    turns_taken: usize,
    state: ConversationState,
    event_sender: Option<mpsc::UnboundedSender<DialogueEvent>>,
}

impl Conversation {
    /// Builds a conversation over fully constructed actors.
    ///
    /// Fails when the roster is empty, names repeat, the moderator shares a
    /// name with a user, or the turn manager knows a name with no actor.
    pub fn new(
        turn_manager: Box<dyn TurnManager>,
        users: Vec<Actor>,
        moderator: Option<(Actor, ModeratorSchedule)>,
        history_ctx_len: usize,
        conv_len: usize,
    ) -> Result<Self, DialogueError> {
        if users.is_empty() {
            return Err(DialogueError::config("a conversation needs at least one user"));
        }
        let mut names = HashSet::new();
        for user in &users {
            if !names.insert(user.name()) {
                return Err(DialogueError::config(format!(
                    "user name '{}' appears more than once",
                    user.name()
                )));
            }
        }
        if let Some((actor, _)) = &moderator {
            if names.contains(actor.name()) {
                return Err(DialogueError::config(format!(
                    "moderator name '{}' is also a user name",
                    actor.name()
                )));
            }
        }
        if let Some(missing) = turn_manager
            .roster()
            .iter()
            .find(|name| !names.contains(name.as_str()))
        {
            return Err(DialogueError::config(format!(
                "turn manager schedules '{missing}', who is not a user"
            )));
        }

        Ok(Self {
            id: ConversationId::new(),
            turn_manager,
            users,
            moderator: moderator.map(|(actor, schedule)| ModeratorSlot { actor, schedule }),
            conv_len,
            history: ContextWindow::new(history_ctx_len),
            transcript: Vec::new(),
            turns_taken: 0,
            state: ConversationState::Initialized,
            event_sender: None,
        })
    }

    /// Creates an event receiver channel.
    #[must_use]
    pub fn create_event_channel(&mut self) -> mpsc::UnboundedReceiver<DialogueEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_sender = Some(tx);
        rx
    }

    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> ConversationState {
        self.state
    }

    #[must_use]
    pub const fn conv_len(&self) -> usize {
        self.conv_len
    }

    /// Regular turns produced so far.
    #[must_use]
    pub const fn turns_taken(&self) -> usize {
        self.turns_taken
    }

    /// Every utterance so far, in order. Never truncated.
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The formatted messages the next speaker will see.
    #[must_use]
    pub const fn history(&self) -> &ContextWindow {
        &self.history
    }

    #[must_use]
    pub fn users(&self) -> &[Actor] {
        &self.users
    }

    #[must_use]
    pub fn moderator(&self) -> Option<&Actor> {
        self.moderator.as_ref().map(|slot| &slot.actor)
    }

    /// Drives the conversation until every regular turn is produced.
    pub async fn run(&mut self) -> Result<(), DialogueError> {
        self.begin()?;
        while !self.state.is_terminal() {
            self.advance().await?;
        }
        Ok(())
    }

    /// Produces one regular turn, plus the moderator's answer when it is due.
    pub async fn advance(&mut self) -> Result<(), DialogueError> {
        self.begin()?;
        if self.state == ConversationState::Complete {
            return Ok(());
        }

        let turn = self.turns_taken;
        match self.step(turn).await {
            Ok(()) => {
                self.turns_taken += 1;
                if self.turns_taken >= self.conv_len {
                    self.finish(StopReason::Completed);
                }
                Ok(())
            }
            Err(err) => {
                log::error!("conversation {} failed at turn {turn}: {err}", self.id);
                self.finish(StopReason::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Exports the conversation with its metadata.
    #[must_use]
    pub fn export(&self) -> ConversationRecord {
        ConversationRecord {
            id: self.id.to_string(),
            timestamp: timestamp_now(),
            users: self.users.iter().map(|u| u.name().to_string()).collect(),
            user_types: self
                .users
                .iter()
                .map(|u| u.role().type_name().to_string())
                .collect(),
            moderator: self.moderator().map(|m| m.name().to_string()),
            moderator_type: self.moderator().map(|m| m.role().type_name().to_string()),
            user_prompts: self.users.iter().map(Actor::describe).collect(),
            moderator_prompt: self.moderator().map(Actor::describe),
            ctx_length: self.history.capacity(),
            logs: self.transcript.clone(),
        }
    }

    fn begin(&mut self) -> Result<(), DialogueError> {
        match self.state {
            ConversationState::Complete => Err(DialogueError::CompletedConversation),
            ConversationState::Failed => Err(DialogueError::Aborted {
                turn: self.turns_taken,
            }),
            ConversationState::Running => Ok(()),
            ConversationState::Initialized => {
                self.state = ConversationState::Running;
                log::debug!(
                    "conversation {} started: {} users, {} turns",
                    self.id,
                    self.users.len(),
                    self.conv_len
                );
                self.emit_event(DialogueEvent::Started);
                if self.conv_len == 0 {
                    self.finish(StopReason::Completed);
                }
                Ok(())
            }
        }
    }

    async fn step(&mut self, turn: usize) -> Result<(), DialogueError> {
        let placement = self.moderator.as_ref().map(|m| m.schedule.placement());

        if placement == Some(ModeratorPlacement::Replace) && self.moderator_fires(turn) {
            self.take_turn(turn, Speaker::Moderator).await?;
            return Ok(());
        }

        let roster = self.turn_manager.roster().to_vec();
        let name = self.turn_manager.next_speaker(&TurnState {
            turn,
            roster: &roster,
        });
        let index = self
            .users
            .iter()
            .position(|u| u.name() == name)
            .ok_or(DialogueError::UnknownParticipant { turn, name })?;
        let text = self.take_turn(turn, Speaker::User(index)).await?;

        if placement == Some(ModeratorPlacement::Additive) {
            let blank_gated = self
                .moderator
                .as_ref()
                .is_some_and(|m| m.schedule.trigger() == ModeratorTrigger::EveryTurn);
            if !(blank_gated && text.trim().is_empty()) && self.moderator_fires(turn) {
                self.take_turn(turn, Speaker::Moderator).await?;
            }
        }
        Ok(())
    }

    fn moderator_fires(&mut self, turn: usize) -> bool {
        self.moderator
            .as_mut()
            .is_some_and(|slot| slot.schedule.fires(turn))
    }

    async fn take_turn(&mut self, turn: usize, speaker: Speaker) -> Result<String, DialogueError> {
        let actor = match speaker {
            Speaker::User(index) => &self.users[index],
            Speaker::Moderator => match &self.moderator {
                Some(slot) => &slot.actor,
                None => {
                    return Err(DialogueError::UnknownParticipant {
                        turn,
                        name: "moderator".to_string(),
                    })
                }
            },
        };

        let history = self.history.entries();
        let text = actor
            .speak(&history)
            .await
            .map_err(|source| DialogueError::Generation {
                turn,
                speaker: actor.name().to_string(),
                source,
            })?;
        let name = actor.name().to_string();

        log::debug!("conversation {} turn {turn}: {name} spoke", self.id);
        self.history.push(format_chat_message(&name, &text));
        self.transcript.push(TranscriptEntry::new(name.clone(), text.clone()));
        self.emit_event(DialogueEvent::TurnCompleted {
            turn,
            speaker: name,
            message: text.clone(),
            moderator: matches!(speaker, Speaker::Moderator),
        });
        Ok(text)
    }

    fn finish(&mut self, reason: StopReason) {
        self.state = match reason {
            StopReason::Completed => ConversationState::Complete,
            StopReason::Error(_) => ConversationState::Failed,
        };
        self.emit_event(DialogueEvent::Stopped { reason });
    }

    fn emit_event(&self, event: DialogueEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("id", &self.id)
            .field("policy", &self.turn_manager.policy())
            .field("users", &self.users)
            .field("moderator", &self.moderator)
            .field("conv_len", &self.conv_len)
            .field("turns_taken", &self.turns_taken)
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.export()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
