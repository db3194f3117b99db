//! Actors: persona-bound wrappers over a generating agent.

use std::sync::Arc;

use crate::agent::GeneratingAgent;
use crate::chat::ChatMessage;
use crate::error::AgentError;

/// Marker that starts another participant's post; generation halts there.
pub const STOP_MARKERS: [&str; 1] = ["User"];

/// How an actor frames its history when asked to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    /// Continues the discussion in character.
    User,
    /// Judges the discussion so far instead of continuing it.
    Annotator,
}

impl ActorRole {
    /// Type name recorded in exported documents.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::User => "LLMUser",
            Self::Annotator => "LLMAnnotator",
        }
    }

    fn turn_prompt(&self, name: &str, history: &[String]) -> ChatMessage {
        let joined = history.join("\n");
        let content = match self {
            Self::User => format!("{joined}\nUser {name} posted:"),
            Self::Annotator => format!("Conversation so far:\n\n{joined}\nOutput:"),
        };
        ChatMessage::user().content(content).build()
    }
}

/// A named, persona-bound speaker backed by a shared generating agent.
#[derive(Clone)]
pub struct Actor {
    name: String,
    attributes: Vec<String>,
    context: String,
    instructions: String,
    role: ActorRole,
    agent: Arc<dyn GeneratingAgent>,
}

impl Actor {
    /// Starts building an actor with the given in-conversation name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ActorBuilder {
        ActorBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    #[must_use]
    pub const fn role(&self) -> ActorRole {
        self.role
    }

    /// Returns the system prompt this actor is conditioned on.
    #[must_use]
    pub fn describe(&self) -> String {
        self.system_prompt().content
    }

    /// Produces this actor's next utterance given the visible history.
    ///
    /// The prompt is always `[system, turn cue]`; the role only decides how
    /// the turn cue frames `history`.
    pub async fn speak(&self, history: &[String]) -> Result<String, AgentError> {
        let messages = [
            self.system_prompt(),
            self.role.turn_prompt(&self.name, history),
        ];
        let stop: Vec<String> = STOP_MARKERS.iter().map(|s| s.to_string()).collect();
        self.agent.prompt(&messages, &stop).await
    }

    fn system_prompt(&self) -> ChatMessage {
        let content = format!(
            "You are {} {}. Context: {}. Your instructions: {}.",
            self.name,
            self.attributes.join(", "),
            self.context,
            self.instructions
        );
        ChatMessage::system().content(content).build()
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("attributes", &self.attributes)
            .field("agent", &"<dyn GeneratingAgent>")
            .finish()
    }
}

/// Builder for actors.
#[derive(Debug)]
pub struct ActorBuilder {
    name: String,
    attributes: Vec<String>,
    context: String,
    instructions: String,
}

impl ActorBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            context: String::new(),
            instructions: String::new(),
        }
    }

    /// Sets the persona attributes, e.g. `["42 years old", "well-mannered"]`.
    #[must_use]
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the discussion context (topic, setting).
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Builds a discussion participant.
    #[must_use]
    pub fn user(self, agent: Arc<dyn GeneratingAgent>) -> Actor {
        self.finish(ActorRole::User, agent)
    }

    /// Builds an annotator.
    #[must_use]
    pub fn annotator(self, agent: Arc<dyn GeneratingAgent>) -> Actor {
        self.finish(ActorRole::Annotator, agent)
    }

    fn finish(self, role: ActorRole, agent: Arc<dyn GeneratingAgent>) -> Actor {
        Actor {
            name: self.name,
            attributes: self.attributes,
            context: self.context,
            instructions: self.instructions,
            role,
            agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;
    use crate::test_support::RecordingAgent;

    fn alice(agent: Arc<dyn GeneratingAgent>) -> Actor {
        Actor::builder("alice")
            .attributes(["curious", "polite"])
            .context("a forum thread about bikes")
            .instructions("reply briefly")
            .user(agent)
    }

    #[test]
    fn describe_renders_system_prompt() {
        let actor = alice(RecordingAgent::new());
        assert_eq!(
            actor.describe(),
            "You are alice curious, polite. Context: a forum thread about bikes. \
             Your instructions: reply briefly."
        );
    }

    #[tokio::test]
    async fn user_prompt_cues_own_name() {
        let agent = RecordingAgent::scripted(["sure"]);
        let actor = alice(agent.clone());
        let history = vec!["User bob posted:\nhi".to_string()];

        let reply = actor.speak(&history).await.expect("speak");
        assert_eq!(reply, "sure");

        let calls = agent.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages[0].role, ChatRole::System);
        assert_eq!(calls[0].messages[1].role, ChatRole::User);
        assert_eq!(
            calls[0].turn_prompt(),
            "User bob posted:\nhi\nUser alice posted:"
        );
        assert_eq!(calls[0].stop, vec!["User".to_string()]);
    }

    #[tokio::test]
    async fn annotator_prompt_asks_for_output() {
        let agent = RecordingAgent::new();
        let annotator = Actor::builder("")
            .attributes(["expert"])
            .instructions("rate toxicity")
            .annotator(agent.clone());
        let history = vec!["User a posted:\nx".to_string(), "User b posted:\ny".to_string()];

        annotator.speak(&history).await.expect("speak");
        assert_eq!(
            agent.calls()[0].turn_prompt(),
            "Conversation so far:\n\nUser a posted:\nx\nUser b posted:\ny\nOutput:"
        );
        assert_eq!(annotator.role().type_name(), "LLMAnnotator");
    }

    #[tokio::test]
    async fn agent_failure_propagates() {
        let actor = alice(RecordingAgent::failing_on(vec![1]));
        let err = actor.speak(&[]).await.unwrap_err();
        assert!(matches!(err, AgentError::ProviderError(_)));
    }
}
