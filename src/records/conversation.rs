use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::GeneratingAgent;
use crate::dialogue::{
    build_turn_manager, Actor, Conversation, ModeratorSchedule, TurnPolicy, TurnSettings,
};
use crate::error::{DialogueError, RecordError};
use crate::memory::DEFAULT_HISTORY_CTX_LEN;

use super::files::{read_record, write_json};

const DEFAULT_CONV_LEN: usize = 4;

fn default_conv_len() -> usize {
    DEFAULT_CONV_LEN
}

fn default_history_ctx_len() -> usize {
    DEFAULT_HISTORY_CTX_LEN
}

/// Everything needed to build a [`Conversation`] besides the agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub context: String,
    pub user_names: Vec<String>,
    /// One attribute list per entry of `user_names`.
    pub user_attributes: Vec<Vec<String>>,
    pub user_instructions: String,
    pub turn_manager_type: String,
    #[serde(default)]
    pub turn_manager_config: BTreeMap<String, f64>,
    #[serde(default = "default_conv_len")]
    pub conv_len: usize,
    #[serde(default = "default_history_ctx_len")]
    pub history_ctx_len: usize,
    #[serde(default)]
    pub moderator_name: Option<String>,
    #[serde(default)]
    pub moderator_attributes: Option<Vec<String>>,
    #[serde(default)]
    pub moderator_instructions: Option<String>,
}

impl ConversationConfig {
    /// Checks the record's internal consistency and returns the parsed
    /// turn-manager settings.
    pub fn validate(&self) -> Result<TurnSettings, DialogueError> {
        if self.user_names.len() != self.user_attributes.len() {
            return Err(DialogueError::config(format!(
                "{} user names but {} attribute lists",
                self.user_names.len(),
                self.user_attributes.len()
            )));
        }
        if self.user_names.is_empty() {
            return Err(DialogueError::config("user_names is empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.user_names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(DialogueError::config(format!(
                "user name '{dup}' appears more than once"
            )));
        }

        let present = [
            self.moderator_name.is_some(),
            self.moderator_attributes.is_some(),
            self.moderator_instructions.is_some(),
        ];
        if present.contains(&true) && present.contains(&false) {
            return Err(DialogueError::config(
                "moderator_name, moderator_attributes and moderator_instructions must be given together",
            ));
        }
        if let Some(name) = &self.moderator_name {
            if seen.contains(name.as_str()) {
                return Err(DialogueError::config(format!(
                    "moderator name '{name}' is also a user name"
                )));
            }
        }

        TurnPolicy::from_tag(&self.turn_manager_type)?;
        let settings = TurnSettings::parse(&self.turn_manager_config)?;
        if let Some(unknown) = settings.weights.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(DialogueError::config(format!(
                "turn weight given for unknown participant '{unknown}'"
            )));
        }
        // Unweighted users default to 1.0.
        let all_zero = self
            .user_names
            .iter()
            .all(|name| settings.weights.get(name).is_some_and(|w| *w == 0.0));
        if all_zero {
            return Err(DialogueError::config("every turn weight is zero"));
        }
        if settings.moderator.configured && !self.has_moderator() {
            log::warn!("moderator settings given but the conversation has no moderator");
        }
        Ok(settings)
    }

    #[must_use]
    pub fn has_moderator(&self) -> bool {
        self.moderator_name.is_some()
    }

    /// Loads and validates a configuration file (JSON, or YAML by extension).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let config: Self = read_record(path)?;
        config.validate().map_err(|source| RecordError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        write_json(path.as_ref(), self)
    }
}

/// Builds ready-to-run conversations from a validated configuration.
pub struct ConversationGenerator {
    config: ConversationConfig,
    settings: TurnSettings,
    user_agent: Arc<dyn GeneratingAgent>,
    moderator_agent: Option<Arc<dyn GeneratingAgent>>,
}

impl ConversationGenerator {
    /// Fails when the configuration is inconsistent or names a moderator
    /// without a moderator agent.
    pub fn new(
        config: ConversationConfig,
        user_agent: Arc<dyn GeneratingAgent>,
        moderator_agent: Option<Arc<dyn GeneratingAgent>>,
    ) -> Result<Self, DialogueError> {
        let settings = config.validate()?;
        if config.has_moderator() && moderator_agent.is_none() {
            return Err(DialogueError::config(
                "the configuration has a moderator but no moderator agent was given",
            ));
        }
        Ok(Self {
            config,
            settings,
            user_agent,
            moderator_agent,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Builds a fresh conversation. Each call gets its own turn manager and id.
    pub fn produce_conversation(&self) -> Result<Conversation, DialogueError> {
        let config = &self.config;
        let turn_manager =
            build_turn_manager(&config.turn_manager_type, &config.user_names, &self.settings)?;

        let users = config
            .user_names
            .iter()
            .zip(&config.user_attributes)
            .map(|(name, attributes)| {
                Actor::builder(name.as_str())
                    .attributes(attributes.iter().cloned())
                    .context(config.context.as_str())
                    .instructions(config.user_instructions.as_str())
                    .user(Arc::clone(&self.user_agent))
            })
            .collect();

        let moderator = match (
            &config.moderator_name,
            &config.moderator_attributes,
            &config.moderator_instructions,
            &self.moderator_agent,
        ) {
            (Some(name), Some(attributes), Some(instructions), Some(agent)) => {
                let actor = Actor::builder(name.as_str())
                    .attributes(attributes.iter().cloned())
                    .context(config.context.as_str())
                    .instructions(instructions.as_str())
                    .user(Arc::clone(agent));
                let schedule =
                    ModeratorSchedule::from_settings(&self.settings.moderator, self.settings.seed);
                Some((actor, schedule))
            }
            _ => None,
        };

        Conversation::new(
            turn_manager,
            users,
            moderator,
            config.history_ctx_len,
            config.conv_len,
        )
    }
}
