//! Synthesis of conversation and annotator configurations from persona pools.

use std::collections::BTreeMap;
use std::path::Path;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DialogueError, RecordError};
use crate::memory::DEFAULT_HISTORY_CTX_LEN;
use crate::persona::Persona;
use crate::records::{read_record, AnnotatorConfig, ConversationConfig};

/// Name given to generated moderators.
pub const MODERATOR_NAME: &str = "moderator";

/// Attributes given to generated moderators.
pub const DEFAULT_MODERATOR_ATTRIBUTES: [&str; 3] = ["just", "strict", "understanding"];

fn default_conv_len() -> usize {
    4
}

fn default_history_ctx_len() -> usize {
    DEFAULT_HISTORY_CTX_LEN
}

/// Run parameters shared by every generated conversation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub turn_manager_type: String,
    #[serde(default)]
    pub turn_manager_config: BTreeMap<String, f64>,
    #[serde(default = "default_conv_len")]
    pub conv_len: usize,
    #[serde(default = "default_history_ctx_len")]
    pub history_ctx_len: usize,
}

impl GenerationSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        read_record(path.as_ref())
    }
}

/// Draws `num_users` distinct personas and one topic into a conversation configuration.
#[allow(clippy::too_many_arguments)]
pub fn generate_conv_config<R: Rng + ?Sized>(
    personas: &[Persona],
    topics: &[String],
    user_instructions: &str,
    mod_instructions: &str,
    settings: &GenerationSettings,
    num_users: usize,
    include_mod: bool,
    rng: &mut R,
) -> Result<ConversationConfig, DialogueError> {
    if num_users > personas.len() {
        return Err(DialogueError::config(format!(
            "{num_users} users requested but only {} personas are available",
            personas.len()
        )));
    }
    let topic = topics
        .choose(rng)
        .ok_or_else(|| DialogueError::config("no topics to choose from"))?;

    let chosen: Vec<&Persona> = index::sample(rng, personas.len(), num_users)
        .into_iter()
        .map(|i| &personas[i])
        .collect();

    let config = ConversationConfig {
        context: topic.clone(),
        user_names: chosen.iter().map(|p| p.username.clone()).collect(),
        user_attributes: chosen.iter().map(|p| p.to_attribute_list()).collect(),
        user_instructions: user_instructions.to_string(),
        turn_manager_type: settings.turn_manager_type.clone(),
        turn_manager_config: settings.turn_manager_config.clone(),
        conv_len: settings.conv_len,
        history_ctx_len: settings.history_ctx_len,
        moderator_name: include_mod.then(|| MODERATOR_NAME.to_string()),
        moderator_attributes: include_mod
            .then(|| DEFAULT_MODERATOR_ATTRIBUTES.iter().map(|s| s.to_string()).collect()),
        moderator_instructions: include_mod.then(|| mod_instructions.to_string()),
    };
    config.validate()?;
    Ok(config)
}

/// One annotator attribute per persona: its attribute list joined by spaces.
pub fn generate_annotator_config(
    personas: &[Persona],
    instructions: &str,
    history_ctx_len: usize,
) -> AnnotatorConfig {
    AnnotatorConfig {
        attributes: personas
            .iter()
            .map(|p| p.to_attribute_list().join(" "))
            .collect(),
        instructions: instructions.to_string(),
        history_ctx_len,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn persona(name: &str) -> Persona {
        Persona {
            username: name.to_string(),
            age: 30,
            sex: "male".to_string(),
            sexual_orientation: "straight".to_string(),
            demographic_group: "white".to_string(),
            current_employment: "teacher".to_string(),
            education_level: "college".to_string(),
            intent: "neutral".to_string(),
            personality_characteristics: vec!["kind".to_string()],
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            turn_manager_type: "random".to_string(),
            turn_manager_config: BTreeMap::new(),
            conv_len: 10,
            history_ctx_len: 3,
        }
    }

    #[test]
    fn samples_distinct_personas_and_a_topic() {
        let personas: Vec<Persona> = ["a", "b", "c", "d", "e"].iter().map(|n| persona(n)).collect();
        let topics = vec!["cats".to_string(), "dogs".to_string()];
        let mut rng = StdRng::seed_from_u64(5);

        let config = generate_conv_config(
            &personas, &topics, "be nice", "moderate", &settings(), 3, true, &mut rng,
        )
        .expect("config");

        assert_eq!(config.user_names.len(), 3);
        let mut names = config.user_names.clone();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert!(topics.contains(&config.context));
        assert_eq!(config.conv_len, 10);
        assert_eq!(config.moderator_name.as_deref(), Some("moderator"));
        assert_eq!(
            config.moderator_attributes,
            Some(vec!["just".to_string(), "strict".to_string(), "understanding".to_string()])
        );
        assert_eq!(config.user_attributes[0][0], "30 years old");
    }

    #[test]
    fn without_moderator_leaves_fields_empty() {
        let personas = vec![persona("a"), persona("b")];
        let mut rng = StdRng::seed_from_u64(1);
        let config = generate_conv_config(
            &personas,
            &["t".to_string()],
            "u",
            "m",
            &settings(),
            2,
            false,
            &mut rng,
        )
        .expect("config");
        assert!(!config.has_moderator());
        assert!(config.moderator_attributes.is_none());
    }

    #[test]
    fn too_many_users_or_no_topics_fail() {
        let personas = vec![persona("a")];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_conv_config(
            &personas,
            &["t".to_string()],
            "u",
            "m",
            &settings(),
            2,
            true,
            &mut rng
        )
        .is_err());
        assert!(
            generate_conv_config(&personas, &[], "u", "m", &settings(), 1, true, &mut rng).is_err()
        );
    }

    #[test]
    fn annotator_attributes_flatten_personas() {
        let config = generate_annotator_config(&[persona("a")], "rate it", 2);
        assert_eq!(
            config.attributes,
            vec!["30 years old straight white teacher kind man with college education and neutral intent"]
        );
        assert_eq!(config.history_ctx_len, 2);
    }
}
