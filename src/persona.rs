//! Persona records used to condition simulated users.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::records::{read_record, write_json};

/// A simulated forum user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(alias = "name", default)]
    pub username: String,
    pub age: u32,
    pub sex: String,
    pub sexual_orientation: String,
    pub demographic_group: String,
    pub current_employment: String,
    pub education_level: String,
    pub intent: String,
    #[serde(default)]
    pub personality_characteristics: Vec<String>,
}

impl Persona {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        read_record(path.as_ref())
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        write_json(path.as_ref(), self)
    }

    /// Renders the persona as prompt-ready attribute phrases.
    #[must_use]
    pub fn to_attribute_list(&self) -> Vec<String> {
        let mut attributes = vec![
            format!("{} years old", self.age),
            self.sexual_orientation.clone(),
            self.demographic_group.clone(),
            self.current_employment.clone(),
        ];
        attributes.extend(self.personality_characteristics.iter().cloned());
        attributes.push(sex_phrase(&self.sex).to_string());
        attributes.push(format!("with {} education", self.education_level));
        attributes.push(format!("and {} intent", self.intent));
        attributes
    }
}

fn sex_phrase(sex: &str) -> &'static str {
    match sex.to_lowercase().as_str() {
        "male" => "man",
        "female" => "woman",
        _ => "non-binary",
    }
}
