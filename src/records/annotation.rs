use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::GeneratingAgent;
use crate::dialogue::{Actor, AnnotationConv, SourceTranscript};
use crate::error::RecordError;
use crate::memory::DEFAULT_HISTORY_CTX_LEN;

use super::files::{read_record, write_json};

fn default_history_ctx_len() -> usize {
    DEFAULT_HISTORY_CTX_LEN
}

/// Annotator persona and task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub attributes: Vec<String>,
    pub instructions: String,
    #[serde(default = "default_history_ctx_len")]
    pub history_ctx_len: usize,
}

impl AnnotatorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        read_record(path.as_ref())
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        write_json(path.as_ref(), self)
    }
}

/// Builds annotation jobs that share one annotator configuration and agent.
pub struct AnnotationGenerator {
    config: AnnotatorConfig,
    agent: Arc<dyn GeneratingAgent>,
}

impl AnnotationGenerator {
    pub fn new(config: AnnotatorConfig, agent: Arc<dyn GeneratingAgent>) -> Self {
        Self { config, agent }
    }

    #[must_use]
    pub const fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// An annotation job over `source`. The annotator is anonymous and has no context.
    pub fn produce_annotation(&self, source: SourceTranscript) -> AnnotationConv {
        let annotator = Actor::builder("")
            .attributes(self.config.attributes.iter().cloned())
            .instructions(self.config.instructions.as_str())
            .annotator(Arc::clone(&self.agent));
        AnnotationConv::new(annotator, source, self.config.history_ctx_len)
    }
}
