//! Configuration records and the files they live in.

mod annotation;
mod conversation;
mod files;

pub use annotation::{AnnotationGenerator, AnnotatorConfig};
pub use conversation::{ConversationConfig, ConversationGenerator};
pub use files::{
    ensure_parent_dirs, generate_datetime_filename, read_files_from_directory, read_record,
    read_text, timestamp_now, write_json, TIMESTAMP_FORMAT,
};
