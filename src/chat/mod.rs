mod format;
mod message;

pub use format::format_chat_message;
pub use message::{ChatMessage, ChatMessageBuilder, ChatRole};
