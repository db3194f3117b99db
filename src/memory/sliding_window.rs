#[path = "sliding_window/core.rs"]
mod core;

pub use core::{ContextWindow, DEFAULT_HISTORY_CTX_LEN};
