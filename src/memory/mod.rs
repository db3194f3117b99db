pub mod sliding_window;

pub use sliding_window::{ContextWindow, DEFAULT_HISTORY_CTX_LEN};
