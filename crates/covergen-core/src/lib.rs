pub mod ai;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod prompt;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::GeminiClient;
pub use clipboard::{Clipboard, SystemClipboard};
pub use config::Config;
pub use error::{GenerationError, FAILURE_MESSAGE};
pub use prompt::compose_prompt;
pub use session::{Notice, Session, SessionEvent, Submit, COPY_RESET};
pub use state::{ProfileField, UserProfile};
