mod platform;
mod terminal;

pub use platform::{PlatformError, ScriptedPlatform, SentAttachment, SentMessage};
pub use terminal::run_interactive_terminal;
