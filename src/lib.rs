use std::path::Path;

use session::{UserId, UserProfile};

pub mod board;
pub mod bot;
pub mod config;
pub mod movegen;
pub mod notation;
pub mod render;
pub mod session;

pub mod mock;

/// A message posted to the channel a command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingMessage<'a> {
    pub content: &'a str,
    /// File to upload alongside the text, if any.
    pub attachment: Option<Attachment<'a>>,
}

/// A file attached to an [`OutgoingMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment<'a> {
    /// Name shown to chat users.
    pub name: &'a str,
    pub content_type: &'a str,
    /// Where the file currently lives; only valid for the duration of the call.
    pub path: &'a Path,
}

/// Trait for the chat service the bot runs on.
///
/// Abstracts over a real network client and the scripted/terminal mock,
/// providing user lookup and message delivery for [`bot::ChessBot`].
pub trait ChatPlatform {
    /// Error type for lookup and delivery failures.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Resolve a user's profile.
    fn user(&mut self, id: UserId) -> Result<UserProfile, Self::Error>;

    /// Post a message to the channel.
    ///
    /// Implementations must read any attachment before returning; the file is
    /// removed afterwards.
    fn send_message(&mut self, message: &OutgoingMessage<'_>) -> Result<(), Self::Error>;
}
