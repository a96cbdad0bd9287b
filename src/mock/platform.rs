use std::collections::BTreeMap;
use std::io;

use thiserror::Error;

use crate::session::{UserId, UserProfile};
use crate::{ChatPlatform, OutgoingMessage};

/// Error type for the in-memory platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("delivery refused")]
    DeliveryRefused,
    #[error("failed to read attachment: {0}")]
    Io(#[from] io::Error),
}

/// A message the platform accepted, with the attachment contents captured at
/// send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub content: String,
    pub attachment: Option<SentAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAttachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A scriptable in-memory chat platform.
///
/// Holds a user directory and records every delivered message. Delivery can
/// be made to fail for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlatform {
    users: BTreeMap<UserId, UserProfile>,
    sent: Vec<SentMessage>,
    refuse_delivery: bool,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return their id. Ids are assigned in order from 1.
    pub fn add_user(&mut self, name: &str, bot: bool) -> UserId {
        let id = UserId(self.users.len() as u64 + 1);
        self.users.insert(
            id,
            UserProfile {
                id,
                name: name.to_string(),
                bot,
            },
        );
        id
    }

    /// Look a user up by name.
    pub fn find_user(&self, name: &str) -> Option<UserId> {
        self.users
            .values()
            .find(|profile| profile.name == name)
            .map(|profile| profile.id)
    }

    /// Id for `name`, registering a human user if needed.
    pub fn user_id(&mut self, name: &str) -> UserId {
        self.find_user(name)
            .unwrap_or_else(|| self.add_user(name, false))
    }

    pub fn users(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.values()
    }

    /// Make subsequent deliveries fail (or succeed again).
    pub fn refuse_delivery(&mut self, refuse: bool) {
        self.refuse_delivery = refuse;
    }

    pub fn sent(&self) -> &[SentMessage] {
        &self.sent
    }

    /// Remove and return everything delivered so far.
    pub fn take_sent(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.sent)
    }
}

impl ChatPlatform for ScriptedPlatform {
    type Error = PlatformError;

    fn user(&mut self, id: UserId) -> Result<UserProfile, Self::Error> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(PlatformError::UnknownUser(id))
    }

    fn send_message(&mut self, message: &OutgoingMessage<'_>) -> Result<(), Self::Error> {
        if self.refuse_delivery {
            return Err(PlatformError::DeliveryRefused);
        }

        let attachment = match message.attachment {
            Some(attachment) => Some(SentAttachment {
                name: attachment.name.to_string(),
                content_type: attachment.content_type.to_string(),
                bytes: std::fs::read(attachment.path)?,
            }),
            None => None,
        };
        self.sent.push(SentMessage {
            content: message.content.to_string(),
            attachment,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attachment;
    use std::io::Write;

    #[test]
    fn users_get_sequential_ids() {
        let mut platform = ScriptedPlatform::new();
        let alice = platform.add_user("alice", false);
        let bot = platform.add_user("chessbot", true);

        assert_eq!(alice, UserId(1));
        assert_eq!(bot, UserId(2));
        assert!(platform.user(bot).unwrap().bot);
        assert_eq!(platform.user_id("alice"), alice);
        assert_eq!(platform.user_id("bob"), UserId(3));
    }

    #[test]
    fn unknown_user_is_an_error() {
        let mut platform = ScriptedPlatform::new();
        assert!(matches!(
            platform.user(UserId(9)),
            Err(PlatformError::UnknownUser(UserId(9)))
        ));
    }

    #[test]
    fn attachment_is_read_at_send_time() {
        let mut platform = ScriptedPlatform::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<svg/>").unwrap();

        platform
            .send_message(&OutgoingMessage {
                content: "hi",
                attachment: Some(Attachment {
                    name: "board.svg",
                    content_type: "image/svg+xml",
                    path: file.path(),
                }),
            })
            .unwrap();
        drop(file);

        let sent = platform.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachment.as_ref().unwrap().bytes, b"<svg/>");
        assert!(platform.sent().is_empty());
    }

    #[test]
    fn refused_delivery_records_nothing() {
        let mut platform = ScriptedPlatform::new();
        platform.refuse_delivery(true);

        let result = platform.send_message(&OutgoingMessage {
            content: "hi",
            attachment: None,
        });

        assert!(matches!(result, Err(PlatformError::DeliveryRefused)));
        assert!(platform.sent().is_empty());
    }
}
