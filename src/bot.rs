use std::path::PathBuf;

use log::{error, info, warn};
use thiserror::Error;

use crate::board::Board;
use crate::render::{RenderArtifact, SVG_CONTENT_TYPE};
use crate::session::{GameSession, Players, SessionError, SharedSession, UserId};
use crate::{Attachment, ChatPlatform, OutgoingMessage};

/// File name chat users see on the board image.
pub const BOARD_ATTACHMENT_NAME: &str = "chessboard.svg";

pub const GREETING: &str = "Hello world from the greetings module!";

/// Kind of value a command option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    User,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
}

/// A slash command as registered with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [OptionSpec],
}

/// Every command the bot answers.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "start_chess",
        description: "Start a new chess game with another user",
        options: &[OptionSpec {
            name: "opponent",
            description: "The user to play against",
            kind: OptionKind::User,
            required: true,
        }],
    },
    CommandSpec {
        name: "move",
        description: "Make a chess move in standard UCI notation (e.g., e2e4)",
        options: &[OptionSpec {
            name: "move",
            description: "The move in UCI notation (e.g., e2e4)",
            kind: OptionKind::String,
            required: true,
        }],
    },
    CommandSpec {
        name: "hello",
        description: "Say hello, world!",
        options: &[],
    },
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartChess { opponent: UserId },
    Move { notation: String },
    Hello,
}

/// Error when parsing slash command text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("commands start with '/'")]
    NotACommand,
    #[error("unknown command: /{0}")]
    Unknown(String),
    #[error("missing required option '{0}'")]
    MissingOption(&'static str),
    #[error("not a user mention: '{0}'")]
    BadUser(String),
}

impl Command {
    /// Parse text such as `/start_chess <@42>` or `/move e2e4`.
    pub fn parse(text: &str) -> Result<Self, CommandParseError> {
        let mut parts = text.split_whitespace();
        let name = parts
            .next()
            .and_then(|word| word.strip_prefix('/'))
            .ok_or(CommandParseError::NotACommand)?;

        match name {
            "start_chess" => {
                let mention = parts
                    .next()
                    .ok_or(CommandParseError::MissingOption("opponent"))?;
                Ok(Command::StartChess {
                    opponent: parse_mention(mention)?,
                })
            }
            "move" => {
                let notation = parts.next().ok_or(CommandParseError::MissingOption("move"))?;
                Ok(Command::Move {
                    notation: notation.to_string(),
                })
            }
            "hello" => Ok(Command::Hello),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// Accepts `<@42>`, `<@!42>` or a bare `42`.
fn parse_mention(text: &str) -> Result<UserId, CommandParseError> {
    let digits = text
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|inner| inner.trim_start_matches('!'))
        .unwrap_or(text);
    digits
        .parse()
        .map(UserId)
        .map_err(|_| CommandParseError::BadUser(text.to_string()))
}

/// A command invocation from a chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub user: UserId,
    pub command: Command,
}

/// Answers chess commands over a [`ChatPlatform`].
///
/// The board image goes to the channel as a separate message; the returned
/// string is the direct reply to the person who issued the command. A failure
/// to render or deliver never undoes a start or a move.
pub struct ChessBot<P> {
    platform: P,
    session: SharedSession,
    render_dir: PathBuf,
}

impl<P: ChatPlatform> ChessBot<P> {
    pub fn new(platform: P, session: SharedSession, render_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            session,
            render_dir: render_dir.into(),
        }
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[inline]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    #[inline]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Handle one command and return the reply text.
    pub fn handle(&mut self, event: &CommandEvent) -> String {
        match &event.command {
            Command::StartChess { opponent } => self.start_chess(event.user, *opponent),
            Command::Move { notation } => self.make_move(event.user, notation),
            Command::Hello => GREETING.to_string(),
        }
    }

    fn start_chess(&mut self, requester: UserId, opponent: UserId) -> String {
        let started = {
            let mut session = GameSession::lock(&self.session);
            if session.is_in_progress() {
                warn!("{requester} tried to start a game while one is running");
                return SessionError::Conflict.to_string();
            }

            let profile = match self.platform.user(opponent) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("failed to look up opponent {opponent}: {e}");
                    return format!("Could not look up that user: {e}");
                }
            };
            session.start_game(requester, &profile).map(Board::clone)
        };

        let board = match started {
            Ok(board) => board,
            Err(e) => return e.to_string(),
        };

        let players = Players {
            white: requester,
            black: opponent,
        };
        let content = format!(
            "New chess game started between {requester} (White) and {opponent} (Black)! \
             Use `/move e2e4` to move."
        );
        match self.publish_board(&board, players, 0, &content) {
            Ok(()) => "Game started!".to_string(),
            Err(reply) => reply,
        }
    }

    fn make_move(&mut self, user: UserId, notation: &str) -> String {
        let outcome = GameSession::lock(&self.session).submit_move(user, notation);
        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!("rejected move {notation:?} from {user}: {e}");
                return e.to_string();
            }
        };

        let mut content = format!("Move made: {notation}");
        if let Some(result) = report.result {
            content.push_str(&format!("\nGame over! Result: {result}"));
        }

        match self.publish_board(
            &report.board,
            report.players,
            report.fullmove_number(),
            &content,
        ) {
            Ok(()) => "Move processed!".to_string(),
            Err(reply) => reply,
        }
    }

    /// Render `board` and post it with `content`. Errors are reply text.
    fn publish_board(
        &mut self,
        board: &Board,
        players: Players,
        move_number: u32,
        content: &str,
    ) -> Result<(), String> {
        let white_name = self.display_name(players.white);
        let black_name = self.display_name(players.black);

        let artifact = RenderArtifact::create(
            &self.render_dir,
            board,
            &white_name,
            &black_name,
            move_number,
        )
        .map_err(|e| {
            error!("board render failed: {e}");
            format!("Error generating board image: {e}")
        })?;

        let message = OutgoingMessage {
            content,
            attachment: Some(Attachment {
                name: BOARD_ATTACHMENT_NAME,
                content_type: SVG_CONTENT_TYPE,
                path: artifact.path(),
            }),
        };
        self.platform.send_message(&message).map_err(|e| {
            error!("board delivery failed: {e}");
            "Error sending board image".to_string()
        })?;

        info!("posted board for {white_name} vs {black_name}, move {move_number}");
        Ok(())
    }

    /// Username if the platform knows it, otherwise the raw id.
    fn display_name(&mut self, user: UserId) -> String {
        self.platform
            .user(user)
            .map(|profile| profile.name)
            .unwrap_or_else(|_| user.0.to_string())
    }
}
