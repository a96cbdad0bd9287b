use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use shakmaty::Color;
use thiserror::Error;

use crate::board::{Board, BoardError, GameResult};
use crate::notation::{FormatError, Move, parse_move};

/// Platform-assigned identity of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

/// Renders as a chat mention, e.g. `<@42>`.
impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.0)
    }
}

/// What the platform knows about a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    /// Automated participant; may not be challenged.
    pub bot: bool,
}

/// The two participants of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Players {
    pub white: UserId,
    pub black: UserId,
}

impl Players {
    pub fn contains(&self, user: UserId) -> bool {
        self.white == user || self.black == user
    }

    pub fn for_color(&self, color: Color) -> UserId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// Why a start or move request was refused.
///
/// The messages are written for the person who sent the command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A game is already in progress. Finish it first or wait.")]
    Conflict,
    #[error("You cannot play against a bot in two-player mode.")]
    InvalidOpponent,
    #[error("No game in progress. Use `/start_chess @user` to begin.")]
    NoGame,
    #[error("You are not a player in the current chess game.")]
    NotAPlayer,
    #[error("It's not your turn.")]
    WrongTurn,
    #[error("Invalid move format. Use standard UCI (e.g., e2e4). Error: {0}")]
    Format(#[from] FormatError),
    #[error("Illegal move. Try again.")]
    IllegalMove(Move),
}

/// Outcome of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub mv: Move,
    pub players: Players,
    /// Board right after the move; the session may already be idle.
    pub board: Board,
    /// Set when this move ended the game.
    pub result: Option<GameResult>,
}

impl MoveReport {
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmove_number()
    }
}

/// The single in-progress game, if any.
#[derive(Debug, Default)]
pub struct GameSession {
    game: Option<(Board, Players)>,
}

/// Session shared by every command handler; the lock serialises requests.
pub type SharedSession = Arc<Mutex<GameSession>>;

impl GameSession {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh session for sharing between handlers.
    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Lock a shared session.
    ///
    /// Every mutation is validated before it is committed, so a panic while the
    /// lock was held cannot leave a half-applied move behind.
    pub fn lock(shared: &SharedSession) -> MutexGuard<'_, GameSession> {
        shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn is_in_progress(&self) -> bool {
        self.game.is_some()
    }

    pub fn board(&self) -> Option<&Board> {
        self.game.as_ref().map(|(board, _)| board)
    }

    pub fn players(&self) -> Option<Players> {
        self.game.as_ref().map(|(_, players)| *players)
    }

    /// Whose turn it is, if a game is running.
    pub fn player_to_move(&self) -> Option<UserId> {
        self.game
            .as_ref()
            .map(|(board, players)| players.for_color(board.turn()))
    }

    /// Begin a game with `requester` as white and `opponent` as black.
    pub fn start_game(
        &mut self,
        requester: UserId,
        opponent: &UserProfile,
    ) -> Result<&Board, SessionError> {
        if self.is_in_progress() {
            warn!("{requester} tried to start a game while one is running");
            return Err(SessionError::Conflict);
        }
        if opponent.bot {
            warn!("{requester} challenged bot {}", opponent.id);
            return Err(SessionError::InvalidOpponent);
        }

        let players = Players {
            white: requester,
            black: opponent.id,
        };
        info!("game started: {} (white) vs {} (black)", players.white, players.black);
        let (board, _) = self.game.insert((Board::new(), players));
        Ok(board)
    }

    /// Play `text` as a UCI move on behalf of `user`.
    ///
    /// The session returns to idle when the move ends the game.
    pub fn submit_move(&mut self, user: UserId, text: &str) -> Result<MoveReport, SessionError> {
        let Some((board, players)) = self.game.as_mut() else {
            return Err(SessionError::NoGame);
        };
        if !players.contains(user) {
            return Err(SessionError::NotAPlayer);
        }
        if players.for_color(board.turn()) != user {
            return Err(SessionError::WrongTurn);
        }

        let mv = parse_move(text)?;
        board.apply_move(mv).map_err(|e| match e {
            BoardError::IllegalMove(mv) => SessionError::IllegalMove(mv),
            // parse_move only yields on-board squares
            BoardError::OutOfRange(_) => SessionError::IllegalMove(mv),
        })?;

        let report = MoveReport {
            mv,
            players: *players,
            board: board.clone(),
            result: board.is_game_over().then(|| board.result()),
        };

        if let Some(result) = report.result {
            info!(
                "game over: {} vs {}, result {result}",
                players.white, players.black
            );
            self.game = None;
        }
        Ok(report)
    }
}
