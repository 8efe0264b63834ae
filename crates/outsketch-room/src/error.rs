//! The rejection taxonomy for room operations.

use outsketch_protocol::{GameMode, Phase, PlayerId, RoomCode};

/// Why an operation was refused.
///
/// Rejections are ordinary return values: no state was mutated, nothing
/// is retried, and the reason is surfaced only to the requesting
/// connection. A vanished or expired room always reads as
/// [`Rejection::RoomNotFound`] — the caller cannot tell (and must not
/// care) whether the room was swept a second ago or never existed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No live room under that code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The room has no free seats.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// Joining is only possible while the room is in the lobby.
    #[error("the game in room {0} has already started")]
    AlreadyStarted(RoomCode),

    /// Another player in the room already uses this name.
    #[error("the name {0:?} is already taken")]
    NameTaken(String),

    /// Only the host may perform this operation.
    #[error("only the host can do that")]
    NotHost,

    /// Too few connected players to start a round.
    #[error("at least {0} connected players are required")]
    NotEnoughPlayers(usize),

    /// The operation doesn't apply to the room's current phase.
    #[error("not allowed in phase {0}")]
    WrongPhase(Phase),

    /// The operation doesn't apply to the room's game mode.
    #[error("not available in {0:?} mode")]
    WrongMode(GameMode),

    /// Only the current drawer may submit round content.
    #[error("only the current drawer can do that")]
    NotDrawer,

    /// The drawer doesn't get to guess their own round.
    #[error("the drawer cannot guess")]
    DrawerCannotGuess,

    /// A judge verdict for this round is still in flight.
    #[error("the judge is still thinking")]
    JudgePending,

    /// The player id doesn't belong to this room.
    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),
}
