//! Wire protocol for outsketch.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`RoomCode`], [`Phase`], [`GameMode`], [`PromptPayload`],
//!   etc.) — the identities and round-content shapes shared by every layer.
//! - **Events** ([`ClientRequest`], [`ServerEvent`], [`RoomSnapshot`],
//!   [`GameResult`]) — what travels over a connection, already redacted:
//!   nothing in this module can leak a hidden word or another player's
//!   guess text.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//!
//! The protocol layer sits below the room layer and knows nothing about
//! rooms, timers, or the judge — it only defines shapes.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    Audience, ClientRequest, GamePhaseEvent, GameResult, GuessStatus,
    HumanGuess, PlayerView, RoomSnapshot, RoundOutcome, ScoreEntry,
    ServerEvent,
};
pub use types::{
    Difficulty, Drawing, GameMode, Phase, PlayerId, PromptPayload,
    RankedGuesses, RoomCode, SituationGuess,
};
