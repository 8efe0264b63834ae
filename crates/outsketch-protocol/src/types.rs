//! Identity and round-content types shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique, ephemeral identifier for a player.
///
/// Assigned by the server when a connection first binds to a room; it is
/// not an account and carries no identity beyond the current session.
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-relayable room code (4 uppercase alphanumeric chars).
///
/// Players type these on their phones, so the alphabet and length are part
/// of the contract. Codes are unique among rooms whose expiry has not
/// elapsed; the registry regenerates on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Length of every generated code.
    pub const LEN: usize = 4;

    /// The alphabet codes are drawn from.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Borrows the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Phase and mode
// ---------------------------------------------------------------------------

/// The round phase a room is in.
///
/// ```text
///   LOBBY ──(start_round)──→ DRAWING ──(submission + judge)──→ GUESSING
///     ↑                         │ (timeout: skip)                 │
///     │                         ↓                                 ↓
///     └────(reveal window)── REVEAL ←──(all guessed / timeout)────┘
/// ```
///
/// There is no terminal phase: a finished game lingers in REVEAL as the
/// final scoreboard, then re-enters LOBBY with the round counter reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    Drawing,
    Guessing,
    Reveal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "LOBBY"),
            Self::Drawing => write!(f, "DRAWING"),
            Self::Guessing => write!(f, "GUESSING"),
            Self::Reveal => write!(f, "REVEAL"),
        }
    }
}

/// What kind of content a room's rounds revolve around.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// One drawing of a single word.
    #[default]
    Classic,
    /// Up to five drawings telling a situation.
    Sequence,
    /// A text description of a hidden word, without naming it.
    Wordwrap,
}

/// Prompt difficulty bands offered by the content catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

// ---------------------------------------------------------------------------
// Round content
// ---------------------------------------------------------------------------

/// An encoded drawing as submitted by a client (base64 image data).
///
/// Opaque to the server — it is stored, forwarded to the judge, and echoed
/// back in reveal events, never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drawing(pub String);

/// Round content handed out by a prompt source, shaped per mode.
///
/// A tagged union rather than a bag of optional fields: each mode's content
/// is structurally complete, and the hidden word can only exist where
/// WORDWRAP semantics apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptPayload {
    /// A single word to draw.
    Classic {
        prompt: String,
        category: String,
        difficulty: Difficulty,
    },
    /// A situation to tell across a drawing sequence.
    Sequence { situation: String },
    /// A word to describe without naming it, plus the framing shown to
    /// the describer.
    Wordwrap {
        hidden_word: String,
        context: String,
    },
}

impl PromptPayload {
    /// The text every player sees during the round.
    ///
    /// For WORDWRAP this is the context, never the hidden word.
    pub fn visible_prompt(&self) -> &str {
        match self {
            Self::Classic { prompt, .. } => prompt,
            Self::Sequence { situation } => situation,
            Self::Wordwrap { context, .. } => context,
        }
    }

    /// The word kept secret from non-drawers, when the mode has one.
    pub fn hidden_word(&self) -> Option<&str> {
        match self {
            Self::Wordwrap { hidden_word, .. } => Some(hidden_word),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Judge answers
// ---------------------------------------------------------------------------

/// Ranked guesses from the automated judge, best first.
///
/// `confidence` parallels `guesses`; a judge that doesn't estimate
/// confidence may leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGuesses {
    pub guesses: Vec<String>,
    pub confidence: Vec<f32>,
}

impl RankedGuesses {
    /// Builds a ranked list without confidence estimates.
    pub fn from_guesses<I, S>(guesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            guesses: guesses.into_iter().map(Into::into).collect(),
            confidence: Vec::new(),
        }
    }

    /// The judge's best guess, if it produced any.
    pub fn top(&self) -> Option<&str> {
        self.guesses.first().map(String::as_str)
    }
}

/// The judge's reading of a drawing sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationGuess {
    /// Its best description of the situation.
    pub situation: String,
    /// Optional secondary interpretation.
    pub context: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
