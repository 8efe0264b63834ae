//! The automated judge seam for outsketch.
//!
//! The judge is the machine player: given a drawing, a description, or a
//! drawing sequence, it produces its best guesses. The round orchestrator
//! consumes it purely through the [`JudgeClient`] trait — a production
//! deployment points it at a vision/LLM backend, demos and tests use
//! [`CannedJudge`].
//!
//! Judge calls are the orchestrator's only external suspend point, and
//! they are allowed to fail: every method returns a [`JudgeError`], and
//! the caller substitutes the deterministic [`fallback`] values so a
//! flaky backend can never stall a round.

#![allow(async_fn_in_trait)]

mod canned;

pub use canned::CannedJudge;

use outsketch_protocol::{Drawing, RankedGuesses, SituationGuess};

/// Errors a judge backend can signal.
///
/// These never cross the orchestrator boundary as failures — they are
/// logged and replaced with [`fallback`] values.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// The backend could not be reached or timed out.
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something unusable.
    #[error("judge response malformed: {0}")]
    Malformed(String),
}

/// An automated guesser over round content.
pub trait JudgeClient: Send + Sync + 'static {
    /// Ranks guesses for a single drawing (CLASSIC rounds).
    fn guess_from_image(
        &self,
        image: &Drawing,
    ) -> impl std::future::Future<Output = Result<RankedGuesses, JudgeError>> + Send;

    /// Ranks guesses for a text description (WORDWRAP rounds).
    ///
    /// When `hidden_word` is given, the judge's job collapses to a
    /// match decision: its top guess should be the hidden word exactly
    /// when it recognizes the description.
    fn guess_from_text(
        &self,
        description: &str,
        hidden_word: Option<&str>,
    ) -> impl std::future::Future<Output = Result<RankedGuesses, JudgeError>> + Send;

    /// Describes the situation told by a drawing sequence (SEQUENCE rounds).
    fn guess_from_sequence(
        &self,
        images: &[Drawing],
    ) -> impl std::future::Future<Output = Result<SituationGuess, JudgeError>> + Send;
}

/// Deterministic substitutes applied when a judge call fails.
///
/// Neutral on purpose: they are visibly weak guesses, never accidental
/// matches, so a judge outage reads as "the AI guessed badly" rather
/// than corrupting a round.
pub mod fallback {
    use outsketch_protocol::{RankedGuesses, SituationGuess};

    /// Fallback for a failed image analysis.
    pub fn image_guesses() -> RankedGuesses {
        RankedGuesses::from_guesses(["drawing", "shape", "picture"])
    }

    /// Fallback for a failed description analysis.
    pub fn text_guesses() -> RankedGuesses {
        RankedGuesses::from_guesses(["something unclear"])
    }

    /// Fallback for a failed sequence analysis.
    pub fn sequence_guess() -> SituationGuess {
        SituationGuess {
            situation: "a sequence of events".to_string(),
            context: None,
        }
    }
}
