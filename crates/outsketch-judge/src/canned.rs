//! A judge with scripted answers.
//!
//! Useful for local demos (the game is playable without any AI backend)
//! and for deterministic tests: you decide up front what the "AI" will
//! guess, then assert on the round outcome.

use outsketch_protocol::{Drawing, RankedGuesses, SituationGuess};

use crate::{JudgeClient, JudgeError};

/// A [`JudgeClient`] that always answers with preconfigured guesses.
#[derive(Debug, Clone)]
pub struct CannedJudge {
    image: RankedGuesses,
    text: RankedGuesses,
    sequence: SituationGuess,
    /// When true, `guess_from_text` with a hidden word answers the hidden
    /// word itself — the judge "always recognizes" descriptions.
    recognize_hidden: bool,
}

impl CannedJudge {
    /// A judge that guesses generic placeholders and never recognizes
    /// hidden words.
    pub fn new() -> Self {
        Self {
            image: RankedGuesses::from_guesses(["house", "box", "tree"]),
            text: RankedGuesses::from_guesses(["an idea"]),
            sequence: SituationGuess {
                situation: "doing something step by step".to_string(),
                context: None,
            },
            recognize_hidden: false,
        }
    }

    /// Scripts the answer for drawing analysis.
    pub fn with_image_guesses<I, S>(mut self, guesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image = RankedGuesses::from_guesses(guesses);
        self
    }

    /// Scripts the answer for description analysis (no hidden word).
    pub fn with_text_guesses<I, S>(mut self, guesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text = RankedGuesses::from_guesses(guesses);
        self
    }

    /// Scripts the answer for sequence analysis.
    pub fn with_sequence_guess(mut self, situation: impl Into<String>) -> Self {
        self.sequence = SituationGuess {
            situation: situation.into(),
            context: None,
        };
        self
    }

    /// Makes the judge recognize every hidden-word description.
    pub fn recognizing_hidden_words(mut self) -> Self {
        self.recognize_hidden = true;
        self
    }
}

impl Default for CannedJudge {
    fn default() -> Self {
        Self::new()
    }
}

impl JudgeClient for CannedJudge {
    async fn guess_from_image(
        &self,
        _image: &Drawing,
    ) -> Result<RankedGuesses, JudgeError> {
        Ok(self.image.clone())
    }

    async fn guess_from_text(
        &self,
        _description: &str,
        hidden_word: Option<&str>,
    ) -> Result<RankedGuesses, JudgeError> {
        match hidden_word {
            Some(word) if self.recognize_hidden => {
                Ok(RankedGuesses::from_guesses([word]))
            }
            _ => Ok(self.text.clone()),
        }
    }

    async fn guess_from_sequence(
        &self,
        _images: &[Drawing],
    ) -> Result<SituationGuess, JudgeError> {
        Ok(self.sequence.clone())
    }
}

// =========================================================================
// Tests
// =========================================================================
