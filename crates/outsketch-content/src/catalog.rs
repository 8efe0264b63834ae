//! The built-in prompt catalog.
//!
//! Word lists are grouped into categories with a difficulty band each,
//! mirroring how the game is pitched at mixed-age groups: easy concrete
//! nouns up to hard abstract concepts. SEQUENCE situations and WORDWRAP
//! hidden words live in their own lists because their shapes differ.

use rand::Rng;

use outsketch_protocol::{Difficulty, GameMode, PromptPayload};

use crate::PromptSource;

struct Category {
    name: &'static str,
    difficulty: Difficulty,
    words: &'static [&'static str],
}

const CATEGORIES: &[Category] = &[
    Category {
        name: "Animals & Nature",
        difficulty: Difficulty::Easy,
        words: &[
            "cat", "dog", "elephant", "butterfly", "tree", "flower", "sun",
            "moon", "river", "mountain", "forest", "ocean", "cloud", "star",
            "fish", "bird", "lion", "giraffe", "penguin", "dolphin", "bee",
        ],
    },
    Category {
        name: "Everyday Objects",
        difficulty: Difficulty::Easy,
        words: &[
            "chair", "umbrella", "bicycle", "clock", "ladder", "guitar",
            "kite", "candle", "scissors", "backpack", "telescope", "key",
        ],
    },
    Category {
        name: "Emotions & Feelings",
        difficulty: Difficulty::Medium,
        words: &[
            "happiness", "sadness", "fear", "surprise", "anger", "love",
            "friendship", "cooperation", "trust", "gratitude", "patience",
            "hope", "calm",
        ],
    },
    Category {
        name: "Science & Technology",
        difficulty: Difficulty::Medium,
        words: &[
            "energy", "electricity", "magnetism", "gravity", "atom",
            "microscope", "robot", "computer", "internet", "recycling",
            "experiment", "laboratory",
        ],
    },
    Category {
        name: "Art & Creativity",
        difficulty: Difficulty::Hard,
        words: &[
            "music", "dance", "painting", "sculpture", "theater", "poetry",
            "imagination", "inspiration", "harmony", "rhythm", "melody",
        ],
    },
    Category {
        name: "Values & Society",
        difficulty: Difficulty::Hard,
        words: &[
            "justice", "equality", "freedom", "peace", "solidarity",
            "responsibility", "honesty", "diversity", "community", "dialogue",
        ],
    },
];

const SITUATIONS: &[&str] = &[
    "making breakfast",
    "planting a tree",
    "making a new friend",
    "solving a problem",
    "cleaning up a park",
    "building a sandcastle",
    "losing and finding a pet",
];

const HIDDEN_WORDS: &[(&str, &str)] = &[
    (
        "friendship",
        "Describe a special bond between people without using the word itself",
    ),
    (
        "creativity",
        "Explain coming up with new ideas without naming the concept",
    ),
    (
        "respect",
        "Describe treating others well without using the word itself",
    ),
    (
        "learning",
        "Explain how we come to know new things without naming it",
    ),
    (
        "teamwork",
        "Describe achieving something together without using the word",
    ),
];

/// A [`PromptSource`] backed by the built-in lists above.
///
/// Stateless and cheap to share; selection is uniform within the chosen
/// category/list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    fn classic(
        &self,
        difficulty: Option<Difficulty>,
    ) -> PromptPayload {
        let mut rng = rand::rng();

        // Constrain to the requested band when it matches anything;
        // an unknown band falls back to the whole catalog.
        let banded: Vec<&Category> = match difficulty {
            Some(d) => {
                CATEGORIES.iter().filter(|c| c.difficulty == d).collect()
            }
            None => CATEGORIES.iter().collect(),
        };
        let pool: Vec<&Category> = if banded.is_empty() {
            CATEGORIES.iter().collect()
        } else {
            banded
        };

        let category = pool[rng.random_range(0..pool.len())];
        let word = category.words[rng.random_range(0..category.words.len())];
        PromptPayload::Classic {
            prompt: word.to_string(),
            category: category.name.to_string(),
            difficulty: category.difficulty,
        }
    }

    fn sequence(&self) -> PromptPayload {
        let mut rng = rand::rng();
        let situation = SITUATIONS[rng.random_range(0..SITUATIONS.len())];
        PromptPayload::Sequence {
            situation: situation.to_string(),
        }
    }

    fn wordwrap(&self) -> PromptPayload {
        let mut rng = rand::rng();
        let (word, context) =
            HIDDEN_WORDS[rng.random_range(0..HIDDEN_WORDS.len())];
        PromptPayload::Wordwrap {
            hidden_word: word.to_string(),
            context: context.to_string(),
        }
    }
}

impl PromptSource for StaticCatalog {
    fn next_prompt(
        &self,
        mode: GameMode,
        difficulty: Option<Difficulty>,
    ) -> PromptPayload {
        let payload = match mode {
            GameMode::Classic => self.classic(difficulty),
            GameMode::Sequence => self.sequence(),
            GameMode::Wordwrap => self.wordwrap(),
        };
        tracing::debug!(?mode, prompt = payload.visible_prompt(), "prompt drawn");
        payload
    }
}

// =========================================================================
// Tests
// =========================================================================
