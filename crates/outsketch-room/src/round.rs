//! Round scoring: turning a finished GUESSING phase into a
//! [`GameResult`] and applying the score deltas.
//!
//! Pure with respect to everything but the room it's handed — no timers,
//! no channels, no clock. The actor calls [`score_round`] exactly once
//! per round, inside its exclusive region.

use outsketch_protocol::{GameMode, GameResult, HumanGuess, RoundOutcome};

use crate::model::{normalize, Room};

/// Points for a correct human guess.
const GUESSER_POINTS: u32 = 10;

/// Bonus for the drawer when the humans beat the judge.
const DRAWER_BONUS: u32 = 5;

/// The humans-vs-judge outcome matrix.
///
/// Humans win only when at least one of them got it and the judge did
/// not; the judge wins only the mirror case. Everything else — both
/// right, both wrong — is a tie.
pub(crate) fn round_outcome(
    correct_human_guesses: usize,
    ai_was_correct: bool,
) -> RoundOutcome {
    match (correct_human_guesses > 0, ai_was_correct) {
        (true, false) => RoundOutcome::Humans,
        (false, true) => RoundOutcome::Ai,
        _ => RoundOutcome::Tie,
    }
}

/// Scores the current round and applies the deltas to player scores.
///
/// Guesses are compared exactly against the normalized target (the
/// hidden word in WORDWRAP, the prompt otherwise). Results list guessers
/// in join order so the reveal is deterministic.
pub(crate) fn score_round(room: &mut Room) -> GameResult {
    let target = room.target_word();

    let human_guesses: Vec<HumanGuess> = room
        .players
        .iter()
        .filter_map(|player| {
            room.guesses.get(&player.id).map(|guess| HumanGuess {
                player_id: player.id,
                player_name: player.name.clone(),
                guess: guess.clone(),
                correct: target.as_deref() == Some(guess.as_str()),
            })
        })
        .collect();

    let correct_human_guesses =
        human_guesses.iter().filter(|g| g.correct).count();
    let ai_was_correct = match (&room.ai_guess, &target) {
        (Some(guess), Some(target)) => normalize(guess) == *target,
        _ => false,
    };
    let outcome = round_outcome(correct_human_guesses, ai_was_correct);

    for entry in human_guesses.iter().filter(|g| g.correct) {
        if let Some(player) = room.player_mut(entry.player_id) {
            player.score += GUESSER_POINTS;
        }
    }
    if outcome == RoundOutcome::Humans {
        if let Some(drawer) =
            room.drawer_id.and_then(|id| room.player_mut(id))
        {
            drawer.score += DRAWER_BONUS;
        }
    }

    let drawings = match room.mode {
        GameMode::Sequence => room.drawings.clone(),
        _ => room.current_drawing.clone().into_iter().collect(),
    };

    tracing::info!(
        room = %room.code,
        round = room.round_number,
        ?outcome,
        correct_human_guesses,
        ai_was_correct,
        "round scored"
    );

    GameResult {
        outcome,
        prompt: room
            .prompt
            .as_ref()
            .map(|p| p.visible_prompt().to_string())
            .unwrap_or_default(),
        ai_guess: room.ai_guess.clone(),
        ai_guesses: room.ai_guesses.clone(),
        human_guesses,
        correct_human_guesses,
        ai_was_correct,
        drawings,
    }
}

// =========================================================================
// Tests
// =========================================================================
