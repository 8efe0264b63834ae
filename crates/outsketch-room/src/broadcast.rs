//! Event shaping: projecting room state into broadcastable events.
//!
//! These are pure functions from `&Room` to `(Audience, ServerEvent)`
//! pairs. The authoritative guess map and the hidden word never leave
//! this module un-redacted: snapshots collapse guesses to flags, and the
//! hidden word rides only on the copy addressed to the drawer. The actor
//! builds events *before* mutating further, so every broadcast describes
//! exactly the state it announces.

use outsketch_protocol::{
    Audience, GamePhaseEvent, GameResult, GuessStatus, Phase, PlayerView,
    RoomSnapshot, ScoreEntry, ServerEvent,
};

use crate::model::Room;

/// The full redacted view of a room, safe for any recipient.
pub(crate) fn room_snapshot(room: &Room) -> RoomSnapshot {
    RoomSnapshot {
        code: room.code.clone(),
        players: room
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id,
                name: p.name.clone(),
                is_host: p.is_host,
                score: p.score,
                is_connected: p.is_connected,
            })
            .collect(),
        phase: room.phase,
        mode: room.mode,
        round_number: room.round_number,
        max_rounds: room.max_rounds,
        drawer_id: room.drawer_id,
        prompt: room
            .prompt
            .as_ref()
            .map(|p| p.visible_prompt().to_string()),
        current_drawing: room.current_drawing.clone(),
        drawing_count: room.drawings.len(),
        guesses: room
            .players
            .iter()
            .filter(|p| room.guesses.contains_key(&p.id))
            .map(|p| GuessStatus {
                player_id: p.id,
                player_name: p.name.clone(),
                has_guessed: true,
            })
            .collect(),
    }
}

/// `room:update` for everyone.
pub(crate) fn room_update(room: &Room) -> (Audience, ServerEvent) {
    (
        Audience::All,
        ServerEvent::RoomUpdate {
            room: room_snapshot(room),
        },
    )
}

/// `game:phase` for a transition, split per recipient when the drawer's
/// copy must carry the hidden word.
pub(crate) fn phase_events(
    room: &Room,
    seconds_left: u64,
) -> Vec<(Audience, ServerEvent)> {
    let drawer = room.drawer_id.and_then(|id| room.player(id));
    let base = GamePhaseEvent {
        phase: room.phase,
        drawer_id: room.drawer_id,
        drawer_name: drawer.map(|p| p.name.clone()),
        prompt: (room.phase == Phase::Drawing)
            .then(|| {
                room.prompt.as_ref().map(|p| p.visible_prompt().to_string())
            })
            .flatten(),
        hidden_word: None,
        round_number: room.round_number,
        max_rounds: room.max_rounds,
        seconds_left,
    };

    let hidden = (room.phase == Phase::Drawing)
        .then(|| room.prompt.as_ref().and_then(|p| p.hidden_word()))
        .flatten();

    match (hidden, room.drawer_id) {
        (Some(word), Some(drawer_id)) => vec![
            (
                Audience::AllExcept(drawer_id),
                ServerEvent::GamePhase(base.clone()),
            ),
            (
                Audience::Player(drawer_id),
                ServerEvent::GamePhase(GamePhaseEvent {
                    hidden_word: Some(word.to_string()),
                    ..base
                }),
            ),
        ],
        _ => vec![(Audience::All, ServerEvent::GamePhase(base))],
    }
}

/// A countdown tick for everyone.
pub(crate) fn timer_event(
    seconds_left: u64,
    total_seconds: u64,
) -> (Audience, ServerEvent) {
    (
        Audience::All,
        ServerEvent::Timer {
            seconds_left,
            total_seconds,
        },
    )
}

/// The `reveal` broadcast for a scored round.
pub(crate) fn reveal_event(
    room: &Room,
    result: GameResult,
) -> (Audience, ServerEvent) {
    let game_ended = room.round_number >= room.max_rounds;
    let final_scores = game_ended.then(|| {
        let mut scores: Vec<ScoreEntry> = room
            .players
            .iter()
            .map(|p| ScoreEntry {
                player_id: p.id,
                player_name: p.name.clone(),
                score: p.score,
            })
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    });

    (
        Audience::All,
        ServerEvent::Reveal {
            result,
            next_drawer_id: if game_ended {
                None
            } else {
                room.next_drawer()
            },
            game_ended,
            final_scores,
        },
    )
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use outsketch_protocol::{
        GameMode, PlayerId, PromptPayload, RoomCode, RoundOutcome,
    };
    use crate::RoomConfig;

    fn wordwrap_room() -> Room {
        let mut room = Room::new(
            RoomCode("WRAP".into()),
            PlayerId(1),
            "ada".into(),
            GameMode::Wordwrap,
            5,
            None,
            &RoomConfig::default(),
        );
        room.add_player(PlayerId(2), "bo".into());
        room.drawer_id = Some(PlayerId(1));
        room.phase = Phase::Drawing;
        room.round_number = 1;
        room.prompt = Some(PromptPayload::Wordwrap {
            hidden_word: "friendship".into(),
            context: "describe a bond".into(),
        });
        room
    }

    #[test]
    fn test_snapshot_never_contains_the_hidden_word() {
        let room = wordwrap_room();
        let snapshot = room_snapshot(&room);

        assert_eq!(snapshot.prompt.as_deref(), Some("describe a bond"));
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(
            !json.contains("friendship"),
            "snapshot leaked the hidden word: {json}"
        );
    }

    #[test]
    fn test_snapshot_collapses_guesses_to_flags() {
        let mut room = wordwrap_room();
        room.phase = Phase::Guessing;
        room.guesses.insert(PlayerId(2), "friendship".into());

        let snapshot = room_snapshot(&room);
        assert_eq!(snapshot.guesses.len(), 1);
        assert_eq!(snapshot.guesses[0].player_id, PlayerId(2));
        assert!(snapshot.guesses[0].has_guessed);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(
            !json.contains("friendship"),
            "snapshot leaked guess text: {json}"
        );
    }

    #[test]
    fn test_phase_events_split_hidden_word_to_drawer_only() {
        let room = wordwrap_room();
        let events = phase_events(&room, 120);
        assert_eq!(events.len(), 2);

        let (audience, redacted) = &events[0];
        assert_eq!(*audience, Audience::AllExcept(PlayerId(1)));
        match redacted {
            ServerEvent::GamePhase(e) => assert_eq!(e.hidden_word, None),
            other => panic!("expected GamePhase, got {other:?}"),
        }

        let (audience, full) = &events[1];
        assert_eq!(*audience, Audience::Player(PlayerId(1)));
        match full {
            ServerEvent::GamePhase(e) => {
                assert_eq!(e.hidden_word.as_deref(), Some("friendship"));
            }
            other => panic!("expected GamePhase, got {other:?}"),
        }
    }

    #[test]
    fn test_phase_events_single_broadcast_without_hidden_word() {
        let mut room = wordwrap_room();
        room.mode = GameMode::Classic;
        room.prompt = Some(PromptPayload::Classic {
            prompt: "cat".into(),
            category: "animals".into(),
            difficulty: outsketch_protocol::Difficulty::Easy,
        });

        let events = phase_events(&room, 120);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Audience::All);
    }

    #[test]
    fn test_phase_events_omit_prompt_outside_drawing() {
        let mut room = wordwrap_room();
        room.phase = Phase::Guessing;

        let events = phase_events(&room, 60);
        assert_eq!(events.len(), 1, "no drawer split outside DRAWING");
        match &events[0].1 {
            ServerEvent::GamePhase(e) => {
                assert_eq!(e.prompt, None);
                assert_eq!(e.hidden_word, None);
            }
            other => panic!("expected GamePhase, got {other:?}"),
        }
    }

    #[test]
    fn test_reveal_event_previews_next_drawer_mid_game() {
        let room = wordwrap_room();
        let result = GameResult {
            outcome: RoundOutcome::Tie,
            prompt: "describe a bond".into(),
            ai_guess: None,
            ai_guesses: vec![],
            human_guesses: vec![],
            correct_human_guesses: 0,
            ai_was_correct: false,
            drawings: vec![],
        };

        let (_, event) = reveal_event(&room, result);
        match event {
            ServerEvent::Reveal {
                next_drawer_id,
                game_ended,
                final_scores,
                ..
            } => {
                assert_eq!(next_drawer_id, Some(PlayerId(2)));
                assert!(!game_ended);
                assert!(final_scores.is_none());
            }
            other => panic!("expected Reveal, got {other:?}"),
        }
    }

    #[test]
    fn test_reveal_event_final_round_carries_sorted_scoreboard() {
        let mut room = wordwrap_room();
        room.round_number = room.max_rounds;
        room.player_mut(PlayerId(2)).unwrap().score = 30;

        let result = GameResult {
            outcome: RoundOutcome::Humans,
            prompt: "x".into(),
            ai_guess: None,
            ai_guesses: vec![],
            human_guesses: vec![],
            correct_human_guesses: 1,
            ai_was_correct: false,
            drawings: vec![],
        };

        let (_, event) = reveal_event(&room, result);
        match event {
            ServerEvent::Reveal {
                game_ended,
                final_scores,
                next_drawer_id,
                ..
            } => {
                assert!(game_ended);
                assert_eq!(next_drawer_id, None);
                let scores = final_scores.unwrap();
                assert_eq!(scores[0].player_id, PlayerId(2));
                assert_eq!(scores[0].score, 30);
            }
            other => panic!("expected Reveal, got {other:?}"),
        }
    }
}
