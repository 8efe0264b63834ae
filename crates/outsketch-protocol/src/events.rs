//! The client/server event contract.
//!
//! Everything here is already redacted for broadcast: a [`RoomSnapshot`]
//! collapses the guess map to per-player "has guessed" flags and never
//! carries the hidden word. The room layer builds these through pure
//! projection functions and hands them to the gateway; the raw room state
//! is never serialized outward.

use serde::{Deserialize, Serialize};

use crate::{Difficulty, Drawing, GameMode, Phase, PlayerId, RoomCode};

// ---------------------------------------------------------------------------
// Audience — who should receive an event?
// ---------------------------------------------------------------------------

/// Addressing for an outbound event within a room.
///
/// Event-shaping returns `(Audience, ServerEvent)` pairs; delivery is the
/// gateway's problem. `AllExcept`/`Player` pairs are how per-recipient
/// views are expressed (e.g. the drawer's phase event carrying the hidden
/// word while everyone else gets the redacted copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every connected player in the room.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Everyone except the specified player.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Snapshot views
// ---------------------------------------------------------------------------

/// A player as visible to every client in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub score: u32,
    pub is_connected: bool,
}

/// A guess entry with the text stripped.
///
/// Before REVEAL, other players may know *that* someone guessed but never
/// *what* — guess text only ever appears inside a [`GameResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessStatus {
    pub player_id: PlayerId,
    pub player_name: String,
    pub has_guessed: bool,
}

/// The full broadcast view of a room.
///
/// Safe for any recipient: no hidden word, no guess text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub players: Vec<PlayerView>,
    pub phase: Phase,
    pub mode: GameMode,
    pub round_number: u32,
    pub max_rounds: u32,
    pub drawer_id: Option<PlayerId>,
    /// The visible prompt for the current round (the context, in WORDWRAP).
    pub prompt: Option<String>,
    /// Latest drawing, shown as a live preview to guessers.
    pub current_drawing: Option<Drawing>,
    /// How many drawings the SEQUENCE round has accumulated so far.
    pub drawing_count: usize,
    pub guesses: Vec<GuessStatus>,
}

// ---------------------------------------------------------------------------
// Phase / timer / reveal payloads
// ---------------------------------------------------------------------------

/// Announces a phase transition, built from the same state it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePhaseEvent {
    pub phase: Phase,
    pub drawer_id: Option<PlayerId>,
    pub drawer_name: Option<String>,
    /// Present while drawing: the word/situation/context being played.
    pub prompt: Option<String>,
    /// WORDWRAP only, and only on the copy addressed to the drawer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_word: Option<String>,
    pub round_number: u32,
    pub max_rounds: u32,
    pub seconds_left: u64,
}

/// Who won the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// At least one human guessed right and the judge did not.
    #[serde(rename = "HUMANS")]
    Humans,
    /// The judge guessed right and no human did.
    #[serde(rename = "AI")]
    Ai,
    /// Anything else, including nobody getting it.
    #[serde(rename = "TIE")]
    Tie,
}

/// One player's guess as revealed at round end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanGuess {
    pub player_id: PlayerId,
    pub player_name: String,
    pub guess: String,
    pub correct: bool,
}

/// A scoreboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: u32,
}

/// Everything a round produced, shown during REVEAL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub outcome: RoundOutcome,
    pub prompt: String,
    pub ai_guess: Option<String>,
    pub ai_guesses: Vec<String>,
    pub human_guesses: Vec<HumanGuess>,
    pub correct_human_guesses: usize,
    pub ai_was_correct: bool,
    pub drawings: Vec<Drawing>,
}

// ---------------------------------------------------------------------------
// ServerEvent — everything the server pushes
// ---------------------------------------------------------------------------

/// An outbound event.
///
/// Internally tagged so clients can dispatch on a single `type` field:
/// `{ "type": "game:phase", "phase": "DRAWING", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Full redacted room state; sent after every mutation.
    #[serde(rename = "room:update")]
    RoomUpdate { room: RoomSnapshot },

    /// A phase transition.
    #[serde(rename = "game:phase")]
    GamePhase(GamePhaseEvent),

    /// Countdown tick during DRAWING and GUESSING.
    #[serde(rename = "timer")]
    Timer {
        seconds_left: u64,
        total_seconds: u64,
    },

    /// Round results, shown during REVEAL.
    #[serde(rename = "reveal")]
    Reveal {
        result: GameResult,
        next_drawer_id: Option<PlayerId>,
        game_ended: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        final_scores: Option<Vec<ScoreEntry>>,
    },

    /// Acknowledges a join/rejoin on the requesting connection only.
    #[serde(rename = "room:joined")]
    RoomJoined {
        room: RoomSnapshot,
        player_id: PlayerId,
    },

    /// A rejected operation, surfaced to the requester only.
    #[serde(rename = "error")]
    Error { message: String },
}

// ---------------------------------------------------------------------------
// ClientRequest — everything a client can ask for
// ---------------------------------------------------------------------------

/// An inbound request from a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Create a room and become its host.
    #[serde(rename = "room:create")]
    CreateRoom {
        player_name: String,
        #[serde(default)]
        mode: GameMode,
        #[serde(default)]
        max_rounds: Option<u32>,
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },

    /// Join an existing room by code.
    #[serde(rename = "room:join")]
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Resume a seat after a dropped connection.
    #[serde(rename = "room:rejoin")]
    Rejoin {
        room_code: RoomCode,
        player_id: PlayerId,
    },

    /// Host starts the next round.
    #[serde(rename = "round:start")]
    StartRound,

    /// Drawer submits a drawing (CLASSIC/SEQUENCE).
    #[serde(rename = "draw:submit")]
    SubmitDrawing {
        image: Drawing,
        #[serde(default)]
        sequence_complete: bool,
    },

    /// Drawer submits a description (WORDWRAP).
    #[serde(rename = "text:submit")]
    SubmitText { text: String },

    /// A guesser submits or revises their guess.
    #[serde(rename = "guess:submit")]
    SubmitGuess { guess: String },

    /// Leave the room for good (distinct from disconnecting).
    #[serde(rename = "room:leave")]
    Leave,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire contract is what browser clients parse — these tests pin
    //! the exact tag names and field shapes, because a drift here breaks
    //! clients silently.

    use super::*;

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            code: RoomCode("AB12".into()),
            players: vec![PlayerView {
                id: PlayerId(1),
                name: "ada".into(),
                is_host: true,
                score: 0,
                is_connected: true,
            }],
            phase: Phase::Lobby,
            mode: GameMode::Classic,
            round_number: 0,
            max_rounds: 5,
            drawer_id: None,
            prompt: None,
            current_drawing: None,
            drawing_count: 0,
            guesses: vec![],
        }
    }

    #[test]
    fn test_server_event_room_update_tag() {
        let event = ServerEvent::RoomUpdate { room: snapshot() };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "room:update");
        assert_eq!(json["room"]["code"], "AB12");
    }

    #[test]
    fn test_server_event_game_phase_flattens_payload() {
        let event = ServerEvent::GamePhase(GamePhaseEvent {
            phase: Phase::Drawing,
            drawer_id: Some(PlayerId(3)),
            drawer_name: Some("ada".into()),
            prompt: Some("cat".into()),
            hidden_word: None,
            round_number: 1,
            max_rounds: 5,
            seconds_left: 120,
        });
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "game:phase");
        assert_eq!(json["phase"], "DRAWING");
        assert_eq!(json["drawer_id"], 3);
        assert_eq!(json["seconds_left"], 120);
    }

    #[test]
    fn test_game_phase_omits_hidden_word_when_absent() {
        // The redacted copy must not even carry a null field a client
        // could mistake for "there is a hidden word".
        let event = ServerEvent::GamePhase(GamePhaseEvent {
            phase: Phase::Drawing,
            drawer_id: None,
            drawer_name: None,
            prompt: None,
            hidden_word: None,
            round_number: 1,
            max_rounds: 5,
            seconds_left: 0,
        });
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert!(json.get("hidden_word").is_none());
    }

    #[test]
    fn test_game_phase_includes_hidden_word_for_drawer_copy() {
        let event = ServerEvent::GamePhase(GamePhaseEvent {
            phase: Phase::Drawing,
            drawer_id: Some(PlayerId(1)),
            drawer_name: Some("ada".into()),
            prompt: Some("describe a bond".into()),
            hidden_word: Some("friendship".into()),
            round_number: 1,
            max_rounds: 5,
            seconds_left: 120,
        });
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["hidden_word"], "friendship");
    }

    #[test]
    fn test_round_outcome_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoundOutcome::Humans).unwrap(),
            "\"HUMANS\""
        );
        assert_eq!(
            serde_json::to_string(&RoundOutcome::Ai).unwrap(),
            "\"AI\""
        );
        assert_eq!(
            serde_json::to_string(&RoundOutcome::Tie).unwrap(),
            "\"TIE\""
        );
    }

    #[test]
    fn test_reveal_event_round_trip() {
        let event = ServerEvent::Reveal {
            result: GameResult {
                outcome: RoundOutcome::Humans,
                prompt: "cat".into(),
                ai_guess: Some("dog".into()),
                ai_guesses: vec!["dog".into(), "wolf".into()],
                human_guesses: vec![HumanGuess {
                    player_id: PlayerId(2),
                    player_name: "bo".into(),
                    guess: "cat".into(),
                    correct: true,
                }],
                correct_human_guesses: 1,
                ai_was_correct: false,
                drawings: vec![Drawing("data:...".into())],
            },
            next_drawer_id: Some(PlayerId(2)),
            game_ended: false,
            final_scores: None,
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let back: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_client_request_create_room_defaults() {
        // `mode`, `max_rounds` and `difficulty` are optional on the wire.
        let json = r#"{ "type": "room:create", "player_name": "ada" }"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::CreateRoom {
                player_name: "ada".into(),
                mode: GameMode::Classic,
                max_rounds: None,
                difficulty: None,
            }
        );
    }

    #[test]
    fn test_client_request_submit_drawing_complete_flag_defaults_false() {
        let json = r#"{ "type": "draw:submit", "image": "xyz" }"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::SubmitDrawing {
                image: Drawing("xyz".into()),
                sequence_complete: false,
            }
        );
    }

    #[test]
    fn test_client_request_unknown_type_is_an_error() {
        let json = r#"{ "type": "room:explode" }"#;
        let result: Result<ClientRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_guess_status_never_carries_text() {
        // Compile-time shape plus a serialization check: the only fields
        // are id, name, and the flag.
        let status = GuessStatus {
            player_id: PlayerId(4),
            player_name: "kim".into(),
            has_guessed: true,
        };
        let json: serde_json::Value = serde_json::to_value(&status).unwrap();
        let keys: Vec<&str> =
            json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["has_guessed", "player_id", "player_name"]);
    }
}
