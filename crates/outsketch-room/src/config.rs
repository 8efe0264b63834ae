//! Room limits and phase durations.

use std::time::Duration;

/// Configuration shared by every room a registry creates.
///
/// The defaults are the production game; tests shrink the durations to
/// milliseconds so phase timeouts can be exercised without waiting out
/// real rounds.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Maximum players in a room.
    pub max_players: usize,

    /// Connected players required before a round can start.
    pub min_players_to_start: usize,

    /// Rounds per game unless the creator overrides it.
    pub default_max_rounds: u32,

    /// Cap on accumulated drawings in a SEQUENCE round.
    pub max_sequence_drawings: usize,

    /// Time the drawer has to submit.
    pub drawing_phase: Duration,

    /// Time guessers have once the judge has answered.
    pub guessing_phase: Duration,

    /// How long round results stay on screen.
    pub reveal_window: Duration,

    /// How long the final scoreboard stays up before the room returns
    /// to the lobby.
    pub scoreboard_window: Duration,

    /// Room lifetime, refreshed on every join.
    pub room_ttl: Duration,

    /// Shortened lifetime once no player is connected.
    pub abandoned_ttl: Duration,

    /// Shortened lifetime once the room is empty.
    pub empty_ttl: Duration,

    /// Command channel capacity per room actor.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            min_players_to_start: 2,
            default_max_rounds: 5,
            max_sequence_drawings: 5,
            drawing_phase: Duration::from_secs(120),
            guessing_phase: Duration::from_secs(60),
            reveal_window: Duration::from_secs(5),
            scoreboard_window: Duration::from_secs(10),
            room_ttl: Duration::from_secs(30 * 60),
            abandoned_ttl: Duration::from_secs(5 * 60),
            empty_ttl: Duration::from_secs(60),
            command_buffer: 64,
        }
    }
}
