//! The shared data model: players and rooms.
//!
//! A [`Room`] is owned by exactly one actor task; nothing here is
//! synchronized because nothing here is ever shared. The methods enforce
//! the structural invariants (host uniqueness, join-order rotation,
//! guess-map hygiene) so the actor's handlers stay declarative.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use outsketch_protocol::{
    Difficulty, Drawing, GameMode, Phase, PlayerId, PromptPayload, RoomCode,
};

use crate::RoomConfig;

/// Counter for process-unique player ids.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh ephemeral player id.
pub(crate) fn alloc_player_id() -> PlayerId {
    PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Normalizes guess/target text for comparison: trimmed, lowercased.
pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// One seat in a room.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    /// Never decreases within a game.
    pub score: u32,
    pub is_connected: bool,
    pub joined_at: Instant,
}

/// One isolated game session.
///
/// `players` is kept in join order — the order is load-bearing: it drives
/// deterministic host transfer and drawer rotation.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub players: Vec<Player>,
    pub phase: Phase,
    pub mode: GameMode,
    pub difficulty: Option<Difficulty>,
    /// Content of the current round; `None` until the first round starts.
    pub prompt: Option<PromptPayload>,
    pub drawer_id: Option<PlayerId>,
    pub current_drawing: Option<Drawing>,
    /// Accumulated drawings in a SEQUENCE round.
    pub drawings: Vec<Drawing>,
    /// Player id → normalized guess text. Keys are always a subset of
    /// the connected non-drawer players.
    pub guesses: HashMap<PlayerId, String>,
    pub ai_guess: Option<String>,
    pub ai_guesses: Vec<String>,
    pub round_number: u32,
    pub max_rounds: u32,
    /// True only while the final scoreboard is on screen.
    pub game_over: bool,
    pub phase_started_at: Instant,
    pub expires_at: Instant,
    pub created_at: Instant,
}

impl Room {
    /// Creates a room in the lobby with its host already seated.
    pub(crate) fn new(
        code: RoomCode,
        host_id: PlayerId,
        host_name: String,
        mode: GameMode,
        max_rounds: u32,
        difficulty: Option<Difficulty>,
        config: &RoomConfig,
    ) -> Self {
        let now = Instant::now();
        let host = Player {
            id: host_id,
            name: host_name,
            is_host: true,
            score: 0,
            is_connected: true,
            joined_at: now,
        };
        Self {
            code,
            players: vec![host],
            phase: Phase::Lobby,
            mode,
            difficulty,
            prompt: None,
            drawer_id: None,
            current_drawing: None,
            drawings: Vec::new(),
            guesses: HashMap::new(),
            ai_guess: None,
            ai_guesses: Vec::new(),
            round_number: 0,
            max_rounds,
            game_over: false,
            phase_started_at: now,
            expires_at: now + config.room_ttl,
            created_at: now,
        }
    }

    // -- Lookup -----------------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    /// Connected players who are not the current drawer — the set whose
    /// guesses decide when a round completes.
    pub fn connected_guesser_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.is_connected && Some(p.id) != self.drawer_id)
            .count()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    pub(crate) fn refresh_expiry(&mut self, ttl: std::time::Duration) {
        self.expires_at = Instant::now() + ttl;
    }

    // -- Membership -------------------------------------------------------

    /// Appends a non-host player. Callers have already validated the
    /// seat count, phase, and name.
    pub(crate) fn add_player(&mut self, id: PlayerId, name: String) {
        self.players.push(Player {
            id,
            name,
            is_host: false,
            score: 0,
            is_connected: true,
            joined_at: Instant::now(),
        });
    }

    /// Removes a player, transferring the host role to the earliest
    /// remaining player if needed and clearing a dangling drawer.
    ///
    /// Returns `false` if the player wasn't in the room.
    pub(crate) fn remove_player(&mut self, id: PlayerId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.id == id)
        else {
            return false;
        };
        let removed = self.players.remove(index);

        if removed.is_host {
            if let Some(first) = self.players.first_mut() {
                first.is_host = true;
                tracing::info!(
                    room = %self.code,
                    new_host = %first.id,
                    "host transferred"
                );
            }
        }
        if self.drawer_id == Some(id) {
            self.drawer_id = None;
        }
        self.guesses.remove(&id);
        true
    }

    // -- Rotation ---------------------------------------------------------

    /// The next drawer: the first connected player after the current
    /// drawer in join order, wrapping. With no current drawer (first
    /// round, or the drawer left) the scan starts at the head.
    ///
    /// Recomputed over the currently connected set at every round start,
    /// so a player disconnecting between rounds is skipped without
    /// derailing the rotation for everyone else.
    pub fn next_drawer(&self) -> Option<PlayerId> {
        if self.players.is_empty() {
            return None;
        }
        let start = self
            .drawer_id
            .and_then(|id| self.players.iter().position(|p| p.id == id))
            .map_or(0, |i| i + 1);
        let n = self.players.len();
        (0..n)
            .map(|k| &self.players[(start + k) % n])
            .find(|p| p.is_connected)
            .map(|p| p.id)
    }

    // -- Round content ----------------------------------------------------

    /// The normalized word guesses are scored against: the hidden word in
    /// WORDWRAP, the visible prompt otherwise.
    pub fn target_word(&self) -> Option<String> {
        self.prompt.as_ref().map(|p| {
            normalize(p.hidden_word().unwrap_or(p.visible_prompt()))
        })
    }

    /// Drops guesses from players no longer allowed to hold one
    /// (disconnected or departed). Keeps the guess-map invariant after
    /// connectivity changes.
    pub(crate) fn prune_guesses(&mut self) {
        let allowed: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_connected && Some(p.id) != self.drawer_id)
            .map(|p| p.id)
            .collect();
        self.guesses.retain(|id, _| allowed.contains(id));
    }
}

// =========================================================================
// Tests
// =========================================================================
