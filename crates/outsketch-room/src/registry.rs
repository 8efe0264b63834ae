//! Room registry: creates, finds, routes to, and sweeps rooms.
//!
//! The registry is the entry point for every inbound operation. It holds
//! one [`RoomHandle`] per live room behind a short-lived lock — handles
//! are cloned out and the lock dropped *before* awaiting the actor, so
//! traffic to one room never blocks another.
//!
//! Rooms disappear in exactly one way: the periodic sweep shuts down
//! actors whose expiry has elapsed. Every routing path treats a missing
//! or unresponsive room as [`Rejection::RoomNotFound`]; "the room
//! vanished under me" is a normal outcome, not an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use tokio::sync::RwLock;

use outsketch_content::PromptSource;
use outsketch_judge::JudgeClient;
use outsketch_protocol::{
    Difficulty, Drawing, GameMode, PlayerId, RoomCode, RoomSnapshot,
};

use crate::actor::{spawn_room, EventSender, JoinedRoom, RoomHandle};
use crate::model::{alloc_player_id, Room};
use crate::{Rejection, RoomConfig};

/// Creation-time knobs a host can set.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub mode: GameMode,
    /// Rounds per game; the config default when unset.
    pub max_rounds: Option<u32>,
    /// Constrain CLASSIC prompts to a difficulty band.
    pub difficulty: Option<Difficulty>,
}

/// Aggregate numbers for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_rooms: usize,
    /// Rooms with at least one connected player.
    pub active_rooms: usize,
    pub connected_players: usize,
}

/// Owns the set of live rooms.
pub struct RoomRegistry<J, P> {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    judge: Arc<J>,
    prompts: Arc<P>,
    config: RoomConfig,
}

impl<J, P> RoomRegistry<J, P>
where
    J: JudgeClient,
    P: PromptSource,
{
    pub fn new(judge: J, prompts: P, config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            judge: Arc::new(judge),
            prompts: Arc::new(prompts),
            config,
        }
    }

    /// Creates a room with `host_name` seated as host and returns their
    /// join acknowledgement. Always succeeds: the code generator retries
    /// until it finds a free code.
    pub async fn create_room(
        &self,
        host_name: String,
        sender: EventSender,
        options: CreateOptions,
    ) -> JoinedRoom {
        let mut rooms = self.rooms.write().await;

        let code = generate_code(&rooms);
        let room = Room::new(
            code.clone(),
            alloc_player_id(),
            host_name,
            options.mode,
            options
                .max_rounds
                .unwrap_or(self.config.default_max_rounds),
            options.difficulty,
            &self.config,
        );
        let (handle, joined) = spawn_room(
            room,
            sender,
            self.config.clone(),
            Arc::clone(&self.judge),
            Arc::clone(&self.prompts),
        );
        rooms.insert(code.clone(), handle);

        tracing::info!(room = %code, mode = ?options.mode, "room created");
        joined
    }

    /// Clones out the handle for `code`, holding the map lock only for
    /// the lookup.
    async fn handle(&self, code: &RoomCode) -> Result<RoomHandle, Rejection> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| Rejection::RoomNotFound(code.clone()))
    }

    pub async fn join_room(
        &self,
        code: &RoomCode,
        name: String,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        self.handle(code).await?.join(name, sender).await
    }

    pub async fn rejoin(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        self.handle(code).await?.rejoin(player_id, sender).await
    }

    /// Flips a player's connectivity. Disconnecting everyone shortens
    /// the room's expiry so abandoned rooms are reaped quickly.
    pub async fn set_connectivity(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        connected: bool,
    ) -> Result<(), Rejection> {
        self.handle(code)
            .await?
            .set_connectivity(player_id, connected)
            .await
    }

    pub async fn remove_player(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<(), Rejection> {
        self.handle(code).await?.leave(player_id).await
    }

    pub async fn start_round(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<RoomSnapshot, Rejection> {
        self.handle(code).await?.start_round(player_id).await
    }

    pub async fn submit_drawing(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        image: Drawing,
        sequence_complete: bool,
    ) -> Result<RoomSnapshot, Rejection> {
        self.handle(code)
            .await?
            .submit_drawing(player_id, image, sequence_complete)
            .await
    }

    pub async fn submit_text(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        text: String,
    ) -> Result<RoomSnapshot, Rejection> {
        self.handle(code).await?.submit_text(player_id, text).await
    }

    pub async fn submit_guess(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        guess: String,
    ) -> Result<RoomSnapshot, Rejection> {
        self.handle(code).await?.submit_guess(player_id, guess).await
    }

    /// Shuts down and removes every room whose expiry has elapsed (or
    /// whose actor died). Returns how many rooms were reaped. Runs from
    /// a fixed-interval task; their timers die with the actors.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let handles: Vec<(RoomCode, RoomHandle)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(code, handle)| (code.clone(), handle.clone()))
            .collect();

        let mut dead = Vec::new();
        for (code, handle) in handles {
            match handle.info().await {
                Some(info) if info.expires_at > now => {}
                _ => dead.push(code),
            }
        }

        if dead.is_empty() {
            return 0;
        }

        let mut rooms = self.rooms.write().await;
        let mut swept = 0;
        for code in dead {
            if let Some(handle) = rooms.remove(&code) {
                handle.shutdown().await;
                tracing::info!(room = %code, "expired room swept");
                swept += 1;
            }
        }
        swept
    }

    pub async fn stats(&self) -> RegistryStats {
        let handles: Vec<RoomHandle> =
            self.rooms.read().await.values().cloned().collect();

        let mut stats = RegistryStats {
            total_rooms: handles.len(),
            active_rooms: 0,
            connected_players: 0,
        };
        for handle in handles {
            if let Some(info) = handle.info().await {
                if info.connected_players > 0 {
                    stats.active_rooms += 1;
                }
                stats.connected_players += info.connected_players;
            }
        }
        stats
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Generates a code not used by any live room. Collisions regenerate;
/// with a 36^4 space and short-lived rooms the loop terminates fast.
fn generate_code(rooms: &HashMap<RoomCode, RoomHandle>) -> RoomCode {
    let mut rng = rand::rng();
    loop {
        let code: String = (0..RoomCode::LEN)
            .map(|_| {
                let i = rng.random_range(0..RoomCode::ALPHABET.len());
                RoomCode::ALPHABET[i] as char
            })
            .collect();
        let code = RoomCode(code);
        if !rooms.contains_key(&code) {
            return code;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
