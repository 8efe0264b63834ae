//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Each room runs in its own task, reached only through an mpsc channel.
//! The command loop is the room's exclusive region: client operations,
//! timer fires, and judge verdicts are all messages, handled one at a
//! time, so no reader ever sees a half-applied transition and rooms never
//! contend with each other.
//!
//! The judge call is the one piece of external I/O. It runs in a spawned
//! task and re-enters the loop as [`RoomCommand::JudgeResolved`] tagged
//! with the round it was launched for — a verdict that arrives after a
//! timeout has moved the room on is recognized as stale and discarded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};

use outsketch_content::PromptSource;
use outsketch_judge::{fallback, JudgeClient};
use outsketch_protocol::{
    Audience, Drawing, GameMode, Phase, PlayerId, RoomCode, RoomSnapshot,
    ServerEvent, SituationGuess,
};
use outsketch_timing::{PhaseTimer, TimerFire};

use crate::broadcast;
use crate::model::{alloc_player_id, normalize, Room};
use crate::round::score_round;
use crate::{Rejection, RoomConfig};

/// Channel on which a connection receives its room's events.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Reply channel for an operation that yields `T` or a rejection.
type Reply<T> = oneshot::Sender<Result<T, Rejection>>;

/// Successful join/rejoin: who you are and what the room looks like.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub player_id: PlayerId,
    pub room: RoomSnapshot,
}

/// Registry-facing room metadata (sweep, stats).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub player_count: usize,
    pub connected_players: usize,
    pub expires_at: Instant,
}

/// The judge's distilled answer, applied back under the room's region.
#[derive(Debug, Clone)]
pub(crate) struct JudgeVerdict {
    top: Option<String>,
    ranked: Vec<String>,
}

impl JudgeVerdict {
    fn from_ranked(ranked: outsketch_protocol::RankedGuesses) -> Self {
        Self {
            top: ranked.top().map(str::to_string),
            ranked: ranked.guesses,
        }
    }

    fn from_situation(guess: SituationGuess) -> Self {
        let mut ranked = vec![guess.situation.clone()];
        ranked.extend(guess.context);
        Self {
            top: Some(guess.situation),
            ranked,
        }
    }
}

/// What the judge was asked to look at.
enum JudgeInput {
    Image(Drawing),
    Text {
        text: String,
        hidden_word: Option<String>,
    },
    Sequence(Vec<Drawing>),
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        name: String,
        sender: EventSender,
        reply: Reply<JoinedRoom>,
    },
    Rejoin {
        player_id: PlayerId,
        sender: EventSender,
        reply: Reply<JoinedRoom>,
    },
    SetConnectivity {
        player_id: PlayerId,
        connected: bool,
        reply: Reply<()>,
    },
    Leave {
        player_id: PlayerId,
        reply: Reply<()>,
    },
    StartRound {
        player_id: PlayerId,
        reply: Reply<RoomSnapshot>,
    },
    SubmitDrawing {
        player_id: PlayerId,
        image: Drawing,
        sequence_complete: bool,
        reply: Reply<RoomSnapshot>,
    },
    SubmitText {
        player_id: PlayerId,
        text: String,
        reply: Reply<RoomSnapshot>,
    },
    SubmitGuess {
        player_id: PlayerId,
        guess: String,
        reply: Reply<RoomSnapshot>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    JudgeResolved {
        round: u32,
        verdict: JudgeVerdict,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone; the registry holds
/// one per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Sends a command and waits for its reply. A closed channel means
    /// the room vanished (swept or crashed) — reported as not found,
    /// which is the normal outcome callers must tolerate.
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, Rejection> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| Rejection::RoomNotFound(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| Rejection::RoomNotFound(self.code.clone()))?
    }

    pub async fn join(
        &self,
        name: String,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        self.request(|reply| RoomCommand::Join {
            name,
            sender,
            reply,
        })
        .await
    }

    pub async fn rejoin(
        &self,
        player_id: PlayerId,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        self.request(|reply| RoomCommand::Rejoin {
            player_id,
            sender,
            reply,
        })
        .await
    }

    pub async fn set_connectivity(
        &self,
        player_id: PlayerId,
        connected: bool,
    ) -> Result<(), Rejection> {
        self.request(|reply| RoomCommand::SetConnectivity {
            player_id,
            connected,
            reply,
        })
        .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), Rejection> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await
    }

    pub async fn start_round(
        &self,
        player_id: PlayerId,
    ) -> Result<RoomSnapshot, Rejection> {
        self.request(|reply| RoomCommand::StartRound { player_id, reply })
            .await
    }

    pub async fn submit_drawing(
        &self,
        player_id: PlayerId,
        image: Drawing,
        sequence_complete: bool,
    ) -> Result<RoomSnapshot, Rejection> {
        self.request(|reply| RoomCommand::SubmitDrawing {
            player_id,
            image,
            sequence_complete,
            reply,
        })
        .await
    }

    pub async fn submit_text(
        &self,
        player_id: PlayerId,
        text: String,
    ) -> Result<RoomSnapshot, Rejection> {
        self.request(|reply| RoomCommand::SubmitText {
            player_id,
            text,
            reply,
        })
        .await
    }

    pub async fn submit_guess(
        &self,
        player_id: PlayerId,
        guess: String,
    ) -> Result<RoomSnapshot, Rejection> {
        self.request(|reply| RoomCommand::SubmitGuess {
            player_id,
            guess,
            reply,
        })
        .await
    }

    /// Room metadata, or `None` if the actor is gone.
    pub async fn info(&self) -> Option<RoomInfo> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .ok()?;
        reply_rx.await.ok()
    }

    /// Tells the room to shut down. Best effort — a dead actor is
    /// already what we wanted.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(RoomCommand::Shutdown).await;
    }
}

/// Spawns a room actor seeded with its host and returns the handle plus
/// the host's join acknowledgement.
pub(crate) fn spawn_room<J, P>(
    room: Room,
    host_sender: EventSender,
    config: RoomConfig,
    judge: Arc<J>,
    prompts: Arc<P>,
) -> (RoomHandle, JoinedRoom)
where
    J: JudgeClient,
    P: PromptSource,
{
    let code = room.code.clone();
    let host_id = room.players[0].id;
    let joined = JoinedRoom {
        player_id: host_id,
        room: broadcast::room_snapshot(&room),
    };

    let (tx, rx) = mpsc::channel(config.command_buffer);
    let mut senders = HashMap::new();
    senders.insert(host_id, host_sender);

    let actor = RoomActor {
        room,
        config,
        timer: PhaseTimer::new(),
        senders,
        judge,
        prompts,
        self_tx: tx.clone(),
        receiver: rx,
        judge_pending: None,
    };
    tokio::spawn(actor.run());

    (RoomHandle { code, sender: tx }, joined)
}

// ---------------------------------------------------------------------------
// The actor itself
// ---------------------------------------------------------------------------

struct RoomActor<J, P> {
    room: Room,
    config: RoomConfig,
    timer: PhaseTimer,
    /// Per-player outbound channels; only connected players have one.
    senders: HashMap<PlayerId, EventSender>,
    judge: Arc<J>,
    prompts: Arc<P>,
    /// For the spawned judge task to send its verdict back in.
    self_tx: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Round number a judge verdict is outstanding for.
    judge_pending: Option<u32>,
}

impl<J, P> RoomActor<J, P>
where
    J: JudgeClient,
    P: PromptSource,
{
    async fn run(mut self) {
        tracing::info!(room = %self.room.code, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    None | Some(RoomCommand::Shutdown) => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                fire = self.timer.wait() => self.handle_timer(fire),
            }
        }

        tracing::info!(room = %self.room.code, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        // Info keeps answering after expiry — the sweep relies on it.
        let cmd = match cmd {
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
                return;
            }
            other => other,
        };

        // An expired-but-unswept room is already unreachable: every
        // operation reads as "room not found", exactly as if the sweep
        // had run.
        if self.room.is_expired(Instant::now()) {
            self.reject_expired(cmd);
            return;
        }

        match cmd {
            RoomCommand::Join {
                name,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_join(name, sender));
            }
            RoomCommand::Rejoin {
                player_id,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_rejoin(player_id, sender));
            }
            RoomCommand::SetConnectivity {
                player_id,
                connected,
                reply,
            } => {
                let _ = reply
                    .send(self.handle_set_connectivity(player_id, connected));
            }
            RoomCommand::Leave { player_id, reply } => {
                let _ = reply.send(self.handle_leave(player_id));
            }
            RoomCommand::StartRound { player_id, reply } => {
                let _ = reply.send(self.handle_start_round(player_id));
            }
            RoomCommand::SubmitDrawing {
                player_id,
                image,
                sequence_complete,
                reply,
            } => {
                let _ = reply.send(self.handle_submit_drawing(
                    player_id,
                    image,
                    sequence_complete,
                ));
            }
            RoomCommand::SubmitText {
                player_id,
                text,
                reply,
            } => {
                let _ = reply.send(self.handle_submit_text(player_id, text));
            }
            RoomCommand::SubmitGuess {
                player_id,
                guess,
                reply,
            } => {
                let _ = reply.send(self.handle_submit_guess(player_id, guess));
            }
            RoomCommand::JudgeResolved { round, verdict } => {
                self.handle_judge_resolved(round, verdict);
            }
            RoomCommand::Info { .. } | RoomCommand::Shutdown => {
                unreachable!("handled above")
            }
        }
    }

    /// Answers every pending reply with `RoomNotFound` once expired.
    fn reject_expired(&mut self, cmd: RoomCommand) {
        let not_found = Rejection::RoomNotFound(self.room.code.clone());
        match cmd {
            RoomCommand::Join { reply, .. }
            | RoomCommand::Rejoin { reply, .. } => {
                let _ = reply.send(Err(not_found));
            }
            RoomCommand::SetConnectivity { reply, .. }
            | RoomCommand::Leave { reply, .. } => {
                let _ = reply.send(Err(not_found));
            }
            RoomCommand::StartRound { reply, .. }
            | RoomCommand::SubmitDrawing { reply, .. }
            | RoomCommand::SubmitText { reply, .. }
            | RoomCommand::SubmitGuess { reply, .. } => {
                let _ = reply.send(Err(not_found));
            }
            RoomCommand::JudgeResolved { round, .. } => {
                tracing::debug!(
                    room = %self.room.code,
                    round,
                    "judge verdict for expired room discarded"
                );
            }
            RoomCommand::Info { .. } | RoomCommand::Shutdown => {}
        }
    }

    // -- Membership -------------------------------------------------------

    fn handle_join(
        &mut self,
        name: String,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        if self.room.players.len() >= self.config.max_players {
            return Err(Rejection::RoomFull(self.room.code.clone()));
        }
        if self.room.phase != Phase::Lobby {
            return Err(Rejection::AlreadyStarted(self.room.code.clone()));
        }
        if self.room.has_name(&name) {
            return Err(Rejection::NameTaken(name));
        }

        let player_id = alloc_player_id();
        self.room.add_player(player_id, name.clone());
        self.senders.insert(player_id, sender);
        self.room.refresh_expiry(self.config.room_ttl);

        tracing::info!(
            room = %self.room.code,
            %player_id,
            name,
            players = self.room.players.len(),
            "player joined"
        );

        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(JoinedRoom {
            player_id,
            room: broadcast::room_snapshot(&self.room),
        })
    }

    fn handle_rejoin(
        &mut self,
        player_id: PlayerId,
        sender: EventSender,
    ) -> Result<JoinedRoom, Rejection> {
        let Some(player) = self.room.player_mut(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };
        player.is_connected = true;
        self.senders.insert(player_id, sender);

        tracing::info!(room = %self.room.code, %player_id, "player rejoined");

        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(JoinedRoom {
            player_id,
            room: broadcast::room_snapshot(&self.room),
        })
    }

    fn handle_set_connectivity(
        &mut self,
        player_id: PlayerId,
        connected: bool,
    ) -> Result<(), Rejection> {
        let Some(player) = self.room.player_mut(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };
        player.is_connected = connected;
        if !connected {
            self.senders.remove(&player_id);
        }

        if self.room.phase == Phase::Guessing {
            self.room.prune_guesses();
            self.maybe_finish_guessing();
        }

        // Nobody left listening: reap the room quickly.
        if self.room.connected_count() == 0 {
            self.room.refresh_expiry(self.config.abandoned_ttl);
            tracing::info!(
                room = %self.room.code,
                "no connected players, expiry shortened"
            );
        }

        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), Rejection> {
        if !self.room.remove_player(player_id) {
            return Err(Rejection::UnknownPlayer(player_id));
        }
        self.senders.remove(&player_id);

        tracing::info!(
            room = %self.room.code,
            %player_id,
            players = self.room.players.len(),
            "player left"
        );

        if self.room.phase == Phase::Guessing {
            self.room.prune_guesses();
            self.maybe_finish_guessing();
        }

        if self.room.players.is_empty() {
            self.room.refresh_expiry(self.config.empty_ttl);
        }

        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(())
    }

    // -- Round lifecycle --------------------------------------------------

    fn handle_start_round(
        &mut self,
        player_id: PlayerId,
    ) -> Result<RoomSnapshot, Rejection> {
        let Some(player) = self.room.player(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };
        if !player.is_host {
            return Err(Rejection::NotHost);
        }
        if self.room.phase != Phase::Lobby {
            return Err(Rejection::WrongPhase(self.room.phase));
        }
        if self.room.connected_count() < self.config.min_players_to_start {
            return Err(Rejection::NotEnoughPlayers(
                self.config.min_players_to_start,
            ));
        }

        self.judge_pending = None;
        self.room.round_number += 1;
        self.room.drawer_id = self.room.next_drawer();
        self.room.prompt = Some(
            self.prompts
                .next_prompt(self.room.mode, self.room.difficulty),
        );
        if self.room.mode == GameMode::Sequence {
            self.room.drawings.clear();
        }
        self.room.current_drawing = None;
        self.room.guesses.clear();
        self.room.ai_guess = None;
        self.room.ai_guesses.clear();
        self.room.game_over = false;
        self.room.phase = Phase::Drawing;
        self.room.phase_started_at = Instant::now();
        self.timer.arm(self.config.drawing_phase, true);

        tracing::info!(
            room = %self.room.code,
            round = self.room.round_number,
            drawer = ?self.room.drawer_id,
            "round started"
        );

        self.dispatch(broadcast::phase_events(
            &self.room,
            self.timer.seconds_left(),
        ));
        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(broadcast::room_snapshot(&self.room))
    }

    fn handle_submit_drawing(
        &mut self,
        player_id: PlayerId,
        image: Drawing,
        sequence_complete: bool,
    ) -> Result<RoomSnapshot, Rejection> {
        if self.room.phase != Phase::Drawing {
            return Err(Rejection::WrongPhase(self.room.phase));
        }
        if self.judge_pending.is_some() {
            return Err(Rejection::JudgePending);
        }
        if self.room.drawer_id != Some(player_id) {
            return Err(Rejection::NotDrawer);
        }

        match self.room.mode {
            GameMode::Sequence => {
                self.room.drawings.push(image.clone());
                self.room.current_drawing = Some(image);
                let full = self.room.drawings.len()
                    >= self.config.max_sequence_drawings;
                if sequence_complete || full {
                    self.launch_judge(JudgeInput::Sequence(
                        self.room.drawings.clone(),
                    ));
                }
            }
            GameMode::Classic | GameMode::Wordwrap => {
                self.room.current_drawing = Some(image.clone());
                self.launch_judge(JudgeInput::Image(image));
            }
        }

        self.dispatch(vec![broadcast::room_update(&self.room)]);
        Ok(broadcast::room_snapshot(&self.room))
    }

    fn handle_submit_text(
        &mut self,
        player_id: PlayerId,
        text: String,
    ) -> Result<RoomSnapshot, Rejection> {
        if self.room.phase != Phase::Drawing {
            return Err(Rejection::WrongPhase(self.room.phase));
        }
        if self.judge_pending.is_some() {
            return Err(Rejection::JudgePending);
        }
        if self.room.drawer_id != Some(player_id) {
            return Err(Rejection::NotDrawer);
        }
        if self.room.mode != GameMode::Wordwrap {
            return Err(Rejection::WrongMode(self.room.mode));
        }

        let hidden_word = self
            .room
            .prompt
            .as_ref()
            .and_then(|p| p.hidden_word())
            .map(str::to_string);
        self.launch_judge(JudgeInput::Text { text, hidden_word });

        Ok(broadcast::room_snapshot(&self.room))
    }

    fn handle_submit_guess(
        &mut self,
        player_id: PlayerId,
        guess: String,
    ) -> Result<RoomSnapshot, Rejection> {
        if self.room.phase != Phase::Guessing {
            return Err(Rejection::WrongPhase(self.room.phase));
        }
        if self.room.drawer_id == Some(player_id) {
            return Err(Rejection::DrawerCannotGuess);
        }
        if self.room.player(player_id).is_none() {
            return Err(Rejection::UnknownPlayer(player_id));
        }

        self.room.guesses.insert(player_id, normalize(&guess));
        self.dispatch(vec![broadcast::room_update(&self.room)]);

        // Everyone who can guess has: the round ends now rather than
        // waiting out the clock.
        if self.room.guesses.len() >= self.room.connected_guesser_count() {
            self.finish_guessing();
        }

        Ok(broadcast::room_snapshot(&self.room))
    }

    // -- Judge ------------------------------------------------------------

    /// Launches the judge in its own task. The actor keeps serving
    /// commands; new submissions are rejected until the verdict lands.
    fn launch_judge(&mut self, input: JudgeInput) {
        let round = self.room.round_number;
        self.judge_pending = Some(round);

        let judge = Arc::clone(&self.judge);
        let tx = self.self_tx.clone();
        let code = self.room.code.clone();
        tokio::spawn(async move {
            let verdict = resolve_judge(judge.as_ref(), &code, input).await;
            // A dead actor means the room was swept mid-call; fine.
            let _ = tx
                .send(RoomCommand::JudgeResolved { round, verdict })
                .await;
        });
    }

    fn handle_judge_resolved(&mut self, round: u32, verdict: JudgeVerdict) {
        // Only a verdict for the round that is still drawing may apply;
        // anything else lost a race against a timeout or a new round.
        if self.judge_pending != Some(round)
            || self.room.round_number != round
            || self.room.phase != Phase::Drawing
        {
            tracing::debug!(
                room = %self.room.code,
                round,
                phase = %self.room.phase,
                "stale judge verdict discarded"
            );
            return;
        }

        self.judge_pending = None;
        self.room.ai_guess = verdict.top;
        self.room.ai_guesses = verdict.ranked;
        self.room.guesses.clear();
        self.room.phase = Phase::Guessing;
        self.room.phase_started_at = Instant::now();
        self.timer.arm(self.config.guessing_phase, true);

        tracing::info!(
            room = %self.room.code,
            round,
            ai_guess = ?self.room.ai_guess,
            "guessing phase opened"
        );

        self.dispatch(broadcast::phase_events(
            &self.room,
            self.timer.seconds_left(),
        ));
        self.dispatch(vec![broadcast::room_update(&self.room)]);
    }

    // -- Timers -----------------------------------------------------------

    fn handle_timer(&mut self, fire: TimerFire) {
        match fire {
            TimerFire::Tick {
                seconds_left,
                total_seconds,
            } => {
                if matches!(
                    self.room.phase,
                    Phase::Drawing | Phase::Guessing
                ) {
                    self.dispatch(vec![broadcast::timer_event(
                        seconds_left,
                        total_seconds,
                    )]);
                }
            }
            TimerFire::Expired { .. } => self.handle_deadline(),
        }
    }

    fn handle_deadline(&mut self) {
        match self.room.phase {
            Phase::Drawing => {
                // The drawer never delivered: skip the round entirely,
                // no judge, no scoring. An in-flight verdict is now stale.
                tracing::info!(
                    room = %self.room.code,
                    round = self.room.round_number,
                    "drawing phase timed out, round skipped"
                );
                self.judge_pending = None;
                self.prepare_next_round();
            }
            Phase::Guessing => self.finish_guessing(),
            Phase::Reveal => {
                if self.room.game_over {
                    // Scoreboard window over: fresh lobby, scores kept.
                    self.room.game_over = false;
                    self.room.round_number = 0;
                    self.to_lobby();
                } else {
                    self.prepare_next_round();
                }
            }
            // Nothing is armed in the lobby; a fire here is stale.
            Phase::Lobby => {}
        }
    }

    // -- Transitions ------------------------------------------------------

    /// Ends the GUESSING phase exactly once. Both triggers — the last
    /// guess and the timer — funnel here, and whichever runs second
    /// finds the phase already advanced and does nothing.
    fn finish_guessing(&mut self) {
        if self.room.phase != Phase::Guessing {
            return;
        }
        self.timer.cancel();

        let result = score_round(&mut self.room);
        self.room.phase = Phase::Reveal;
        self.room.phase_started_at = Instant::now();
        let reveal = broadcast::reveal_event(&self.room, result);
        self.timer.arm(self.config.reveal_window, false);

        self.dispatch(vec![reveal]);
        self.dispatch(broadcast::phase_events(
            &self.room,
            self.timer.seconds_left(),
        ));
        self.dispatch(vec![broadcast::room_update(&self.room)]);
    }

    /// The round-count check after a reveal window or a skipped round.
    fn prepare_next_round(&mut self) {
        if self.room.round_number >= self.room.max_rounds {
            // Game over: hold the final scoreboard, then reset.
            self.room.game_over = true;
            self.room.phase = Phase::Reveal;
            self.room.phase_started_at = Instant::now();
            self.timer.arm(self.config.scoreboard_window, false);

            tracing::info!(
                room = %self.room.code,
                rounds = self.room.round_number,
                "game over, showing final scoreboard"
            );

            self.dispatch(broadcast::phase_events(
                &self.room,
                self.timer.seconds_left(),
            ));
            self.dispatch(vec![broadcast::room_update(&self.room)]);
        } else {
            self.to_lobby();
        }
    }

    fn to_lobby(&mut self) {
        self.timer.cancel();
        self.room.phase = Phase::Lobby;
        self.room.phase_started_at = Instant::now();
        self.dispatch(broadcast::phase_events(&self.room, 0));
        self.dispatch(vec![broadcast::room_update(&self.room)]);
    }

    // -- Delivery ---------------------------------------------------------

    /// Delivers events to their audiences. Silently drops events for
    /// players whose channel is gone (disconnected).
    fn dispatch(&self, events: Vec<(Audience, ServerEvent)>) {
        for (audience, event) in events {
            match audience {
                Audience::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(event.clone());
                    }
                }
                Audience::Player(id) => {
                    if let Some(sender) = self.senders.get(&id) {
                        let _ = sender.send(event);
                    }
                }
                Audience::AllExcept(excluded) => {
                    for (id, sender) in &self.senders {
                        if *id != excluded {
                            let _ = sender.send(event.clone());
                        }
                    }
                }
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code.clone(),
            phase: self.room.phase,
            player_count: self.room.players.len(),
            connected_players: self.room.connected_count(),
            expires_at: self.room.expires_at,
        }
    }

    /// Completion re-check after a guesser drops out mid-GUESSING. Only
    /// fires when at least one guess was collected — an emptied room
    /// waits for the timer instead of scoring a null round early.
    fn maybe_finish_guessing(&mut self) {
        if self.room.phase == Phase::Guessing
            && !self.room.guesses.is_empty()
            && self.room.guesses.len() >= self.room.connected_guesser_count()
        {
            self.finish_guessing();
        }
    }
}

/// Runs the judge over its input, substituting the per-mode fallback on
/// failure so a broken backend can never stall a round.
async fn resolve_judge<J: JudgeClient>(
    judge: &J,
    code: &RoomCode,
    input: JudgeInput,
) -> JudgeVerdict {
    match input {
        JudgeInput::Image(image) => {
            match judge.guess_from_image(&image).await {
                Ok(ranked) => JudgeVerdict::from_ranked(ranked),
                Err(error) => {
                    tracing::warn!(
                        room = %code, %error,
                        "image judge failed, using fallback"
                    );
                    JudgeVerdict::from_ranked(fallback::image_guesses())
                }
            }
        }
        JudgeInput::Text { text, hidden_word } => {
            match judge.guess_from_text(&text, hidden_word.as_deref()).await
            {
                Ok(ranked) => JudgeVerdict::from_ranked(ranked),
                Err(error) => {
                    tracing::warn!(
                        room = %code, %error,
                        "text judge failed, using fallback"
                    );
                    JudgeVerdict::from_ranked(fallback::text_guesses())
                }
            }
        }
        JudgeInput::Sequence(images) => {
            match judge.guess_from_sequence(&images).await {
                Ok(guess) => JudgeVerdict::from_situation(guess),
                Err(error) => {
                    tracing::warn!(
                        room = %code, %error,
                        "sequence judge failed, using fallback"
                    );
                    JudgeVerdict::from_situation(fallback::sequence_guess())
                }
            }
        }
    }
}
