//! Per-room phase timer for outsketch.
//!
//! Each room owns exactly one [`PhaseTimer`]: a single logical deadline
//! (the current phase's time limit) plus an optional 1 Hz countdown used
//! for client-facing timer events. Re-arming replaces the previous
//! deadline and bumps a generation counter, so only one logical timer ever
//! holds the right to force a transition — a deadline armed for a phase
//! the room has since left can never fire.
//!
//! # Integration
//!
//! The timer is designed to sit inside a room actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         fire = timer.wait() => match fire {
//!             TimerFire::Tick { seconds_left, .. } => { /* broadcast */ }
//!             TimerFire::Expired { .. } => { /* force the transition */ }
//!         }
//!     }
//! }
//! ```
//!
//! When unarmed, [`PhaseTimer::wait`] pends forever — `select!` keeps
//! serving the other branches.

use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace};

/// Cadence of countdown ticks while a ticking deadline is armed.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What [`PhaseTimer::wait`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFire {
    /// A countdown tick. Carries no transition authority — purely for
    /// client display.
    Tick {
        /// Whole seconds until the deadline, rounded to nearest.
        seconds_left: u64,
        /// The full length of the armed phase, in whole seconds.
        total_seconds: u64,
    },
    /// The armed deadline elapsed. The timer disarms itself before
    /// returning, so a second `wait` will pend until re-armed.
    Expired {
        /// Generation of the deadline that fired; lets callers discard
        /// anything queued for an earlier arming.
        generation: u64,
    },
}

/// A single-deadline timer with cancel-on-rearm semantics.
///
/// One per room, owned by the room's actor task. Not `Clone` on purpose:
/// two owners of the same deadline is exactly the bug this type exists
/// to prevent.
#[derive(Debug)]
pub struct PhaseTimer {
    deadline: Option<TokioInstant>,
    next_tick: Option<TokioInstant>,
    total: Duration,
    generation: u64,
}

impl PhaseTimer {
    /// Creates an unarmed timer.
    pub fn new() -> Self {
        Self {
            deadline: None,
            next_tick: None,
            total: Duration::ZERO,
            generation: 0,
        }
    }

    /// Arms (or re-arms) the deadline `total` from now.
    ///
    /// Any previously armed deadline is replaced. `ticking` controls
    /// whether 1 Hz [`TimerFire::Tick`]s are produced on the way down —
    /// the reveal windows don't need them, the play phases do.
    ///
    /// Returns the new generation.
    pub fn arm(&mut self, total: Duration, ticking: bool) -> u64 {
        let now = TokioInstant::now();
        self.generation += 1;
        self.deadline = Some(now + total);
        self.next_tick = ticking.then(|| now + TICK_INTERVAL);
        self.total = total;
        debug!(
            generation = self.generation,
            total_secs = total.as_secs(),
            ticking,
            "phase timer armed"
        );
        self.generation
    }

    /// Disarms the timer. The next `wait` pends until re-armed.
    ///
    /// Bumps the generation so anything queued against the old deadline
    /// identifies itself as stale.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation += 1;
            self.next_tick = None;
            debug!(generation = self.generation, "phase timer cancelled");
        }
    }

    /// Waits for the next tick or the deadline, whichever is sooner.
    ///
    /// Pends forever while unarmed.
    pub async fn wait(&mut self) -> TimerFire {
        let Some(deadline) = self.deadline else {
            // Unarmed: this future never completes on its own, but a
            // surrounding select! still serves its other branches.
            std::future::pending::<()>().await;
            unreachable!()
        };

        let next = match self.next_tick {
            Some(tick) if tick < deadline => tick,
            _ => deadline,
        };
        time::sleep_until(next).await;

        if next >= deadline {
            self.deadline = None;
            self.next_tick = None;
            trace!(generation = self.generation, "phase deadline elapsed");
            return TimerFire::Expired {
                generation: self.generation,
            };
        }

        self.next_tick = Some(next + TICK_INTERVAL);
        TimerFire::Tick {
            seconds_left: Self::round_secs(
                deadline.saturating_duration_since(next),
            ),
            total_seconds: self.total.as_secs(),
        }
    }

    /// Whole seconds until the armed deadline, rounded to nearest; 0 when
    /// unarmed or already past.
    pub fn seconds_left(&self) -> u64 {
        self.deadline
            .map(|d| {
                Self::round_secs(
                    d.saturating_duration_since(TokioInstant::now()),
                )
            })
            .unwrap_or(0)
    }

    /// The full length of the currently/last armed phase, in whole seconds.
    pub fn total_seconds(&self) -> u64 {
        self.total.as_secs()
    }

    /// Whether a deadline is currently armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The current generation. Bumped on every arm and cancel.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn round_secs(d: Duration) -> u64 {
        d.as_secs_f64().round() as u64
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}
