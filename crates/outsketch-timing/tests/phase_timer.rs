//! Integration tests for the phase timer.
//!
//! Uses `tokio::time::pause()` (via `start_paused`) so `sleep_until`
//! resolves instantly when the runtime auto-advances the clock — no test
//! ever waits wall-clock game lengths.

use std::time::Duration;

use outsketch_timing::{PhaseTimer, TimerFire};

/// Polls `wait` with a timeout; `Err` means the timer pended.
async fn wait_or_pend(
    timer: &mut PhaseTimer,
    window: Duration,
) -> Option<TimerFire> {
    tokio::time::timeout(window, timer.wait()).await.ok()
}

// =========================================================================
// Arming and expiry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_unarmed_timer_pends_forever() {
    let mut timer = PhaseTimer::new();
    assert!(!timer.is_armed());
    assert!(
        wait_or_pend(&mut timer, Duration::from_secs(60)).await.is_none(),
        "unarmed timer must not fire"
    );
}

#[tokio::test(start_paused = true)]
async fn test_armed_timer_expires_with_its_generation() {
    let mut timer = PhaseTimer::new();
    let generation = timer.arm(Duration::from_secs(2), false);

    let fire = timer.wait().await;
    assert_eq!(fire, TimerFire::Expired { generation });
}

#[tokio::test(start_paused = true)]
async fn test_expiry_disarms_the_timer() {
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(1), false);

    let _ = timer.wait().await;
    assert!(!timer.is_armed());
    assert!(
        wait_or_pend(&mut timer, Duration::from_secs(60)).await.is_none(),
        "a fired deadline must not fire again"
    );
}

#[tokio::test(start_paused = true)]
async fn test_non_ticking_arm_produces_no_ticks() {
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(10), false);

    // First fire is the deadline itself.
    let fire = timer.wait().await;
    assert!(matches!(fire, TimerFire::Expired { .. }));
}

// =========================================================================
// Countdown ticks
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_ticking_arm_counts_down_then_expires() {
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(3), true);

    assert_eq!(
        timer.wait().await,
        TimerFire::Tick { seconds_left: 2, total_seconds: 3 }
    );
    assert_eq!(
        timer.wait().await,
        TimerFire::Tick { seconds_left: 1, total_seconds: 3 }
    );
    assert!(matches!(timer.wait().await, TimerFire::Expired { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_one_second_arm_skips_straight_to_expiry() {
    // A tick that would land exactly on the deadline is the deadline.
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(1), true);

    assert!(matches!(timer.wait().await, TimerFire::Expired { .. }));
}

// =========================================================================
// Cancel and re-arm
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_firing() {
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(5), false);
    timer.cancel();

    assert!(!timer.is_armed());
    assert!(
        wait_or_pend(&mut timer, Duration::from_secs(60)).await.is_none(),
        "cancelled timer must not fire"
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_bumps_generation() {
    let mut timer = PhaseTimer::new();
    let armed = timer.arm(Duration::from_secs(5), false);
    timer.cancel();
    assert!(timer.generation() > armed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_when_unarmed_is_a_no_op() {
    let mut timer = PhaseTimer::new();
    let generation = timer.generation();
    timer.cancel();
    assert_eq!(timer.generation(), generation);
}

#[tokio::test(start_paused = true)]
async fn test_rearm_replaces_previous_deadline() {
    let mut timer = PhaseTimer::new();
    let first = timer.arm(Duration::from_secs(120), false);
    let second = timer.arm(Duration::from_secs(2), false);
    assert!(second > first);

    // Only the new, shorter deadline fires — and with the new generation.
    let fire = timer.wait().await;
    assert_eq!(fire, TimerFire::Expired { generation: second });
    assert!(
        wait_or_pend(&mut timer, Duration::from_secs(300)).await.is_none(),
        "the replaced 120s deadline must be gone"
    );
}

// =========================================================================
// Accessors
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_seconds_left_reflects_armed_total() {
    let mut timer = PhaseTimer::new();
    assert_eq!(timer.seconds_left(), 0);

    timer.arm(Duration::from_secs(60), false);
    assert_eq!(timer.seconds_left(), 60);
    assert_eq!(timer.total_seconds(), 60);
}

#[tokio::test(start_paused = true)]
async fn test_seconds_left_zero_after_cancel() {
    let mut timer = PhaseTimer::new();
    timer.arm(Duration::from_secs(60), false);
    timer.cancel();
    assert_eq!(timer.seconds_left(), 0);
}
