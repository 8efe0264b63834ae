//! Round content for outsketch.
//!
//! The round orchestrator doesn't own any words — it asks a
//! [`PromptSource`] for the next round's content, shaped per game mode.
//! This crate defines that seam and ships [`StaticCatalog`], a built-in
//! source backed by fixed lists.
//!
//! Swapping in a themed word pack, a per-room curated list, or a remote
//! catalog means implementing one method; the orchestrator never changes.

mod catalog;

pub use catalog::StaticCatalog;

use outsketch_protocol::{Difficulty, GameMode, PromptPayload};

/// Supplies round content, shaped per mode.
///
/// Synchronous by contract: the orchestrator calls this inside a room's
/// exclusive region, so implementations must not perform I/O. A source
/// must always produce a payload — there is no empty-prompt escape hatch,
/// because a round without content cannot be played.
pub trait PromptSource: Send + Sync + 'static {
    /// Picks the next prompt for `mode`, optionally constrained to a
    /// difficulty band (sources without banded content may ignore it).
    fn next_prompt(
        &self,
        mode: GameMode,
        difficulty: Option<Difficulty>,
    ) -> PromptPayload;
}
