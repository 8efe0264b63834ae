//! Room lifecycle and round orchestration for outsketch.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! entire state: players, phase, timers, guesses, and the in-flight judge
//! call. The actor's command loop is the per-room exclusive region — all
//! mutation sources (client operations, timer fires, judge verdicts) are
//! serialized through it, and rooms never contend with each other.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates, finds, sweeps, and routes to rooms
//! - [`RoomHandle`] — send operations to a running room actor
//! - [`Room`] / [`Player`] — the shared data model
//! - [`RoomConfig`] — limits and phase durations
//! - [`Rejection`] — the "no-op + reason" result of a refused operation

mod actor;
mod broadcast;
mod config;
mod error;
mod model;
mod registry;
mod round;

pub use actor::{EventSender, JoinedRoom, RoomHandle, RoomInfo};
pub use config::RoomConfig;
pub use error::Rejection;
pub use model::{Player, Room};
pub use registry::{CreateOptions, RegistryStats, RoomRegistry};
