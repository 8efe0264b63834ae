//! # outsketch
//!
//! Server for a real-time "draw, describe, and outwit the AI" party game.
//! Players share short-lived rooms that cycle through
//! LOBBY → DRAWING → GUESSING → REVEAL under hard time limits, racing an
//! automated judge to guess each other's drawings and descriptions.
//!
//! This crate is the WebSocket gateway: it accepts connections, decodes
//! [`ClientRequest`](outsketch_protocol::ClientRequest)s, routes them to
//! the room layer, and pumps each room's
//! [`ServerEvent`](outsketch_protocol::ServerEvent)s back out. All game
//! rules live in `outsketch-room`; the judge and the prompt catalog are
//! pluggable collaborators.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use outsketch::GameServerBuilder;
//! use outsketch_content::StaticCatalog;
//! use outsketch_judge::CannedJudge;
//!
//! # async fn run() -> Result<(), outsketch::GatewayError> {
//! let server = GameServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(CannedJudge::new(), StaticCatalog)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::GatewayError;
pub use server::{GameServer, GameServerBuilder};
