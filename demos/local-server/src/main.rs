//! A runnable outsketch server with no external services: the built-in
//! prompt catalog and a canned judge. Good enough to play a full game
//! locally and watch the phases tick by.
//!
//! ```text
//! RUST_LOG=outsketch=debug cargo run -p local-server
//! ```

use outsketch::GameServerBuilder;
use outsketch_content::StaticCatalog;
use outsketch_judge::CannedJudge;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("OUTSKETCH_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!(%addr, "starting outsketch demo server");

    let server = GameServerBuilder::new()
        .bind(&addr)
        .build(CannedJudge::new(), StaticCatalog)
        .await?;

    server.run().await?;
    Ok(())
}
