//! `GameServer` builder, accept loop, and the registry sweep task.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use outsketch_content::PromptSource;
use outsketch_judge::JudgeClient;
use outsketch_protocol::JsonCodec;
use outsketch_room::{RoomConfig, RoomRegistry};

use crate::handler::handle_connection;
use crate::GatewayError;

/// Shared server state handed to every connection handler task.
pub(crate) struct ServerState<J, P> {
    pub(crate) registry: RoomRegistry<J, P>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a game server.
pub struct GameServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    sweep_interval: Duration,
}

impl GameServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the room limits and phase durations.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// How often expired rooms are reaped.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Binds the listener and assembles the server around the given
    /// judge and prompt source.
    pub async fn build<J, P>(
        self,
        judge: J,
        prompts: P,
    ) -> Result<GameServer<J, P>, GatewayError>
    where
        J: JudgeClient,
        P: PromptSource,
    {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "outsketch gateway listening");

        Ok(GameServer {
            listener,
            sweep_interval: self.sweep_interval,
            state: Arc::new(ServerState {
                registry: RoomRegistry::new(judge, prompts, self.room_config),
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running game server. Call [`run`](Self::run) to serve connections.
pub struct GameServer<J, P> {
    listener: TcpListener,
    sweep_interval: Duration,
    state: Arc<ServerState<J, P>>,
}

impl<J, P> GameServer<J, P>
where
    J: JudgeClient,
    P: PromptSource,
{
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the sweep task and the accept loop until the process ends.
    pub async fn run(self) -> Result<(), GatewayError> {
        // Passive reaper: rooms whose expiry elapsed disappear, timers
        // and all. Everything else already treats them as not found.
        let sweeper = Arc::clone(&self.state);
        let interval = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // the first tick fires immediately
            loop {
                ticker.tick().await;
                let swept = sweeper.registry.sweep_expired().await;
                if swept > 0 {
                    tracing::info!(swept, "expired rooms reaped");
                }
            }
        });

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(%addr, "connection accepted");
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(error) =
                            handle_connection(stream, state).await
                        {
                            tracing::debug!(
                                %addr,
                                %error,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                }
            }
        }
    }
}
