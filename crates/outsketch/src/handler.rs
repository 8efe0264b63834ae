//! Per-connection handler: request decoding, room binding, event pumping.
//!
//! Each accepted socket gets its own task running [`handle_connection`]:
//!
//!   1. A writer task is spawned that drains the connection's event
//!      channel into the socket — the same channel the room actor
//!      broadcasts into once the connection binds to a room.
//!   2. The read loop decodes [`ClientRequest`]s and routes them to the
//!      registry. Rejections come back as `error` events on this
//!      connection only.
//!   3. When the socket drops, the player is flagged disconnected in
//!      their room (their seat survives for a later `room:rejoin`).

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use outsketch_content::PromptSource;
use outsketch_judge::JudgeClient;
use outsketch_protocol::{
    ClientRequest, Codec, PlayerId, RoomCode, ServerEvent,
};
use outsketch_room::{CreateOptions, EventSender};

use crate::server::ServerState;
use crate::GatewayError;

/// The room seat this connection speaks for, once bound.
type Binding = (RoomCode, PlayerId);

/// Serves one connection from accept to close.
pub(crate) async fn handle_connection<J, P>(
    stream: TcpStream,
    state: Arc<ServerState<J, P>>,
) -> Result<(), GatewayError>
where
    J: JudgeClient,
    P: PromptSource,
{
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    // Everything this connection should see flows through one channel:
    // direct replies from this handler and room broadcasts alike.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let Ok(bytes) = codec.encode(&event) else {
                tracing::error!("failed to encode outbound event");
                continue;
            };
            if sink.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    let mut binding: Option<Binding> = None;

    while let Some(message) = source.next().await {
        let data = match message {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(error) => {
                tracing::debug!(%error, "recv error");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(error) => {
                tracing::debug!(%error, "undecodable client request");
                send_error(&events_tx, "malformed request");
                continue;
            }
        };

        handle_request(&state, &events_tx, &mut binding, request).await;
    }

    // Socket gone: the seat stays, flagged disconnected, so the player
    // can rejoin. The room shortens its own expiry if nobody is left.
    if let Some((code, player_id)) = binding {
        let _ = state
            .registry
            .set_connectivity(&code, player_id, false)
            .await;
        tracing::info!(room = %code, %player_id, "connection dropped");
    }

    writer.abort();
    Ok(())
}

async fn handle_request<J, P>(
    state: &Arc<ServerState<J, P>>,
    events_tx: &EventSender,
    binding: &mut Option<Binding>,
    request: ClientRequest,
) where
    J: JudgeClient,
    P: PromptSource,
{
    match request {
        ClientRequest::CreateRoom {
            player_name,
            mode,
            max_rounds,
            difficulty,
        } => {
            if binding.is_some() {
                send_error(events_tx, "already in a room");
                return;
            }
            let joined = state
                .registry
                .create_room(
                    player_name,
                    events_tx.clone(),
                    CreateOptions {
                        mode,
                        max_rounds,
                        difficulty,
                    },
                )
                .await;
            *binding =
                Some((joined.room.code.clone(), joined.player_id));
            let _ = events_tx.send(ServerEvent::RoomJoined {
                room: joined.room,
                player_id: joined.player_id,
            });
        }

        ClientRequest::JoinRoom {
            room_code,
            player_name,
        } => {
            if binding.is_some() {
                send_error(events_tx, "already in a room");
                return;
            }
            match state
                .registry
                .join_room(&room_code, player_name, events_tx.clone())
                .await
            {
                Ok(joined) => {
                    *binding =
                        Some((joined.room.code.clone(), joined.player_id));
                    let _ = events_tx.send(ServerEvent::RoomJoined {
                        room: joined.room,
                        player_id: joined.player_id,
                    });
                }
                Err(rejection) => {
                    send_error(events_tx, &rejection.to_string());
                }
            }
        }

        ClientRequest::Rejoin {
            room_code,
            player_id,
        } => {
            if binding.is_some() {
                send_error(events_tx, "already in a room");
                return;
            }
            match state
                .registry
                .rejoin(&room_code, player_id, events_tx.clone())
                .await
            {
                Ok(joined) => {
                    *binding =
                        Some((joined.room.code.clone(), joined.player_id));
                    let _ = events_tx.send(ServerEvent::RoomJoined {
                        room: joined.room,
                        player_id: joined.player_id,
                    });
                }
                Err(rejection) => {
                    send_error(events_tx, &rejection.to_string());
                }
            }
        }

        ClientRequest::StartRound => {
            let Some((code, player_id)) = binding.clone() else {
                send_error(events_tx, "not in a room");
                return;
            };
            if let Err(rejection) =
                state.registry.start_round(&code, player_id).await
            {
                send_error(events_tx, &rejection.to_string());
            }
        }

        ClientRequest::SubmitDrawing {
            image,
            sequence_complete,
        } => {
            let Some((code, player_id)) = binding.clone() else {
                send_error(events_tx, "not in a room");
                return;
            };
            if let Err(rejection) = state
                .registry
                .submit_drawing(&code, player_id, image, sequence_complete)
                .await
            {
                send_error(events_tx, &rejection.to_string());
            }
        }

        ClientRequest::SubmitText { text } => {
            let Some((code, player_id)) = binding.clone() else {
                send_error(events_tx, "not in a room");
                return;
            };
            if let Err(rejection) =
                state.registry.submit_text(&code, player_id, text).await
            {
                send_error(events_tx, &rejection.to_string());
            }
        }

        ClientRequest::SubmitGuess { guess } => {
            let Some((code, player_id)) = binding.clone() else {
                send_error(events_tx, "not in a room");
                return;
            };
            if let Err(rejection) =
                state.registry.submit_guess(&code, player_id, guess).await
            {
                send_error(events_tx, &rejection.to_string());
            }
        }

        ClientRequest::Leave => {
            let Some((code, player_id)) = binding.take() else {
                send_error(events_tx, "not in a room");
                return;
            };
            if let Err(rejection) =
                state.registry.remove_player(&code, player_id).await
            {
                send_error(events_tx, &rejection.to_string());
            }
        }
    }
}

/// An `error` event to this connection only.
fn send_error(events_tx: &EventSender, message: &str) {
    let _ = events_tx.send(ServerEvent::Error {
        message: message.to_string(),
    });
}
