//! WebSocket end-to-end tests: a real server, real sockets, scripted
//! judge and prompts.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use outsketch::GameServerBuilder;
use outsketch_content::PromptSource;
use outsketch_judge::CannedJudge;
use outsketch_protocol::{
    ClientRequest, Difficulty, GameMode, Phase, PlayerId, PromptPayload,
    RoomCode, RoundOutcome, ServerEvent,
};

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Always "gato" so guesses can be scripted.
struct FixedPrompts;

impl PromptSource for FixedPrompts {
    fn next_prompt(
        &self,
        _mode: GameMode,
        _difficulty: Option<Difficulty>,
    ) -> PromptPayload {
        PromptPayload::Classic {
            prompt: "gato".into(),
            category: "test".into(),
            difficulty: Difficulty::Easy,
        }
    }
}

async fn start_server() -> String {
    let server = GameServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(
            CannedJudge::new().with_image_guesses(["perro"]),
            FixedPrompts,
        )
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    ws
}

async fn send(ws: &mut Ws, request: &ClientRequest) {
    let bytes = serde_json::to_vec(request).unwrap();
    ws.send(Message::Binary(bytes.into())).await.unwrap();
}

async fn recv_event(ws: &mut Ws) -> ServerEvent {
    let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_slice(&message.into_data()).unwrap()
}

/// Drains events until one matches.
async fn wait_for(
    ws: &mut Ws,
    what: &str,
    mut pred: impl FnMut(&ServerEvent) -> bool,
) -> ServerEvent {
    for _ in 0..50 {
        let event = recv_event(ws).await;
        if pred(&event) {
            return event;
        }
    }
    panic!("gave up waiting for {what}");
}

fn is_phase(phase: Phase) -> impl FnMut(&ServerEvent) -> bool {
    move |event| {
        matches!(event, ServerEvent::GamePhase(e) if e.phase == phase)
    }
}

/// Creates a room via `host` and joins `guest`, returning the code and
/// both player ids.
async fn create_and_join(
    host: &mut Ws,
    guest: &mut Ws,
) -> (RoomCode, PlayerId, PlayerId) {
    send(
        host,
        &ClientRequest::CreateRoom {
            player_name: "ada".into(),
            mode: GameMode::Classic,
            max_rounds: None,
            difficulty: None,
        },
    )
    .await;
    let (code, host_id) = match recv_event(host).await {
        ServerEvent::RoomJoined { room, player_id } => {
            (room.code, player_id)
        }
        other => panic!("expected room:joined, got {other:?}"),
    };

    send(
        guest,
        &ClientRequest::JoinRoom {
            room_code: code.clone(),
            player_name: "bo".into(),
        },
    )
    .await;
    let guest_id = match wait_for(guest, "room:joined", |e| {
        matches!(e, ServerEvent::RoomJoined { .. })
    })
    .await
    {
        ServerEvent::RoomJoined { player_id, .. } => player_id,
        other => panic!("expected room:joined, got {other:?}"),
    };

    (code, host_id, guest_id)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_code_and_host_seat() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientRequest::CreateRoom {
            player_name: "ada".into(),
            mode: GameMode::Classic,
            max_rounds: None,
            difficulty: None,
        },
    )
    .await;

    match recv_event(&mut ws).await {
        ServerEvent::RoomJoined { room, player_id } => {
            assert_eq!(room.code.as_str().len(), RoomCode::LEN);
            assert_eq!(room.players.len(), 1);
            assert!(room.players[0].is_host);
            assert_eq!(room.players[0].id, player_id);
            assert_eq!(room.phase, Phase::Lobby);
        }
        other => panic!("expected room:joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_broadcasts_room_update_to_everyone() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;

    create_and_join(&mut host, &mut guest).await;

    let update = wait_for(&mut host, "room:update with 2 players", |e| {
        matches!(e, ServerEvent::RoomUpdate { room } if room.players.len() == 2)
    })
    .await;
    match update {
        ServerEvent::RoomUpdate { room } => {
            assert!(room.players.iter().any(|p| p.name == "bo"));
        }
        other => panic!("expected room:update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_unknown_room_yields_error_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientRequest::JoinRoom {
            room_code: RoomCode("ZZZZ".into()),
            player_name: "bo".into(),
        },
    )
    .await;

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not found"), "got: {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_request_before_binding_yields_error_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &ClientRequest::StartRound).await;

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not in a room"), "got: {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_host_start_yields_error_event() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;
    create_and_join(&mut host, &mut guest).await;

    send(&mut guest, &ClientRequest::StartRound).await;

    let event = wait_for(&mut guest, "error event", |e| {
        matches!(e, ServerEvent::Error { .. })
    })
    .await;
    match event {
        ServerEvent::Error { message } => {
            assert!(message.contains("host"), "got: {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_round_over_websocket() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;
    let (_code, host_id, _guest_id) =
        create_and_join(&mut host, &mut guest).await;

    // Host starts; both sides see the DRAWING phase.
    send(&mut host, &ClientRequest::StartRound).await;
    let event =
        wait_for(&mut guest, "DRAWING phase", is_phase(Phase::Drawing))
            .await;
    match &event {
        ServerEvent::GamePhase(e) => {
            assert_eq!(e.drawer_id, Some(host_id));
            assert_eq!(e.prompt.as_deref(), Some("gato"));
            assert_eq!(e.round_number, 1);
        }
        other => panic!("expected game:phase, got {other:?}"),
    }
    wait_for(&mut host, "DRAWING phase", is_phase(Phase::Drawing)).await;

    // Drawer submits; the judge ("perro") opens GUESSING.
    send(
        &mut host,
        &ClientRequest::SubmitDrawing {
            image: outsketch_protocol::Drawing("data:...".into()),
            sequence_complete: false,
        },
    )
    .await;
    wait_for(&mut guest, "GUESSING phase", is_phase(Phase::Guessing)).await;

    // The only guesser answers correctly: instant reveal, humans win.
    send(
        &mut guest,
        &ClientRequest::SubmitGuess {
            guess: "gato".into(),
        },
    )
    .await;

    let event = wait_for(&mut guest, "reveal", |e| {
        matches!(e, ServerEvent::Reveal { .. })
    })
    .await;
    match event {
        ServerEvent::Reveal { result, .. } => {
            assert_eq!(result.outcome, RoundOutcome::Humans);
            assert_eq!(result.ai_guess.as_deref(), Some("perro"));
            assert_eq!(result.correct_human_guesses, 1);
        }
        other => panic!("expected reveal, got {other:?}"),
    }

    // Scores reach everyone through the room update.
    let update = wait_for(&mut host, "scored room update", |e| {
        matches!(e, ServerEvent::RoomUpdate { room }
            if room.players.iter().any(|p| p.score > 0))
    })
    .await;
    match update {
        ServerEvent::RoomUpdate { room } => {
            let ada =
                room.players.iter().find(|p| p.name == "ada").unwrap();
            let bo =
                room.players.iter().find(|p| p.name == "bo").unwrap();
            assert_eq!(ada.score, 5, "drawer bonus");
            assert_eq!(bo.score, 10, "guesser points");
        }
        other => panic!("expected room:update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_flags_player_and_rejoin_restores_them() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;
    let (code, _host_id, guest_id) =
        create_and_join(&mut host, &mut guest).await;

    // Guest's socket drops.
    drop(guest);

    let update = wait_for(&mut host, "disconnect update", |e| {
        matches!(e, ServerEvent::RoomUpdate { room }
            if room.players.iter().any(|p| !p.is_connected))
    })
    .await;
    match update {
        ServerEvent::RoomUpdate { room } => {
            let bo =
                room.players.iter().find(|p| p.name == "bo").unwrap();
            assert!(!bo.is_connected);
            assert_eq!(room.players.len(), 2, "the seat survives");
        }
        other => panic!("expected room:update, got {other:?}"),
    }

    // A fresh socket resumes the same seat.
    let mut back = connect(&addr).await;
    send(
        &mut back,
        &ClientRequest::Rejoin {
            room_code: code,
            player_id: guest_id,
        },
    )
    .await;
    match wait_for(&mut back, "room:joined", |e| {
        matches!(e, ServerEvent::RoomJoined { .. })
    })
    .await
    {
        ServerEvent::RoomJoined { room, player_id } => {
            assert_eq!(player_id, guest_id);
            let bo =
                room.players.iter().find(|p| p.name == "bo").unwrap();
            assert!(bo.is_connected);
        }
        other => panic!("expected room:joined, got {other:?}"),
    }
}
