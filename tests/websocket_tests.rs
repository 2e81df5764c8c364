//! Socket lifecycle tests against a live server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use telemetry_pipeline::api::create_router;
use telemetry_pipeline::{
    AppState, BroadcastHub, IngestionScheduler, PipelineConfig, WsTransport, DASHBOARD_CHANNEL,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (Arc<AppState>, SocketAddr) {
    let config = PipelineConfig::default();
    let transport = Arc::new(WsTransport::new());
    let hub = Arc::new(BroadcastHub::new(config.heartbeat_interval));
    hub.initialize(transport.clone());
    let scheduler = Arc::new(IngestionScheduler::new(config.ingest_interval));
    let state = Arc::new(AppState::new(config, hub, scheduler, transport));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (state, addr)
}

async fn next_event(ws: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("no frame before timeout")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Connect, join the dashboard and wait until the server has handled the join
async fn join_dashboard(addr: SocketAddr) -> (Client, String) {
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();

    let connected = next_event(&mut ws).await;
    assert_eq!(connected["event"], "connected");
    let session_id = connected["data"]["sessionId"].as_str().unwrap().to_string();

    ws.send(Message::Text(r#"{"type":"join-dashboard"}"#.into())).await.unwrap();
    ws.send(Message::Text(r#"{"type":"request-update"}"#.into())).await.unwrap();
    let update = next_event(&mut ws).await;
    assert_eq!(update["event"], "update");

    (ws, session_id)
}

async fn wait_for_no_sessions(state: &AppState) {
    for _ in 0..200 {
        if state.hub.stats().sessions == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session still registered after socket closed");
}

#[tokio::test]
async fn test_close_frame_removes_session() {
    let (state, addr) = serve().await;
    let (mut ws, session_id) = join_dashboard(addr).await;
    assert_eq!(state.hub.members(DASHBOARD_CHANNEL), vec![session_id.clone()]);
    assert_eq!(state.transport.attached_count(), 1);

    ws.close(None).await.unwrap();
    wait_for_no_sessions(&state).await;

    assert!(state.hub.members(DASHBOARD_CHANNEL).is_empty());
    assert!(!state.hub.is_connected(&session_id));
    assert_eq!(state.transport.attached_count(), 0);
    assert!(state.hub.is_consistent());
}

#[tokio::test]
async fn test_dropped_connection_removes_session() {
    let (state, addr) = serve().await;
    let (ws, session_id) = join_dashboard(addr).await;

    // no close handshake, just the TCP stream going away
    drop(ws);
    wait_for_no_sessions(&state).await;

    assert!(!state.hub.is_connected(&session_id));
    assert!(state.hub.stats().channels.is_empty());
    assert_eq!(state.transport.attached_count(), 0);
}

#[tokio::test]
async fn test_remaining_session_keeps_heartbeats() {
    let (state, addr) = serve().await;
    let (mut leaving, _) = join_dashboard(addr).await;
    let (mut staying, staying_id) = join_dashboard(addr).await;

    leaving.close(None).await.unwrap();
    for _ in 0..200 {
        if state.hub.stats().sessions == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.hub.members(DASHBOARD_CHANNEL), vec![staying_id]);

    assert_eq!(state.hub.broadcast_to_room(DASHBOARD_CHANNEL, "periodic-update", Value::Null), 1);
    let heartbeat = next_event(&mut staying).await;
    assert_eq!(heartbeat["event"], "periodic-update");
}
