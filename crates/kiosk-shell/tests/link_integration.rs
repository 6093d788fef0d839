//! Integration tests for the upstream link client.
//!
//! # Purpose
//!
//! These tests run the link client against a real in-process WebSocket
//! server — a `TcpListener` plus `tokio_tungstenite::accept_async`, playing
//! the remote controller — and verify the behaviour the kiosk depends on in
//! the field:
//!
//! - Commands pushed over a live socket reach the display controller.
//! - An unrecognised message type is dropped without closing the connection;
//!   later commands on the same socket still apply.
//! - A dropped connection is re-established and commands flow again.
//! - Shutdown ends the client promptly, whether it is connected or sitting
//!   in a backoff sleep, with no further connection attempts.
//!
//! # Command flow
//!
//! ```text
//! controller ──ws──► {"type":"carescape","params":{"roomId":"42"}}
//!                      → set_state("carescape", {roomId:"42"})
//!                      → snapshot := (carescape, {roomId:"42"})
//! ```
//!
//! The controller side never receives a reply; assertions poll the shared
//! snapshot until it reflects the command or a deadline passes.

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use kiosk_core::{StateCatalog, StateSpec};
use kiosk_shell::application::display_controller::DisplayController;
use kiosk_shell::application::KioskContext;
use kiosk_shell::infrastructure::network::run_upstream_link;
use kiosk_shell::infrastructure::window_host::mock::{CallLog, MockWindowHost};

// ── Test harness ──────────────────────────────────────────────────────────────

fn test_context() -> (Arc<KioskContext>, CallLog) {
    let catalog = StateCatalog::build(&[
        StateSpec::new("screensaver", "splash", true),
        StateSpec::new("carescape", "https://x/ledwallview/care", false),
        StateSpec::new("inSession", "https://x/ledwallview/ma", false),
        StateSpec::new("goodbye", "https://x/ledwallview/endAppt", false),
    ])
    .unwrap();
    let host = MockWindowHost::new();
    let log = host.call_log();
    let controller = DisplayController::new(catalog, "ledcarewall", "screensaver", Box::new(host));
    (KioskContext::new(controller), log)
}

/// Binds the fake controller's listener on an OS-assigned port.
async fn controller_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("ws://{}", listener.local_addr().unwrap());
    (listener, endpoint)
}

/// Accepts one kiosk connection and completes the WebSocket handshake.
async fn accept_kiosk(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _peer) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("kiosk must connect before the deadline")
        .unwrap();
    accept_async(stream).await.expect("handshake must complete")
}

/// Polls the snapshot until `expected` is the current state.
async fn wait_for_state(ctx: &KioskContext, expected: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        {
            let controller = ctx.controller.lock().await;
            if controller.snapshot().current_state == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for state '{expected}'"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ── Live-socket command flow ──────────────────────────────────────────────────

/// Tests the main command path: the controller pushes a sequence of frames
/// over one connection and the kiosk applies each in turn.
#[tokio::test]
async fn test_commands_over_live_socket_reach_the_controller() {
    // Arrange
    let (ctx, log) = test_context();
    let (listener, endpoint) = controller_listener().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let link = tokio::spawn(run_upstream_link(
        Some(endpoint),
        Arc::clone(&ctx),
        shutdown_rx,
    ));

    let mut controller_ws = accept_kiosk(&listener).await;

    // Act / Assert: a room-scoped carescape command.
    controller_ws
        .send(Message::Text(
            r#"{"type":"carescape","params":{"roomId":"42"}}"#.to_string(),
        ))
        .await
        .unwrap();
    wait_for_state(&ctx, "carescape").await;
    {
        let controller = ctx.controller.lock().await;
        assert_eq!(
            controller.snapshot().current_params.get("roomId"),
            Some(&serde_json::json!("42"))
        );
    }

    // An unknown type is dropped without closing the connection; the
    // goodbye that follows on the same socket must still apply.
    controller_ws
        .send(Message::Text(r#"{"type":"reboot","force":true}"#.to_string()))
        .await
        .unwrap();
    controller_ws
        .send(Message::Text(r#"{"type":"goodbye"}"#.to_string()))
        .await
        .unwrap();
    wait_for_state(&ctx, "goodbye").await;

    // Back to idle.
    controller_ws
        .send(Message::Text(r#"{"type":"screensaver"}"#.to_string()))
        .await
        .unwrap();
    wait_for_state(&ctx, "screensaver").await;
    {
        let controller = ctx.controller.lock().await;
        assert!(controller.snapshot().current_params.is_empty());
    }
    assert!(!log.calls().is_empty());

    // Teardown: shutdown must end the client promptly.
    shutdown_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), link)
        .await
        .expect("link client must stop on shutdown")
        .unwrap();
}

/// Tests that malformed JSON on the wire does not kill the connection.
#[tokio::test]
async fn test_malformed_frame_does_not_close_the_connection() {
    let (ctx, _log) = test_context();
    let (listener, endpoint) = controller_listener().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let link = tokio::spawn(run_upstream_link(
        Some(endpoint),
        Arc::clone(&ctx),
        shutdown_rx,
    ));

    let mut controller_ws = accept_kiosk(&listener).await;

    controller_ws
        .send(Message::Text("{not json".to_string()))
        .await
        .unwrap();
    controller_ws
        .send(Message::Text(
            r#"{"type":"state","state":"inSession","params":{"roomId":"7"}}"#.to_string(),
        ))
        .await
        .unwrap();

    wait_for_state(&ctx, "inSession").await;

    shutdown_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), link).await.unwrap().unwrap();
}

// ── Reconnection ──────────────────────────────────────────────────────────────

/// Tests that the client re-establishes a dropped connection and commands
/// flow again on the new socket.
#[tokio::test]
async fn test_client_reconnects_after_controller_drops_the_link() {
    let (ctx, _log) = test_context();
    let (listener, endpoint) = controller_listener().await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let link = tokio::spawn(run_upstream_link(
        Some(endpoint),
        Arc::clone(&ctx),
        shutdown_rx,
    ));

    // First connection: apply one command, then drop the socket.
    let mut first = accept_kiosk(&listener).await;
    first
        .send(Message::Text(
            r#"{"type":"carescape","params":{"roomId":"42"}}"#.to_string(),
        ))
        .await
        .unwrap();
    wait_for_state(&ctx, "carescape").await;
    drop(first);

    // The client retries after the base backoff delay and the second
    // connection carries commands like the first.
    let mut second = accept_kiosk(&listener).await;
    second
        .send(Message::Text(r#"{"type":"goodbye"}"#.to_string()))
        .await
        .unwrap();
    wait_for_state(&ctx, "goodbye").await;

    shutdown_tx.send(true).unwrap();
    timeout(Duration::from_secs(5), link).await.unwrap().unwrap();
}

// ── Shutdown and disabled operation ───────────────────────────────────────────

/// Tests that shutdown cancels a pending reconnect sleep: the client is
/// pointed at a dead endpoint, so it is either connecting or backing off
/// when the signal fires.
#[tokio::test]
async fn test_shutdown_cancels_pending_reconnect() {
    let (ctx, _log) = test_context();

    // Bind and immediately drop a listener so the port refuses connections.
    let (listener, endpoint) = controller_listener().await;
    drop(listener);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let link = tokio::spawn(run_upstream_link(
        Some(endpoint),
        Arc::clone(&ctx),
        shutdown_rx,
    ));

    // Give the client time to fail at least one attempt and enter backoff.
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();

    timeout(Duration::from_secs(5), link)
        .await
        .expect("link client must stop without waiting out the backoff")
        .unwrap();
}

/// Tests that an unconfigured link is a true no-op.
#[tokio::test]
async fn test_unconfigured_link_completes_immediately() {
    let (ctx, log) = test_context();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    timeout(
        Duration::from_secs(1),
        run_upstream_link(None, Arc::clone(&ctx), shutdown_rx),
    )
    .await
    .expect("disabled link must not loop");

    assert!(log.calls().is_empty());
}
