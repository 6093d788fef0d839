//! Upstream WebSocket link client.
//!
//! The remote controller (a workstation in the same room) pushes display
//! commands to the kiosk over a persistent outbound WebSocket.  The kiosk is
//! always the connecting side; there is at most one live connection, and
//! there is no reply channel — a command that cannot be applied is logged
//! and dropped.
//!
//! # Reconnection
//!
//! The connection is supervised by an exponential backoff loop: every
//! successful open resets the delay to 1 s, every close or error schedules
//! the next attempt after the current delay and doubles it, capped at 30 s.
//! A kiosk that loses its controller keeps retrying indefinitely — the
//! display surviving in a stale state beats going dark.
//!
//! # Shutdown
//!
//! The loop watches the process-wide shutdown channel.  A pending reconnect
//! sleep is cancelled, an open socket is closed, and no further attempt is
//! made once shutdown is signalled.
//!
//! Absent a configured endpoint the component is a true no-op: no socket,
//! no retry loop, one log line.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::{info, warn};
use url::Url;

use kiosk_core::{parse_frame, ParsedFrame, StateParams, UpstreamCommand};

use crate::application::display_controller::SCREENSAVER_STATE;
use crate::application::KioskContext;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Exponential backoff between reconnect attempts.
///
/// Consecutive failures without an intervening open produce the delay
/// sequence 1000, 2000, 4000, 8000, 16000, 30000, 30000, ... ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectBackoff {
    delay: Duration,
}

impl ReconnectBackoff {
    /// Delay before the first retry, and after every successful open.
    pub const BASE: Duration = Duration::from_millis(1000);
    /// Ceiling the delay never exceeds.
    pub const CAP: Duration = Duration::from_millis(30_000);

    /// A fresh backoff at the base delay.
    pub fn new() -> Self {
        Self { delay: Self::BASE }
    }

    /// Returns the delay to wait before the next attempt and doubles the
    /// stored delay for the failure after this one, capped.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(Self::CAP);
        current
    }

    /// Resets to the base delay.  Called on every successful open.
    pub fn reset(&mut self) {
        self.delay = Self::BASE;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the read loop on one connection ended.
#[derive(Debug, PartialEq, Eq)]
enum LinkExit {
    /// Process shutdown was signalled; the socket has been closed.
    Shutdown,
    /// The connection closed or failed; the caller schedules a reconnect.
    Disconnected,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the upstream link client until shutdown is signalled.
///
/// With `endpoint` absent this returns immediately — the component is
/// disabled, not a connect-then-fail loop.  Transport failures are recovered
/// locally through the backoff loop and never surfaced to a caller; there is
/// nobody to notify.
pub async fn run_upstream_link(
    endpoint: Option<String>,
    ctx: Arc<KioskContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    let Some(endpoint) = endpoint else {
        info!("upstream endpoint not configured; link client disabled");
        return;
    };

    let mut backoff = ReconnectBackoff::new();

    loop {
        info!("connecting to upstream controller at {endpoint}");

        let connected = tokio::select! {
            // Resolves on the shutdown signal, or on sender drop at teardown.
            _ = shutdown.changed() => break,
            result = connect_async(endpoint.as_str()) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                info!("upstream link connected");
                backoff.reset();
                if read_frames(stream, &ctx, &mut shutdown).await == LinkExit::Shutdown {
                    break;
                }
            }
            Err(e) => {
                warn!("could not connect to upstream controller: {e}");
            }
        }

        // Close and error collapse to the same retry path.
        let delay = backoff.next_delay();
        info!("reconnecting to upstream controller in {}ms", delay.as_millis());
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!("upstream link client stopped");
}

// ── Connection handling ───────────────────────────────────────────────────────

/// Reads frames off one live connection until it ends or shutdown fires.
async fn read_frames(
    mut stream: WsStream,
    ctx: &KioskContext,
    shutdown: &mut watch::Receiver<bool>,
) -> LinkExit {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let _ = stream.close(None).await;
                return LinkExit::Shutdown;
            }
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => dispatch_frame(ctx, &text).await,
                Some(Ok(WsMessage::Binary(_))) => {
                    // The link protocol is JSON text only.
                    warn!("dropping binary frame on upstream link");
                }
                // Keepalive frames are answered by the library.
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                // Raw frames never surface from a read.
                Some(Ok(WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("upstream link disconnected");
                    return LinkExit::Disconnected;
                }
                Some(Err(e)) => {
                    warn!("upstream link read failed: {e}");
                    return LinkExit::Disconnected;
                }
            }
        }
    }
}

/// Parses one inbound text frame and applies it to the controller.
///
/// Malformed JSON and unrecognised types are logged and dropped; neither
/// closes the connection.
pub async fn dispatch_frame(ctx: &KioskContext, text: &str) {
    let command = match parse_frame(text) {
        Ok(ParsedFrame::Command(command)) => command,
        Ok(ParsedFrame::Unknown { message_type }) => {
            warn!("unknown message type: {message_type}");
            return;
        }
        Err(e) => {
            warn!("dropping malformed frame: {e}");
            return;
        }
    };

    let mut controller = ctx.controller.lock().await;
    let result = match command {
        UpstreamCommand::State { state, params } => controller.set_state(&state, params),
        UpstreamCommand::Navigate { url } => {
            match Url::parse(&url) {
                Ok(url) => controller.enter_destination(url),
                Err(e) => warn!("dropping navigate to unparseable url '{url}': {e}"),
            }
            Ok(())
        }
        UpstreamCommand::Splash => {
            controller.show_splash();
            Ok(())
        }
        UpstreamCommand::Screensaver => controller.set_state(SCREENSAVER_STATE, StateParams::new()),
        UpstreamCommand::Carescape { params } => controller.set_state("carescape", params),
        UpstreamCommand::InSession { params } => controller.set_state("inSession", params),
        UpstreamCommand::Goodbye { params } => controller.set_state("goodbye", params),
    };

    // No reply channel on the link: an unknown state is a warning, nothing
    // more, and the snapshot stays unchanged.
    if let Err(e) = result {
        warn!("dropping upstream command: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
