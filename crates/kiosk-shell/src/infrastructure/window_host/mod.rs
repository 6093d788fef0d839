//! The window-host seam.
//!
//! The GUI runtime that actually paints pixels — window creation, the child
//! render surface, kiosk chrome — is out of scope for this crate.  The core
//! depends on exactly four operations (load a remote URL, load a named local
//! asset, fit the active surface to the content area, destroy the child
//! surface) plus a bounds query and a ready/resize event feed.  Everything
//! behind [`WindowHost`] is fire-and-forget: a render call that the host
//! silently fails to complete is a rendering concern, not ours, and is never
//! retried.
//!
//! # Testability
//!
//! The [`WindowHost`] trait lets unit tests record render calls without any
//! GUI runtime; see [`mock::MockWindowHost`].  The binary wires in
//! [`HeadlessWindowHost`], which only logs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;
use url::Url;

pub mod mock;

use crate::application::KioskContext;

/// Content-area rectangle reported by the window host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Bounds {
    /// A bounds rectangle anchored at the origin.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Events the window host reports back to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The host finished creating its window and can accept render calls.
    /// The controller enters the configured initial state on this event.
    Ready,
    /// The content area changed size; the controller reissues
    /// `resize_to_fill` on the active render target.
    Resized,
}

/// Trait abstracting the GUI runtime the controller drives.
///
/// The production implementation wraps the embedded-browser host window;
/// tests use [`mock::MockWindowHost`].
pub trait WindowHost: Send {
    /// Loads a remote URL into the child render surface.
    fn render_remote(&mut self, url: &Url);

    /// Loads a named local asset into the top-level surface.
    fn render_local_asset(&mut self, asset: &str);

    /// Fits the active render target to `bounds`.
    fn resize_to_fill(&mut self, bounds: Bounds);

    /// Destroys the child render surface, if one exists.
    fn destroy_current_view(&mut self);

    /// Current content-area bounds.
    fn content_bounds(&self) -> Bounds;

    /// Returns the host's event feed.  May be called once, before the host
    /// is handed to the controller.
    fn subscribe(&mut self) -> mpsc::Receiver<HostEvent>;
}

/// Spawns the task that forwards host events into the controller.
///
/// `Ready` enters the configured initial state; `Resized` re-fits the
/// active render target.  The task ends when the host drops its sender.
pub fn spawn_event_pump(
    ctx: Arc<KioskContext>,
    mut events: mpsc::Receiver<HostEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let mut controller = ctx.controller.lock().await;
            match event {
                HostEvent::Ready => controller.enter_initial_state(),
                HostEvent::Resized => controller.handle_resize(),
            }
        }
    })
}

/// A window host with no window: logs every call and reports fixed bounds.
///
/// Used by the binary when the GUI runtime is not wired in (headless
/// development, containers, CI) so the whole control plane stays
/// exercisable.  Reports `Ready` immediately on subscribe.
pub struct HeadlessWindowHost {
    bounds: Bounds,
    events: Option<mpsc::Receiver<HostEvent>>,
}

impl HeadlessWindowHost {
    /// Creates a headless host reporting `bounds` with `Ready` pre-queued.
    pub fn new(bounds: Bounds) -> Self {
        let (tx, rx) = mpsc::channel(4);
        // The headless host is ready the moment it exists.
        tx.try_send(HostEvent::Ready).ok();
        Self {
            bounds,
            events: Some(rx),
        }
    }
}

impl WindowHost for HeadlessWindowHost {
    fn render_remote(&mut self, url: &Url) {
        info!("window host (headless): render remote {url}");
    }

    fn render_local_asset(&mut self, asset: &str) {
        info!("window host (headless): render local asset '{asset}'");
    }

    fn resize_to_fill(&mut self, bounds: Bounds) {
        info!(
            "window host (headless): resize to {}x{}",
            bounds.width, bounds.height
        );
    }

    fn destroy_current_view(&mut self) {
        info!("window host (headless): destroy current view");
    }

    fn content_bounds(&self) -> Bounds {
        self.bounds
    }

    fn subscribe(&mut self) -> mpsc::Receiver<HostEvent> {
        self.events
            .take()
            .unwrap_or_else(|| mpsc::channel(1).1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
