//! Mock window host for unit testing.
//!
//! Records every call the controller makes so tests can assert on the exact
//! render sequence without a GUI runtime, and lets tests inject ready/resize
//! events as if the host window produced them.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use url::Url;

use super::{Bounds, HostEvent, WindowHost};

/// One recorded call into the window host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `render_remote` with the URL in string form.
    RenderRemote(String),
    /// `render_local_asset` with the asset name.
    RenderLocalAsset(String),
    /// `resize_to_fill` with the bounds passed in.
    ResizeToFill(Bounds),
    /// `destroy_current_view`.
    DestroyCurrentView,
}

/// Cloneable view onto the calls a [`MockWindowHost`] has recorded.
///
/// The controller takes ownership of the host, so tests hold one of these
/// instead.
#[derive(Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl CallLog {
    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Only the render calls (`RenderRemote` / `RenderLocalAsset`).
    pub fn render_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(c, HostCall::RenderRemote(_) | HostCall::RenderLocalAsset(_))
            })
            .collect()
    }
}

/// A [`WindowHost`] that records calls and reports fixed bounds.
pub struct MockWindowHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    bounds: Bounds,
    event_tx: mpsc::Sender<HostEvent>,
    event_rx: Option<mpsc::Receiver<HostEvent>>,
}

impl MockWindowHost {
    /// Creates a mock host reporting 1920x1080 content bounds.
    pub fn new() -> Self {
        Self::with_bounds(Bounds::full(1920, 1080))
    }

    /// Creates a mock host reporting `bounds`.
    pub fn with_bounds(bounds: Bounds) -> Self {
        let (event_tx, event_rx) = mpsc::channel(16);
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            bounds,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Returns a handle for inspecting recorded calls after the host has
    /// been moved into the controller.
    pub fn call_log(&self) -> CallLog {
        CallLog {
            calls: Arc::clone(&self.calls),
        }
    }

    /// Returns a sender for injecting host events, as if the window
    /// reported them.
    pub fn event_injector(&self) -> mpsc::Sender<HostEvent> {
        self.event_tx.clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl Default for MockWindowHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost for MockWindowHost {
    fn render_remote(&mut self, url: &Url) {
        self.record(HostCall::RenderRemote(url.to_string()));
    }

    fn render_local_asset(&mut self, asset: &str) {
        self.record(HostCall::RenderLocalAsset(asset.to_string()));
    }

    fn resize_to_fill(&mut self, bounds: Bounds) {
        self.record(HostCall::ResizeToFill(bounds));
    }

    fn destroy_current_view(&mut self) {
        self.record(HostCall::DestroyCurrentView);
    }

    fn content_bounds(&self) -> Bounds {
        self.bounds
    }

    fn subscribe(&mut self) -> mpsc::Receiver<HostEvent> {
        self.event_rx
            .take()
            .unwrap_or_else(|| mpsc::channel(1).1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
