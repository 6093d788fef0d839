//! Application layer for the kiosk shell.
//!
//! The application layer sits between the domain (`kiosk-core`) and the
//! infrastructure (HTTP server, WebSocket link, window host adapters).  It
//! holds the only mutable state in the process: the display controller and
//! its snapshot of what the kiosk is currently showing.
//!
//! # Sub-modules
//!
//! - **`display_controller`** – The display-state machine.  Accepts state
//!   transitions from the control plane, resolves them through the catalog,
//!   records the intent in its snapshot, and drives the window host.

pub mod display_controller;

use std::sync::Arc;

use tokio::sync::Mutex;

use display_controller::DisplayController;

/// The explicitly-owned context shared by the HTTP server and the upstream
/// link client.
///
/// Both I/O sources feed the same [`DisplayController`].  There is no
/// parallelism against its snapshot — only interleaving: each handler locks
/// the async mutex, applies one command, and releases it.  The mutex is
/// `tokio::sync::Mutex` so a waiting handler suspends its task instead of
/// blocking the runtime thread.
///
/// Constructed once at startup and torn down at shutdown; no ambient
/// singletons.
pub struct KioskContext {
    /// The display-state machine, behind the single writer lock.
    pub controller: Mutex<DisplayController>,
}

impl KioskContext {
    /// Wraps `controller` for sharing across the I/O tasks.
    pub fn new(controller: DisplayController) -> Arc<Self> {
        Arc::new(Self {
            controller: Mutex::new(controller),
        })
    }
}
