//! # kiosk-core
//!
//! Shared library for the kiosk shell containing the logical-state catalog,
//! the destination resolver, and the upstream command protocol.
//!
//! This crate is used by the shell application and by integration tests.
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview
//!
//! The kiosk shell is a full-screen embedded-browser host: an external
//! controller tells it which logical screen to show (screensaver, an
//! in-session view, a goodbye screen, ...) and the shell maps that request
//! to a concrete destination and drives the window host that renders it.
//!
//! This crate (`kiosk-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business logic with no I/O.  The central pieces are
//!   the [`domain::catalog::StateCatalog`] (the startup-loaded table mapping
//!   logical state names to destinations) and the destination resolver that
//!   turns a `(state, params)` pair into a [`domain::resolver::RenderTarget`].
//!
//! - **`protocol`** – The JSON command frames the upstream controller sends
//!   over the WebSocket link, modelled as a closed tagged enum with an
//!   explicit unknown-type branch.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kiosk_core::StateCatalog` instead of `kiosk_core::domain::catalog::StateCatalog`.
pub use domain::catalog::{
    CatalogEntry, CatalogError, CatalogTarget, StateCatalog, StateParams, StateSpec, SPLASH_TARGET,
};
pub use domain::resolver::{RenderTarget, UnknownStateError};
pub use protocol::commands::{parse_frame, FrameError, ParsedFrame, UpstreamCommand};
