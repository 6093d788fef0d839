//! kiosk-shell library crate.
//!
//! The kiosk shell displays remote web content full-screen on a dedicated
//! device and takes orders from two directions: a loopback HTTP control API
//! for tools on the same machine, and a persistent outbound WebSocket link
//! to a remote controller.  Both feed the same display controller, which
//! resolves logical states to destinations and drives the window host that
//! does the actual rendering.
//!
//! # Architecture
//!
//! ```text
//! remote controller (JSON over WebSocket)     local tools (HTTP, loopback)
//!             ↕                                        ↕
//!   infrastructure/network/upstream_link     infrastructure/network/control_server
//!             └──────────────┬────────────────────────┘
//!                 application/display_controller
//!                            │  (kiosk-core: catalog + resolver)
//!                 infrastructure/window_host
//!                            │
//!                   GUI runtime (out of scope)
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `kiosk-core` and the `WindowHost` trait only.
//! - `infrastructure` depends on everything plus `tokio`, `axum`, and
//!   `tungstenite`; it is never imported by `application`, with the one
//!   deliberate exception of the `window_host` trait module, which is the
//!   seam the controller drives.

pub mod application;
pub mod infrastructure;
