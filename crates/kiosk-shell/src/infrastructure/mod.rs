//! Infrastructure layer for the kiosk shell.
//!
//! Contains the I/O-facing adapters: the loopback HTTP control server, the
//! upstream WebSocket link client, configuration file persistence, and the
//! window-host seam behind which the excluded GUI runtime lives.

pub mod network;
pub mod storage;
pub mod window_host;
