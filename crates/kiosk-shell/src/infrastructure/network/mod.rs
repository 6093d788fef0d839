//! Network infrastructure for the kiosk shell.
//!
//! # Sub-modules
//!
//! - **`control_server`** – Loopback HTTP API translating POST requests into
//!   display-controller calls.  Trusted local network only: permissive CORS,
//!   no authentication, bound to 127.0.0.1.
//!
//! - **`upstream_link`** – Persistent outbound WebSocket connection to the
//!   remote controller, with exponential-backoff reconnection.  Absent
//!   configuration the component is a true no-op: no socket, no retry loop.

pub mod control_server;
pub mod upstream_link;

pub use control_server::{build_router, run_control_server};
pub use upstream_link::{run_upstream_link, ReconnectBackoff};
