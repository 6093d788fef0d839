//! Domain entities for the kiosk shell.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: the logical-state catalog and the destination resolver.
//! Code in outer layers (the HTTP control server, the upstream link client,
//! the display controller) depends on this module, never the other way
//! around, so everything here can be unit-tested without any setup.

/// Logical-state catalog — the startup-loaded table of states.
///
/// See [`catalog::StateCatalog`] for the main type.
pub mod catalog;

/// Destination resolution — `(state, params)` → concrete render target.
pub mod resolver;
