//! Storage infrastructure: configuration file persistence.
//!
//! This module is the only part of the shell that touches the file system.
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate
//!   directory (or a path given on the command line).
//! - Providing sensible defaults when the file does not exist yet, so a
//!   first run with no configuration comes up on the splash screen.
//! - Writing a default file back to disk for the operator to edit.
//!
//! Keeping storage concerns here means the config file format can change
//! without touching the controller or the network layers.

pub mod config;

pub use config::{AppConfig, ConfigError};
