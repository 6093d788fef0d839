//! Protocol module containing the upstream command frame types.

pub mod commands;

pub use commands::{parse_frame, FrameError, ParsedFrame, UpstreamCommand};
