//! JSON command frames for the upstream controller link.
//!
//! The remote controller pushes one JSON object per WebSocket text frame.
//! Every frame carries a `"type"` field that identifies the command; all
//! other fields sit in the same object:
//!
//! ```json
//! {"type":"state","state":"carescape","params":{"roomId":"42"}}
//! {"type":"inSession","params":{"roomId":"42"}}
//! {"type":"navigate","url":"https://example.com"}
//! {"type":"splash"}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles the discriminant.
//! Additive fields on a known type are ignored; there is no versioning or
//! authentication beyond the discriminant.
//!
//! # Unknown types are data, not errors
//!
//! A frame whose `type` the shell does not recognise must be logged and
//! dropped without closing the connection.  [`parse_frame`] therefore
//! returns a [`ParsedFrame`] with an explicit [`ParsedFrame::Unknown`]
//! branch rather than coercing unknown types into a deserialization error —
//! the "log and drop" path stays reachable and testable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::StateParams;

/// Command types the shell understands, including the `in-session` spelling
/// some controllers send.
const KNOWN_TYPES: &[&str] = &[
    "state",
    "navigate",
    "splash",
    "screensaver",
    "carescape",
    "inSession",
    "in-session",
    "goodbye",
];

/// All commands the upstream controller can send over the link.
///
/// The shortcut variants (`screensaver`, `carescape`, ...) are convenience
/// forms of `state` with the state name folded into the discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpstreamCommand {
    /// Transition to `state` with optional parameters.
    #[serde(rename = "state")]
    State {
        state: String,
        #[serde(default)]
        params: StateParams,
    },

    /// Legacy: navigate straight to a URL, bypassing the catalog.
    #[serde(rename = "navigate")]
    Navigate { url: String },

    /// Legacy: return to the local splash screen.
    #[serde(rename = "splash")]
    Splash,

    /// Shortcut for `state: "screensaver"` (never parameterized).
    #[serde(rename = "screensaver")]
    Screensaver,

    /// Shortcut for `state: "carescape"`.
    #[serde(rename = "carescape")]
    Carescape {
        #[serde(default)]
        params: StateParams,
    },

    /// Shortcut for `state: "inSession"`; both spellings are accepted.
    #[serde(rename = "inSession", alias = "in-session")]
    InSession {
        #[serde(default)]
        params: StateParams,
    },

    /// Shortcut for `state: "goodbye"`.
    #[serde(rename = "goodbye")]
    Goodbye {
        #[serde(default)]
        params: StateParams,
    },
}

/// Outcome of parsing one well-formed JSON frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFrame {
    /// A recognised command, ready for dispatch.
    Command(UpstreamCommand),
    /// A well-formed frame with an unrecognised `type`.  The caller logs the
    /// type name and drops the frame.
    Unknown { message_type: String },
}

/// Errors for frames that cannot be interpreted at all.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame text is not valid JSON, or a recognised command is missing
    /// a required field (e.g. `navigate` without `url`).
    #[error("malformed command frame: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame parsed but is not a JSON object.
    #[error("command frame is not a JSON object")]
    NotAnObject,

    /// The frame object has no string `"type"` field.
    #[error("command frame has no \"type\" field")]
    MissingType,
}

/// Parses one inbound text frame.
///
/// # Errors
///
/// Returns [`FrameError`] for text that is not a JSON object with a string
/// `type`, or for a recognised type whose payload is missing a required
/// field.  Unknown types are not errors; they come back as
/// [`ParsedFrame::Unknown`].
pub fn parse_frame(text: &str) -> Result<ParsedFrame, FrameError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let object = value.as_object().ok_or(FrameError::NotAnObject)?;
    let message_type = object
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(FrameError::MissingType)?;

    if !KNOWN_TYPES.contains(&message_type) {
        return Ok(ParsedFrame::Unknown {
            message_type: message_type.to_string(),
        });
    }

    let command = UpstreamCommand::deserialize(&value)?;
    Ok(ParsedFrame::Command(command))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
