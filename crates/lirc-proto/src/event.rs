//! Event types shared between the daemon protocol and its clients.
//!
//! The daemon broadcasts one line per button press in the format
//!
//! ```text
//! <scancode> <repeat> <button> <remote>
//! ```
//!
//! where `scancode` is the 64-bit code in hex and `repeat` is a hex counter
//! that is zero for the initial press and increments while the button is
//! held. Example:
//!
//! ```text
//! 0000000000f40bf0 00 KEY_UP ANIMAX
//! ```

use serde::{Deserialize, Serialize};

/// A decoded button event as broadcast by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// 64-bit scancode reported by the receiver.
    pub scancode: u64,
    /// Repeat counter; zero for the initial press.
    pub repeat: u32,
    /// Button name from the remote definition, e.g. `KEY_UP`.
    pub button: String,
    /// Name of the remote the button belongs to.
    pub remote: String,
}

impl ButtonEvent {
    #[must_use]
    pub fn new(
        scancode: u64,
        repeat: u32,
        button: impl Into<String>,
        remote: impl Into<String>,
    ) -> Self {
        Self {
            scancode,
            repeat,
            button: button.into(),
            remote: remote.into(),
        }
    }

    /// True for the initial press of a button, false for auto-repeats.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.repeat == 0
    }
}

impl std::str::FromStr for ButtonEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let &[scancode, repeat, button, remote] = fields.as_slice() else {
            return Err(ParseEventError::FieldCount(fields.len()));
        };

        let scancode =
            u64::from_str_radix(scancode, 16).map_err(|source| ParseEventError::Scancode {
                value: scancode.to_string(),
                source,
            })?;
        let repeat =
            u32::from_str_radix(repeat, 16).map_err(|source| ParseEventError::Repeat {
                value: repeat.to_string(),
                source,
            })?;

        Ok(Self {
            scancode,
            repeat,
            button: button.to_string(),
            remote: remote.to_string(),
        })
    }
}

impl std::fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:016x} {:02x} {} {}",
            self.scancode, self.repeat, self.button, self.remote
        )
    }
}

/// Errors from decoding a broadcast line as a [`ButtonEvent`]
#[derive(Debug, thiserror::Error)]
pub enum ParseEventError {
    #[error("Expected 4 fields, got {0}")]
    FieldCount(usize),

    #[error("Invalid scancode {value:?}: {source}")]
    Scancode {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("Invalid repeat count {value:?}: {source}")]
    Repeat {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Delivery mode for broadcast lines, fixed when a session is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Deliver only lines that decode as a [`ButtonEvent`].
    #[default]
    Normal,
    /// Deliver every line verbatim, followed by the decoded event when the
    /// line also parses.
    Raw,
}

/// Payload delivered to data listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteEvent {
    /// A broadcast line that decoded as a button event.
    Decoded(ButtonEvent),
    /// A verbatim broadcast line, delivered in [`Mode::Raw`].
    Raw { line: String },
}

impl RemoteEvent {
    /// The decoded event, if this payload carries one.
    #[must_use]
    pub fn as_decoded(&self) -> Option<&ButtonEvent> {
        match self {
            Self::Decoded(event) => Some(event),
            Self::Raw { .. } => None,
        }
    }
}

/// Why a connection ended, delivered to closed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The session owner closed the connection.
    Requested,
    /// The daemon shut the connection down cleanly.
    DaemonClosed,
    /// The connection failed mid-stream.
    ConnectionLost,
}
