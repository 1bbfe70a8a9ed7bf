//! Wire protocol for the lircd Unix-socket interface.
//!
//! This crate provides the event types, line classification, and transport
//! codec for talking to an infrared-remote daemon over a stream socket.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`event`]: Decoded button events, delivery modes, and close reasons
//! - [`protocol`]: Registration messages and daemon reply classification
//! - [`transport`]: Newline-delimited codec for line framing
//!
//! # Example
//!
//! ```
//! use lirc_proto::ButtonEvent;
//!
//! let event: ButtonEvent = "0000000000f40bf0 00 KEY_UP ANIMAX".parse()?;
//! assert_eq!(event.button, "KEY_UP");
//! assert_eq!(event.repeat, 0);
//! # Ok::<(), lirc_proto::ParseEventError>(())
//! ```

pub mod event;
pub mod protocol;
pub mod transport;

// Re-export event types
pub use event::{ButtonEvent, CloseReason, Mode, ParseEventError, RemoteEvent};

// Re-export protocol types
pub use protocol::{ClientMessage, DaemonMessage, ERROR_REPLY, OK_REPLY, REGISTER_KEYWORD};

// Re-export transport types
pub use transport::{CodecError, WireCodec};
