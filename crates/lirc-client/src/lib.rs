//! Session client for the lircd infrared-remote daemon.
//!
//! This crate provides a resilient connection manager for the daemon's
//! Unix-socket interface: configuration files are registered at connect
//! time, decoded button events are fanned out to listeners, and close
//! semantics are explicit and idempotent.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: Session configuration and construction rules
//! - [`session`]: Connect/close lifecycle and the reader task
//! - [`error`]: Unified client error type
//!
//! Event dispatch runs on an internal task; register listeners with
//! [`Session::on_data`] and [`Session::on_closed`] before or after
//! connecting.
//!
//! # Example
//!
//! ```no_run
//! use lirc_client::{Session, SessionConfig};
//!
//! # async fn example() -> lirc_client::Result<()> {
//! let config = SessionConfig::new("living-room")
//!     .with_config_path("/etc/lirc/tv.lircrc");
//! let mut session = Session::new(config)?;
//!
//! session.on_data(|event| println!("button: {event:?}"));
//! session.on_closed(|reason| println!("closed: {reason:?}"));
//!
//! session.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod dispatch;
pub mod error;
pub mod session;

// Re-export main session types
pub use config::{MAX_CONFIG_PATHS, SessionConfig};
pub use session::{DEFAULT_SOCKET_PATH, Session, socket_path};

// Re-export error types
pub use error::{ClientError, Result};

// Re-export commonly used wire types from lirc-proto
pub use lirc_proto::{ButtonEvent, CloseReason, Mode, RemoteEvent};
