//! Registration messages and daemon reply classification.
//!
//! The daemon protocol is line-oriented text. At connect time the client
//! sends one registration line per configuration file:
//!
//! ```text
//! REGISTER <path>
//! ```
//!
//! The daemon answers each registration with `OK` or `ERROR <reason>`, in
//! order, then broadcasts event lines for the lifetime of the connection.

/// Keyword opening a registration line.
pub const REGISTER_KEYWORD: &str = "REGISTER";

/// Positive registration reply.
pub const OK_REPLY: &str = "OK";

/// Keyword opening a negative registration reply.
pub const ERROR_REPLY: &str = "ERROR";

/// Lines sent from the client to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Ask the daemon to load a configuration file for this connection.
    Register { path: String },
}

impl ClientMessage {
    #[must_use]
    pub fn register(path: impl Into<String>) -> Self {
        Self::Register { path: path.into() }
    }
}

impl std::fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register { path } => write!(f, "{REGISTER_KEYWORD} {path}"),
        }
    }
}

/// Lines received from the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonMessage {
    /// Positive reply to the oldest unanswered registration line.
    ReplyOk,
    /// Negative reply to the oldest unanswered registration line.
    ReplyError { reason: String },
    /// A broadcast event line.
    Broadcast { line: String },
}

impl DaemonMessage {
    /// Classify one received line.
    ///
    /// Replies are exact keyword matches; every other line is a broadcast.
    /// Replies only carry meaning during the registration exchange.
    #[must_use]
    pub fn classify(line: String) -> Self {
        if line == OK_REPLY {
            Self::ReplyOk
        } else if line == ERROR_REPLY {
            Self::ReplyError {
                reason: String::new(),
            }
        } else if let Some(reason) = line
            .strip_prefix(ERROR_REPLY)
            .and_then(|rest| rest.strip_prefix(' '))
        {
            Self::ReplyError {
                reason: reason.to_string(),
            }
        } else {
            Self::Broadcast { line }
        }
    }
}
