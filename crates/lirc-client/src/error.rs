//! Error types for the client crate.
//!
//! This module provides a unified error type for session construction and
//! connection establishment. Failures after a connection is up are never
//! surfaced as errors; they arrive through the closed listeners.

use lirc_proto::CodecError;

use crate::config::MAX_CONFIG_PATHS;

/// Unified error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Session name must not be empty")]
    EmptyName,

    #[error("Config path {0:?} contains a line break")]
    InvalidConfigPath(String),

    #[error("Too many config paths: {0} (max: {MAX_CONFIG_PATHS})")]
    TooManyConfigs(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Daemon rejected config {path:?}: {reason}")]
    Rejected { path: String, reason: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Registration timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, ClientError>;
