//! Session configuration.

use std::path::PathBuf;

use lirc_proto::Mode;

use crate::error::{ClientError, Result};

/// Most configuration files one session may register.
pub const MAX_CONFIG_PATHS: usize = 20;

/// Configuration for a daemon session.
///
/// Built with [`SessionConfig::new`] and the `with_*` methods:
///
/// ```
/// use lirc_client::{Mode, SessionConfig};
///
/// let config = SessionConfig::new("living-room")
///     .with_mode(Mode::Raw)
///     .with_config_path("/etc/lirc/tv.lircrc")
///     .with_config_path("/etc/lirc/amp.lircrc");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session identifier, used in log output. Never sent to the daemon.
    pub name: String,
    /// Delivery mode for broadcast lines.
    pub mode: Mode,
    /// Configuration files to register at connect time, in order.
    pub config_paths: Vec<String>,
    /// Daemon socket override; `None` resolves via [`crate::socket_path`].
    pub socket_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Create a configuration with the given session name, [`Mode::Normal`],
    /// and no configuration files.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::default(),
            config_paths: Vec::new(),
            socket_path: None,
        }
    }

    /// Set the delivery mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Append one configuration file path.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    /// Append several configuration file paths.
    #[must_use]
    pub fn with_config_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Override the daemon socket path.
    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    /// Check the configuration against the construction rules.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::EmptyName` when the name is empty,
    /// `ClientError::InvalidConfigPath` when a path contains a line break,
    /// and `ClientError::TooManyConfigs` when more than [`MAX_CONFIG_PATHS`]
    /// paths are configured. Path existence is not checked; the daemon
    /// reports unusable configs at registration time.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ClientError::EmptyName);
        }
        if self.config_paths.len() > MAX_CONFIG_PATHS {
            return Err(ClientError::TooManyConfigs(self.config_paths.len()));
        }
        if let Some(path) = self
            .config_paths
            .iter()
            .find(|path| path.contains('\n') || path.contains('\r'))
        {
            return Err(ClientError::InvalidConfigPath(path.clone()));
        }
        Ok(())
    }
}
