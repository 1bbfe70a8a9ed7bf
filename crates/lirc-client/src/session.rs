//! The daemon session: connect/close lifecycle and the reader task.
//!
//! A [`Session`] owns one connection to the daemon at a time. Connecting
//! registers the configured files and spawns two tasks: a reader that owns
//! the socket and a dispatcher that fans events out to listeners. Closing
//! signals the reader, waits for it to release the socket, and leaves the
//! session ready to connect again.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use lirc_proto::{
    ButtonEvent, ClientMessage, CloseReason, DaemonMessage, Mode, RemoteEvent, WireCodec,
};

use crate::config::SessionConfig;
use crate::dispatch::{self, Listeners, LoopEvent, lock_listeners};
use crate::error::{ClientError, Result};

/// Default daemon socket location.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/lirc/lircd";

/// How long to wait for each registration reply.
const REGISTER_TIMEOUT: Duration = Duration::from_secs(10);

/// Get the daemon socket path.
///
/// Honors the `LIRCD_SOCKET` environment variable, falling back to
/// [`DEFAULT_SOCKET_PATH`].
#[must_use]
pub fn socket_path() -> PathBuf {
    std::env::var("LIRCD_SOCKET").map_or_else(|_| PathBuf::from(DEFAULT_SOCKET_PATH), PathBuf::from)
}

/// State of one connection generation.
///
/// Every `connect()` builds a fresh one, so tasks left over from an earlier
/// connection can never touch the current state.
struct Connection {
    connected: Arc<AtomicBool>,
    gate: Arc<AtomicBool>,
    close_tx: Option<oneshot::Sender<()>>,
    reader: Option<JoinHandle<()>>,
}

impl Drop for Connection {
    // Non-blocking half of close(); the tasks wind down on their own.
    fn drop(&mut self) {
        self.gate.store(false, Ordering::Release);
        self.connected.store(false, Ordering::Release);
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A session with the infrared-remote daemon.
///
/// ```no_run
/// use lirc_client::{Session, SessionConfig};
///
/// # async fn example() -> lirc_client::Result<()> {
/// let config = SessionConfig::new("living-room")
///     .with_config_path("/etc/lirc/tv.lircrc");
/// let mut session = Session::new(config)?;
///
/// session.on_data(|event| println!("button: {event:?}"));
/// session.on_closed(|reason| println!("closed: {reason:?}"));
///
/// session.connect().await?;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    config: SessionConfig,
    listeners: Arc<Mutex<Listeners>>,
    conn: Option<Connection>,
}

impl Session {
    /// Create a disconnected session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a construction error when the configuration violates the
    /// rules checked by [`SessionConfig::validate`].
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            listeners: Arc::new(Mutex::new(Listeners::default())),
            conn: None,
        })
    }

    /// Session name, as configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Delivery mode, fixed at construction.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Configuration files registered at connect time, in order.
    #[must_use]
    pub fn config_paths(&self) -> &[String] {
        &self.config.config_paths
    }

    /// Whether the session currently holds a live connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn
            .as_ref()
            .is_some_and(|conn| conn.connected.load(Ordering::Acquire))
    }

    /// Register a data listener.
    ///
    /// Listeners run on the dispatcher task in registration order and
    /// survive reconnects.
    pub fn on_data<F>(&self, handler: F)
    where
        F: FnMut(&RemoteEvent) + Send + 'static,
    {
        lock_listeners(&self.listeners).data.push(Box::new(handler));
    }

    /// Register a closed listener.
    ///
    /// Fired exactly once per connection teardown, whether requested locally
    /// or initiated by the daemon.
    pub fn on_closed<F>(&self, handler: F)
    where
        F: FnMut(CloseReason) + Send + 'static,
    {
        lock_listeners(&self.listeners)
            .closed
            .push(Box::new(handler));
    }

    /// Connect to the daemon and register the configured files.
    ///
    /// A no-op when already connected. On any failure the partial connection
    /// is dropped, the session stays disconnected, and no close is
    /// dispatched.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` when the socket cannot be reached,
    /// `ClientError::Rejected` when the daemon refuses a configuration file,
    /// `ClientError::Timeout` when a registration reply does not arrive in
    /// time, and `ClientError::Protocol` or `ClientError::ConnectionClosed`
    /// when the daemon misbehaves during registration.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!(session = %self.config.name, "connect on connected session, ignoring");
            return Ok(());
        }

        let path = self.config.socket_path.clone().unwrap_or_else(socket_path);
        debug!(session = %self.config.name, path = %path.display(), "connecting to daemon");
        let stream = UnixStream::connect(&path).await?;
        let mut framed = Framed::new(stream, WireCodec::new());

        for config_path in &self.config.config_paths {
            framed.send(ClientMessage::register(config_path)).await?;

            let reply = tokio::time::timeout(REGISTER_TIMEOUT, framed.next())
                .await
                .map_err(|_| ClientError::Timeout)?;

            match reply {
                Some(Ok(DaemonMessage::ReplyOk)) => {
                    trace!(session = %self.config.name, path = %config_path, "config registered");
                }
                Some(Ok(DaemonMessage::ReplyError { reason })) => {
                    return Err(ClientError::Rejected {
                        path: config_path.clone(),
                        reason,
                    });
                }
                Some(Ok(DaemonMessage::Broadcast { line })) => {
                    return Err(ClientError::Protocol(format!(
                        "expected registration reply, got {line:?}"
                    )));
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ClientError::ConnectionClosed),
            }
        }

        let connected = Arc::new(AtomicBool::new(true));
        let gate = Arc::new(AtomicBool::new(true));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        tokio::spawn(dispatch::run_dispatcher(
            event_rx,
            self.listeners.clone(),
            gate.clone(),
            self.config.name.clone(),
        ));
        let reader = tokio::spawn(read_loop(
            framed,
            self.config.mode,
            connected.clone(),
            event_tx,
            close_rx,
            self.config.name.clone(),
        ));

        self.conn = Some(Connection {
            connected,
            gate,
            close_tx: Some(close_tx),
            reader: Some(reader),
        });

        info!(session = %self.config.name, path = %path.display(), "connected to daemon");
        Ok(())
    }

    /// Close the connection.
    ///
    /// Idempotent; a no-op when disconnected. No data listener fires after
    /// this returns, the socket is released before this returns, and the
    /// closed listeners fire exactly once (possibly racing the return).
    pub async fn close(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            trace!(session = %self.config.name, "close on disconnected session, ignoring");
            return;
        };

        conn.gate.store(false, Ordering::Release);
        conn.connected.store(false, Ordering::Release);
        // The dispatcher delivers under the registry lock, so taking it
        // here waits out a delivery already in flight; later deliveries
        // observe the shut gate.
        drop(lock_listeners(&self.listeners));
        if let Some(tx) = conn.close_tx.take() {
            let _ = tx.send(());
        }
        if let Some(reader) = conn.reader.take() {
            if let Err(e) = reader.await {
                warn!(session = %self.config.name, error = %e, "reader task failed during close");
            }
        }

        debug!(session = %self.config.name, "session closed");
    }
}

/// Reader loop for one connection.
///
/// Owns the framed socket. Exits on the close signal, daemon EOF, or a
/// stream error, committing the disconnected state and reporting exactly
/// one close to the dispatcher.
async fn read_loop(
    mut framed: Framed<UnixStream, WireCodec>,
    mode: Mode,
    connected: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<LoopEvent>,
    mut close_rx: oneshot::Receiver<()>,
    session: String,
) {
    let reason = loop {
        tokio::select! {
            _ = &mut close_rx => break CloseReason::Requested,
            frame = framed.next() => match frame {
                Some(Ok(DaemonMessage::Broadcast { line })) => {
                    forward_line(mode, line, &events, &session);
                }
                Some(Ok(reply)) => {
                    warn!(session = %session, ?reply, "ignoring reply outside registration");
                }
                Some(Err(e)) => {
                    warn!(session = %session, error = %e, "read failed");
                    break CloseReason::ConnectionLost;
                }
                None => {
                    debug!(session = %session, "daemon closed the connection");
                    break CloseReason::DaemonClosed;
                }
            },
        }
    };

    connected.store(false, Ordering::Release);
    let _ = events.send(LoopEvent::Closed(reason));
}

/// Decode one broadcast line per the session mode and forward the payloads.
fn forward_line(mode: Mode, line: String, events: &mpsc::UnboundedSender<LoopEvent>, session: &str) {
    match mode {
        Mode::Normal => match line.parse::<ButtonEvent>() {
            Ok(event) => {
                let _ = events.send(LoopEvent::Data(RemoteEvent::Decoded(event)));
            }
            Err(e) => {
                debug!(session = %session, error = %e, line = %line, "dropping undecodable line");
            }
        },
        Mode::Raw => {
            let decoded = line.parse::<ButtonEvent>().ok();
            let _ = events.send(LoopEvent::Data(RemoteEvent::Raw { line }));
            if let Some(event) = decoded {
                let _ = events.send(LoopEvent::Data(RemoteEvent::Decoded(event)));
            }
        }
    }
}
