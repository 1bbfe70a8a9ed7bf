//! Listener registry and the dispatcher task.
//!
//! Handlers are plain `FnMut` callbacks owned by the session and shared
//! with the dispatcher task of the live connection. The registry outlives
//! any one connection, so listeners registered once keep firing across
//! reconnects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use lirc_proto::{CloseReason, RemoteEvent};

pub(crate) type DataHandler = Box<dyn FnMut(&RemoteEvent) + Send>;
pub(crate) type ClosedHandler = Box<dyn FnMut(CloseReason) + Send>;

/// Ordered listener registry shared between a session and its dispatcher.
#[derive(Default)]
pub(crate) struct Listeners {
    pub data: Vec<DataHandler>,
    pub closed: Vec<ClosedHandler>,
}

/// Lock the registry. A panicked handler poisons the lock; dispatch
/// recovers the guard and keeps delivering.
pub(crate) fn lock_listeners(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Message from the reader task to the dispatcher task.
#[derive(Debug)]
pub(crate) enum LoopEvent {
    Data(RemoteEvent),
    Closed(CloseReason),
}

/// Dispatcher loop for one connection.
///
/// Delivers data payloads in listener registration order while the delivery
/// gate is open, fires the closed listeners exactly once, then exits. The
/// reader task sends `Closed` as its final message, so the loop ends with
/// the connection.
pub(crate) async fn run_dispatcher(
    mut events: mpsc::UnboundedReceiver<LoopEvent>,
    listeners: Arc<Mutex<Listeners>>,
    gate: Arc<AtomicBool>,
    session: String,
) {
    while let Some(event) = events.recv().await {
        match event {
            LoopEvent::Data(payload) => {
                // Gate check and delivery share the registry lock; close()
                // shuts the gate and then takes this lock, so no data
                // handler runs after close() returns.
                let mut listeners = lock_listeners(&listeners);
                if !gate.load(Ordering::Acquire) {
                    trace!(session = %session, "dropping event received after close");
                    continue;
                }
                for handler in &mut listeners.data {
                    handler(&payload);
                }
            }
            LoopEvent::Closed(reason) => {
                debug!(session = %session, ?reason, "dispatching close");
                let mut listeners = lock_listeners(&listeners);
                for handler in &mut listeners.closed {
                    handler(reason);
                }
                return;
            }
        }
    }
}
