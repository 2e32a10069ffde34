//! Tick scheduling
//!
//! A scheduled tick is identified by a [`TickHandle`]. When it fires, the
//! handle is delivered back to whoever drives the controller, which can then
//! tell a live tick from one that was cancelled in the meantime.

use std::{collections::HashMap, fmt, time::Duration};

use tokio::{sync::mpsc, task::AbortHandle, time::sleep};
use tracing::{debug, trace};

/// Identity of one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick#{}", self.0)
    }
}

/// Runs a tick once, either as soon as possible or after a delay
pub trait Scheduler {
    fn post(&mut self) -> TickHandle;

    fn post_delayed(&mut self, delay: Duration) -> TickHandle;

    /// Remove a pending tick. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler backed by the tokio timer.
///
/// Each posted tick is a small task that sleeps and then sends its handle on
/// the fired channel. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    fired_tx: mpsc::UnboundedSender<TickHandle>,
    pending: HashMap<TickHandle, AbortHandle>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its fired ticks are delivered to
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            fired_tx,
            pending: HashMap::new(),
        };
        (scheduler, fired_rx)
    }

    /// Number of ticks that have been posted but have neither fired nor been cancelled
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|task| !task.is_finished()).count()
    }

    fn spawn(&mut self, delay: Option<Duration>) -> TickHandle {
        self.pending.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        let fired_tx = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if fired_tx.send(handle).is_err() {
                trace!("Tick receiver dropped before {} fired", handle);
            }
        });

        self.pending.insert(handle, task.abort_handle());
        handle
    }
}

impl Scheduler for TokioScheduler {
    fn post(&mut self) -> TickHandle {
        let handle = self.spawn(None);
        trace!("Posted {}", handle);
        handle
    }

    fn post_delayed(&mut self, delay: Duration) -> TickHandle {
        let handle = self.spawn(Some(delay));
        trace!("Posted {} in {:?}", handle, delay);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.pending.remove(&handle) {
            task.abort();
            debug!("Cancelled {}", handle);
        }
    }
}
