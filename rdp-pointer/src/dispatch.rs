//! Cross-thread hand-off of pointer requests.
//!
//! The protocol thread posts [`PointerEvent`]s through a [`PointerSender`];
//! the UI thread drains them from the matching [`PointerReceiver`] and is the
//! only place native cursor state is touched.
//!
//! Posting never blocks and never waits for the UI thread. Events from one
//! sender are delivered in the order they were posted. An optional waker is
//! called after each post so a UI loop sleeping on OS events can be nudged
//! (for example through an event-loop proxy).

use crate::errors::PointerError;
use crate::shape::{PointerId, PointerRef};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

/// A pending pointer change for the UI thread.
#[derive(Debug, Clone)]
pub enum PointerEvent {
    /// Install the platform default cursor.
    Default,

    /// Hide the cursor.
    Null,

    /// Install a remote pointer shape.
    Set(PointerRef),

    /// Move the pointer to a position in session coordinates.
    Position {
        /// X coordinate in session pixels.
        x: u32,
        /// Y coordinate in session pixels.
        y: u32,
    },

    /// The protocol layer no longer needs this shape.
    Release(PointerId),
}

impl fmt::Display for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Null => write!(f, "Null"),
            Self::Set(pointer) => write!(f, "Set({})", pointer.id()),
            Self::Position { x, y } => write!(f, "Position({}, {})", x, y),
            Self::Release(id) => write!(f, "Release({})", id),
        }
    }
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Create a connected sender/receiver pair.
pub fn pointer_channel() -> (PointerSender, PointerReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let alive = Arc::new(());
    let senders = Arc::downgrade(&alive);
    (
        PointerSender {
            tx,
            waker: None,
            _alive: alive,
        },
        PointerReceiver { rx, senders },
    )
}

/// Producer half, owned by the protocol thread.
#[derive(Clone)]
pub struct PointerSender {
    tx: Sender<PointerEvent>,
    waker: Option<Waker>,
    // one strong count per live sender
    _alive: Arc<()>,
}

impl PointerSender {
    /// Call `waker` after every posted event.
    #[must_use]
    pub fn with_waker<F>(mut self, waker: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Post an event. Fails only if the receiver has been dropped.
    pub fn send(&self, event: PointerEvent) -> Result<(), PointerError> {
        trace!("Posting pointer event {}", event);
        self.tx.send(event).map_err(|_| PointerError::Disconnected)?;
        if let Some(waker) = &self.waker {
            waker();
        }
        Ok(())
    }

    /// Request the platform default cursor.
    pub fn set_default(&self) -> Result<(), PointerError> {
        self.send(PointerEvent::Default)
    }

    /// Request a hidden cursor.
    pub fn set_null(&self) -> Result<(), PointerError> {
        self.send(PointerEvent::Null)
    }

    /// Request `pointer` as the active cursor.
    pub fn set(&self, pointer: PointerRef) -> Result<(), PointerError> {
        self.send(PointerEvent::Set(pointer))
    }

    /// Request a pointer move to session coordinates `(x, y)`.
    pub fn set_position(&self, x: u32, y: u32) -> Result<(), PointerError> {
        self.send(PointerEvent::Position { x, y })
    }

    /// Tell the UI thread that `id` is no longer needed.
    pub fn release(&self, id: PointerId) -> Result<(), PointerError> {
        self.send(PointerEvent::Release(id))
    }
}

impl fmt::Debug for PointerSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerSender")
            .field("pending", &self.tx.len())
            .field("has_waker", &self.waker.is_some())
            .finish()
    }
}

/// Consumer half, owned by the UI thread.
#[derive(Debug)]
pub struct PointerReceiver {
    rx: Receiver<PointerEvent>,
    senders: Weak<()>,
}

impl PointerReceiver {
    /// Take the next pending event, if any.
    pub fn try_recv(&self) -> Option<PointerEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or once every sender is gone and the queue
    /// is empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PointerEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Iterate over the events pending right now, in posting order.
    pub fn drain(&self) -> impl Iterator<Item = PointerEvent> + '_ {
        self.rx.try_iter()
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True if no events are waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// True once every sender has been dropped and the queue is drained.
    pub fn is_disconnected(&self) -> bool {
        self.senders.strong_count() == 0 && self.rx.is_empty()
    }
}
