//! Connectivity and lifecycle flags shared between the session and its
//! client context.

use std::sync::atomic::{AtomicBool, Ordering};

/// Session lifecycle tracking.
///
/// # Memory Ordering
///
/// All atomic operations use `SeqCst`. The flags gate control flow (a closed
/// session must reject sends on every thread immediately), and the cost is
/// irrelevant next to a network round trip.
#[derive(Debug)]
pub struct SessionState {
    /// Whether the cluster was reachable at the last observation
    connected: AtomicBool,
    /// Set once by the first `close()`
    closed: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Connected and not yet closed.
    pub fn is_connected(&self) -> bool {
        !self.is_closed() && self.connected.load(Ordering::SeqCst)
    }

    /// Mark the session closed.
    ///
    /// Returns `true` only for the call that performed the transition, so the
    /// caller knows whether it owns the shutdown work.
    pub fn mark_closed(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            self.connected.store(false, Ordering::SeqCst);
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
