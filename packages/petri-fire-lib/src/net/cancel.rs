use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::net::{NetState, Place};

/// Cooperative cancellation for blocking `fire` calls.
///
/// A token is created from the net whose waiters it interrupts (see
/// `PetriNet::cancel_token`); clones share the cancelled flag, so workers
/// can hold one clone each while a controller cancels through another.
#[derive(Debug, Clone)]
pub struct CancelToken<P: Place> {
    state: Arc<NetState<P>>,
    cancelled: Arc<AtomicBool>,
}

impl<P: Place> CancelToken<P> {
    pub(crate) fn new(state: Arc<NetState<P>>) -> Self {
        CancelToken {
            state,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancels every pending and future wait observing this token.
    /// Idempotent.
    ///
    /// Waiters are woken with a broadcast so the cancelled ones cannot be
    /// missed; waiters holding a different token re-test their transitions
    /// and simply wait again.
    pub fn cancel(&self) {
        // flag and notify must go out under the net's lock: a waiter tests
        // the flag while holding it and only releases inside the condition
        // wait, so an unlocked store-then-notify can slip between the test
        // and the wait and leave the waiter sleeping through its own
        // cancellation
        let _marking = self.state.marking.lock();
        self.cancelled.store(true, Ordering::SeqCst);
        self.state.enabled_changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
