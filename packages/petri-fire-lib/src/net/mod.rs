use std::{fmt::Debug, hash::Hash, sync::Arc};

use parking_lot::{Condvar, Mutex, MutexGuard};

pub mod cancel;
pub mod marking;
pub mod reach;
pub mod transition;

pub use cancel::CancelToken;
pub use marking::Marking;
pub use transition::Transition;

/// Opaque place identifier. The engine never looks inside a place value;
/// it only clones, compares and hashes it.
pub trait Place: Debug + Clone + PartialEq + Eq + Hash {}

impl<T> Place for T where T: Debug + Clone + PartialEq + Eq + Hash {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireError {
    /// The blocking wait was interrupted through the supplied token.
    /// Nothing fired and the marking is unchanged.
    Cancelled,
}

impl std::fmt::Display for FireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FireError::Cancelled => {
                write!(f, "fire was cancelled before a transition became enabled")
            }
        }
    }
}

impl std::error::Error for FireError {}

#[derive(Debug)]
pub(crate) struct NetState<P: Place> {
    pub(crate) marking: Mutex<Marking<P>>,
    pub(crate) enabled_changed: Condvar,
}

/// A Petri net: one marking guarded by one lock, shared by every thread
/// that fires on the net.
///
/// All enabling checks and all marking mutations happen inside the same
/// critical section, so a transition observed as enabled is fired against
/// exactly the marking it was checked on.
#[derive(Debug)]
pub struct PetriNet<P: Place> {
    state: Arc<NetState<P>>,
    fair: bool,
}

impl<P: Place> PetriNet<P> {
    /// Creates a net holding `initial`. With `fair` set, the lock is handed
    /// off FIFO to queued threads on release; otherwise the default unfair
    /// hand-off applies.
    pub fn new(initial: Marking<P>, fair: bool) -> Self {
        PetriNet {
            state: Arc::new(NetState {
                marking: Mutex::new(initial),
                enabled_changed: Condvar::new(),
            }),
            fair,
        }
    }

    /// A consistent snapshot of the current marking.
    pub fn marking(&self) -> Marking<P> {
        let guard = self.state.marking.lock();
        let snapshot = guard.clone();
        self.release(guard);
        snapshot
    }

    /// Creates a token able to interrupt `fire` calls on this net.
    pub fn cancel_token(&self) -> CancelToken<P> {
        CancelToken::new(Arc::clone(&self.state))
    }

    /// Blocks until some transition in `transitions` is enabled, fires the
    /// first enabled one in slice order, and returns the caller's own
    /// descriptor for it.
    ///
    /// While nothing is enabled the calling thread waits on the net; every
    /// successful fire wakes the waiters, each of which re-tests its own
    /// transition set and waits again if it still finds nothing.
    /// Cancellation is only observed where the call would otherwise block,
    /// so an enabled transition fires even on an already-cancelled token.
    ///
    /// If no transition in `transitions` ever becomes enabled, the call
    /// blocks forever; that is a property of the net, not of the engine.
    ///
    /// # Panics
    ///
    /// Panics if `transitions` is empty.
    pub fn fire<'t>(
        &self,
        transitions: &'t [Transition<P>],
        token: &CancelToken<P>,
    ) -> Result<&'t Transition<P>, FireError> {
        assert!(
            !transitions.is_empty(),
            "fire needs at least one transition to choose from"
        );

        let mut marking = self.state.marking.lock();
        loop {
            if let Some(chosen) = transitions.iter().find(|t| t.is_enabled_in(&marking)) {
                chosen.fire_in(&mut marking);
                // waiters watch disjoint transition sets, and a waiter that
                // wakes to find nothing enabled re-waits without passing
                // the signal on, so a single notify could strand the one
                // waiter the state change actually enabled
                self.state.enabled_changed.notify_all();
                self.release(marking);
                return Ok(chosen);
            }

            if token.is_cancelled() {
                self.release(marking);
                return Err(FireError::Cancelled);
            }

            self.state.enabled_changed.wait(&mut marking);
        }
    }

    fn release(&self, guard: MutexGuard<'_, Marking<P>>) {
        if self.fair {
            MutexGuard::unlock_fair(guard);
        } else {
            drop(guard);
        }
    }
}
