use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::net::{CancelToken, FireError, PetriNet, Place, Transition};

/// A crew of worker threads repeatedly firing a shared transition set on
/// one net.
///
/// Workers block inside `fire` whenever nothing is enabled, so a pool over
/// a quiescent net costs nothing but memory. Cancelling the pool wakes
/// every blocked worker; each worker then reports how many transitions it
/// fired.
pub struct FiringPool<P: Place + Send + Sync + 'static> {
    workers: Vec<Worker>,
    token: CancelToken<P>,
    joined: bool,
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<u64>>,
}

impl<P: Place + Send + Sync + 'static> FiringPool<P> {
    /// Spawns `size` workers over `net`, each firing from `transitions`
    /// until the pool is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn spawn(net: Arc<PetriNet<P>>, transitions: Vec<Transition<P>>, size: usize) -> Self {
        assert!(size > 0, "a firing pool needs at least one worker");

        let token = net.cancel_token();
        let transitions = Arc::new(transitions);

        let workers = (0..size)
            .map(|id| {
                Worker::start(
                    id,
                    Arc::clone(&net),
                    Arc::clone(&transitions),
                    token.clone(),
                )
            })
            .collect();

        FiringPool {
            workers,
            token,
            joined: false,
        }
    }

    /// Stops the workers. Blocked `fire` calls return cancelled; a worker
    /// mid-fire finishes that firing first. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the pool and waits for every worker, returning the fired
    /// counts of the workers that finished cleanly. A worker that panicked
    /// is reported and skipped; the rest are still joined. Later calls
    /// return nothing.
    pub fn join(&mut self) -> Vec<u64> {
        if self.joined {
            return vec![];
        }
        self.joined = true;
        self.token.cancel();

        let mut counts = vec![];
        for worker in &mut self.workers {
            match worker.handle.take().expect("worker already joined").join() {
                Ok(fired) => counts.push(fired),
                Err(_) => println!("worker {} failed to join", worker.id),
            }
        }
        counts
    }
}

impl<P: Place + Send + Sync + 'static> Drop for FiringPool<P> {
    fn drop(&mut self) {
        self.join();
    }
}

impl Worker {
    fn start<P: Place + Send + Sync + 'static>(
        id: usize,
        net: Arc<PetriNet<P>>,
        transitions: Arc<Vec<Transition<P>>>,
        token: CancelToken<P>,
    ) -> Worker {
        let handle = thread::spawn(move || {
            let mut fired = 0u64;
            loop {
                match net.fire(&transitions, &token) {
                    Ok(_) => fired += 1,
                    Err(FireError::Cancelled) => break,
                }
            }
            fired
        });

        Worker {
            id,
            handle: Some(handle),
        }
    }
}
