use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Caps the number of annotation chunks inside the model at once.
///
/// Entering hands out a [`GatePermit`]; the slot is given back when the permit drops, so a
/// panicking chunk cannot leak it.
pub(crate) struct ChunkGate {
    free: Mutex<usize>,
    freed: Condvar,
}

impl ChunkGate {
    /// A gate with `slots` concurrent entries (at least one).
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            free: Mutex::new(slots.max(1)),
            freed: Condvar::new(),
        }
    }

    /// Block until a slot is free. Also returns how long the caller was held back, if at all.
    pub(crate) fn enter(&self) -> (GatePermit<'_>, Option<Duration>) {
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        let held_since = (*free == 0).then(Instant::now);
        free = self
            .freed
            .wait_while(free, |n| *n == 0)
            .unwrap_or_else(PoisonError::into_inner);
        *free -= 1;
        (GatePermit { gate: self }, held_since.map(|t| t.elapsed()))
    }

    fn leave(&self) {
        *self.free.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.freed.notify_one();
    }
}

/// One occupied slot of a [`ChunkGate`].
pub(crate) struct GatePermit<'a> {
    gate: &'a ChunkGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
