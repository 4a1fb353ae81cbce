use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Manual-reset event backing the stop handshake.
///
/// The stopping thread waits on it; the device worker thread sets it to
/// acknowledge that no further buffers will be delivered. It carries at most
/// one pending signal and is reset explicitly before each capture session.
/// Not a general-purpose lock.
#[derive(Debug, Default)]
pub struct StopSynchronizer {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

impl StopSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the signaled state.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Signals the event, waking any waiter. Stays signaled until reset.
    pub fn set(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.condvar.notify_all();
    }

    /// Blocks the calling thread until the event is signaled.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.condvar.wait(&mut signaled);
        }
    }

    /// Blocks until the event is signaled or `timeout` elapses.
    ///
    /// Returns `true` if the event was signaled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut signaled = self.signaled.lock();
        while !*signaled {
            if self.condvar.wait_until(&mut signaled, deadline).timed_out() {
                return *signaled;
            }
        }
        true
    }
}
