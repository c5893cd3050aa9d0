//! Thread-safe run control: stop, attention and lane toggles.
//!
//! A front end holds a clone of the simulator's [`SimControl`] and may call
//! it from any thread while `simulate` runs.  Nothing here touches lane state
//! directly: toggles are queued and the simulator applies them between
//! ticks, never during one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use qs_core::LaneId;

/// A queued change of a lane's broken flag.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LaneCommand {
    pub lane:   LaneId,
    pub broken: bool,
}

#[derive(Default)]
struct ControlState {
    stop:      AtomicBool,
    attention: AtomicBool,
    commands:  Mutex<Vec<LaneCommand>>,
}

/// Cloneable handle shared between the simulator and its controllers.
#[derive(Clone, Default)]
pub struct SimControl {
    inner: Arc<ControlState>,
}

impl SimControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running simulation to stop before its next tick.
    pub fn request_stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
    }

    /// Ask the simulation to re-examine the current time instead of jumping
    /// to the next event it had computed.
    pub fn request_attention(&self) {
        self.inner.attention.store(true, Ordering::SeqCst);
    }

    /// Queue a broken-flag change for `lane`.  Also requests attention.
    pub fn set_broken(&self, lane: LaneId, broken: bool) {
        self.commands().push(LaneCommand { lane, broken });
        self.request_attention();
    }

    /// Clear and return the stop flag.
    pub(crate) fn take_stop(&self) -> bool {
        self.inner.stop.swap(false, Ordering::SeqCst)
    }

    /// Clear and return the attention flag.
    pub(crate) fn take_attention(&self) -> bool {
        self.inner.attention.swap(false, Ordering::SeqCst)
    }

    /// Queued toggles, oldest first.
    pub(crate) fn drain_commands(&self) -> Vec<LaneCommand> {
        std::mem::take(&mut *self.commands())
    }

    fn commands(&self) -> MutexGuard<'_, Vec<LaneCommand>> {
        // A panicking controller cannot leave the Vec half-written.
        match self.inner.commands.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
