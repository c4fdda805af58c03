//! Broadcast wake channels
//!
//! 256 process-wide channels, each a 32-bit generation counter that only
//! moves forward (wrapping). `wake_all` bumps the counter and releases
//! every thread waiting on that channel; waiters only test for
//! inequality, so wraparound is harmless.
//!
//! Wakes are edge-triggered: nothing is remembered for threads that take
//! their snapshot after the bump. Take the snapshot with `generation`
//! before publishing whatever the waker checks, then wait with
//! `wait_for_change`, to avoid missing a wake that races the wait call.
//!
//! ```ignore
//! use osthread_runtime::wake_group;
//!
//! // waiter
//! if wake_group::wait_for_wakeup(3, Some(Duration::from_millis(100))) {
//!     // woken
//! }
//!
//! // waker
//! wake_group::wake_all(3);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use osthread_core::constants::{DEFAULT_WAKE_CHANNEL, WAKE_CHANNELS};

use crate::parking::{self, deadline_after};

static GENERATIONS: [AtomicU32; WAKE_CHANNELS] = [const { AtomicU32::new(0) }; WAKE_CHANNELS];

#[inline]
fn slot(id: u8) -> &'static AtomicU32 {
    &GENERATIONS[id as usize]
}

/// Current generation of channel `id`
#[inline]
pub fn generation(id: u8) -> u32 {
    slot(id).load(Ordering::Acquire)
}

/// Block until `wake_all(id)` runs or `timeout` elapses.
///
/// Returns `true` once a new generation is observed, `false` if the
/// timeout runs out first. `None` waits without bound.
pub fn wait_for_wakeup(id: u8, timeout: Option<Duration>) -> bool {
    wait_for_change(id, generation(id), timeout)
}

/// Like `wait_for_wakeup`, against a generation read earlier
pub fn wait_for_change(id: u8, snapshot: u32, timeout: Option<Duration>) -> bool {
    parking::wait_until_changed(slot(id), snapshot, deadline_after(timeout))
}

/// Advance channel `id` and wake every thread waiting on it
pub fn wake_all(id: u8) {
    let word = slot(id);
    word.fetch_add(1, Ordering::Release);
    parking::wake_all(word);
}

/// One wake channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeChannel(u8);

impl Default for WakeChannel {
    fn default() -> Self {
        Self(DEFAULT_WAKE_CHANNEL)
    }
}

impl WakeChannel {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u8 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        generation(self.0)
    }

    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        wait_for_wakeup(self.0, timeout)
    }

    pub fn wait_for_change(&self, snapshot: u32, timeout: Option<Duration>) -> bool {
        wait_for_change(self.0, snapshot, timeout)
    }

    pub fn wake_all(&self) {
        wake_all(self.0)
    }
}
