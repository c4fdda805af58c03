//! Per-thread control block
//!
//! Shared (via `Arc`) between the thread itself and every handle that
//! refers to it. All fields are atomics so the signal handlers and the
//! trampoline can touch them without locks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

use osthread_core::ExitStatus;

use crate::parking::{self, futex_linux};

/// Bumped after every exit status publish, for wait-for-any
static EXIT_EPOCH: AtomicU32 = AtomicU32::new(0);

/// Current exit epoch
#[inline]
pub(crate) fn exit_epoch() -> u32 {
    EXIT_EPOCH.load(Ordering::Acquire)
}

/// Block until some thread publishes an exit after `snapshot` was read
#[inline]
pub(crate) fn wait_exit_epoch(snapshot: u32, deadline: Option<Instant>) -> bool {
    parking::wait_until_changed(&EXIT_EPOCH, snapshot, deadline)
}

pub(crate) struct ThreadControl {
    /// `ExitStatus` code; `StillActive` while the thread runs.
    /// Also the wait word for `join`.
    status: AtomicU32,

    /// Outstanding suspend requests. Always waited on with the raw futex.
    suspend_count: AtomicU32,

    /// True while the thread sits in the suspend handler
    parked: AtomicBool,

    /// Kernel tid, 0 until the thread publishes it
    tid: AtomicU32,
}

impl ThreadControl {
    pub(crate) fn new(initial_suspend: u32) -> Self {
        Self {
            status: AtomicU32::new(ExitStatus::StillActive.as_u32()),
            suspend_count: AtomicU32::new(initial_suspend),
            parked: AtomicBool::new(false),
            tid: AtomicU32::new(0),
        }
    }

    /// Control block for a thread that is already running (adoption)
    pub(crate) fn for_running(tid: u32) -> Self {
        let control = Self::new(0);
        control.tid.store(tid, Ordering::Release);
        control
    }

    // ── identity ──

    #[inline]
    pub(crate) fn tid(&self) -> u32 {
        self.tid.load(Ordering::Acquire)
    }

    /// Called by the new thread before it runs anything else
    pub(crate) fn publish_tid(&self, tid: u32) {
        self.tid.store(tid, Ordering::Release);
        futex_linux::futex_wake(&self.tid, i32::MAX);
    }

    /// Creator side of the start handshake
    pub(crate) fn wait_for_tid(&self) -> u32 {
        loop {
            let tid = self.tid.load(Ordering::Acquire);
            if tid != 0 {
                return tid;
            }
            futex_linux::futex_wait(&self.tid, 0, None);
        }
    }

    // ── exit status ──

    #[inline]
    pub(crate) fn status(&self) -> ExitStatus {
        ExitStatus::from_u32(self.status.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.status().is_active()
    }

    /// Record the final status. First writer wins; later calls are no-ops.
    pub(crate) fn publish_exit(&self, status: ExitStatus) -> bool {
        let won = self
            .status
            .compare_exchange(
                ExitStatus::StillActive.as_u32(),
                status.as_u32(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if won {
            parking::wake_all(&self.status);
            EXIT_EPOCH.fetch_add(1, Ordering::Release);
            parking::wake_all(&EXIT_EPOCH);
        }
        won
    }

    /// Block until the status leaves `StillActive` or `deadline` passes
    pub(crate) fn wait_exit(&self, deadline: Option<Instant>) -> bool {
        parking::wait_until_changed(&self.status, ExitStatus::StillActive.as_u32(), deadline)
    }

    // ── suspension ──

    #[inline]
    pub(crate) fn suspend_count(&self) -> u32 {
        self.suspend_count.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_parked(&self) -> bool {
        self.parked.load(Ordering::Acquire)
    }

    /// Add one suspend request; returns the previous count
    pub(crate) fn add_suspend(&self) -> u32 {
        self.suspend_count.fetch_add(1, Ordering::AcqRel)
    }

    /// Undo an `add_suspend` whose signal could not be delivered
    pub(crate) fn undo_suspend(&self) {
        self.release_suspend();
    }

    /// Drop one suspend request; returns the previous count.
    ///
    /// A count of zero stays zero. Wakes the thread when the count
    /// reaches zero.
    pub(crate) fn release_suspend(&self) -> u32 {
        let mut current = self.suspend_count.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return 0;
            }
            match self.suspend_count.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        if current == 1 {
            futex_linux::futex_wake(&self.suspend_count, i32::MAX);
        }
        current
    }

    /// Sleep while the suspend count is non-zero.
    ///
    /// Runs on the target thread, from the suspend signal handler or the
    /// trampoline prologue. Only atomics and the raw futex: no locks,
    /// no allocation, no logging.
    pub(crate) fn park_while_suspended(&self) {
        self.parked.store(true, Ordering::Release);
        loop {
            let count = self.suspend_count.load(Ordering::Acquire);
            if count == 0 {
                break;
            }
            futex_linux::futex_wait(&self.suspend_count, count, None);
        }
        self.parked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_publish_first_wins() {
        let control = ThreadControl::new(0);
        assert!(control.is_active());

        assert!(control.publish_exit(ExitStatus::Terminated));
        assert!(!control.publish_exit(ExitStatus::EndedSuccessfully));
        assert_eq!(control.status(), ExitStatus::Terminated);
    }

    #[test]
    fn test_publish_bumps_epoch() {
        let before = exit_epoch();
        let control = ThreadControl::new(0);
        control.publish_exit(ExitStatus::EndedSuccessfully);
        assert_ne!(exit_epoch(), before);
    }

    #[test]
    fn test_release_never_underflows() {
        let control = ThreadControl::new(0);
        assert_eq!(control.release_suspend(), 0);
        assert_eq!(control.suspend_count(), 0);

        assert_eq!(control.add_suspend(), 0);
        assert_eq!(control.add_suspend(), 1);
        assert_eq!(control.release_suspend(), 2);
        assert_eq!(control.release_suspend(), 1);
        assert_eq!(control.suspend_count(), 0);
    }

    #[test]
    fn test_park_until_released() {
        let control = Arc::new(ThreadControl::new(1));
        let control2 = Arc::clone(&control);

        let parked = thread::spawn(move || control2.park_while_suspended());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !control.is_parked() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(control.is_parked());

        control.release_suspend();
        parked.join().unwrap();
        assert!(!control.is_parked());
    }

    #[test]
    fn test_wait_exit_timeout() {
        let control = ThreadControl::new(0);
        let deadline = Instant::now() + Duration::from_millis(20);
        assert!(!control.wait_exit(Some(deadline)));

        control.publish_exit(ExitStatus::ExceptionCaught);
        assert!(control.wait_exit(None));
    }

    #[test]
    fn test_tid_handshake() {
        let control = Arc::new(ThreadControl::new(0));
        let control2 = Arc::clone(&control);

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            control2.publish_tid(4242);
        });

        assert_eq!(control.wait_for_tid(), 4242);
        assert_eq!(ThreadControl::for_running(7).tid(), 7);
    }
}
