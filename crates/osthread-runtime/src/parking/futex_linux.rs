//! Linux futex-based parking
//!
//! Sleeps directly on the 32-bit word being watched. The kernel compares
//! the word against the expected value and enqueues the caller in one
//! step, so a store + wake issued after the caller's snapshot is never
//! missed.
//!
//! These calls are async-signal-safe and are also used by the suspend
//! signal handler, whichever backend `PlatformParking` selects.

use super::WordParking;
use std::sync::atomic::AtomicU32;
use std::time::Duration;

/// Linux futex-based parking
pub struct FutexParking;

/// FUTEX_WAIT: sleep while `*word == expected`, at most `timeout`.
///
/// Returns on wake, timeout, signal or value mismatch; callers re-check.
#[inline]
pub fn futex_wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) {
    let timespec = timeout.map(|d| libc::timespec {
        tv_sec: d.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_nsec: d.subsec_nanos() as libc::c_long,
    });

    let timespec_ptr = match &timespec {
        Some(ts) => ts as *const libc::timespec,
        None => std::ptr::null(),
    };

    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            timespec_ptr,
            std::ptr::null::<u32>(), // uaddr2 (unused)
            0u32,                    // val3 (unused)
        );
    }
}

/// FUTEX_WAKE: wake up to `count` waiters on `word`.
#[inline]
pub fn futex_wake(word: &AtomicU32, count: i32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word.as_ptr(),
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            count,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

impl WordParking for FutexParking {
    fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) {
        futex_wait(word, expected, timeout);
    }

    fn wake_all(word: &AtomicU32) {
        futex_wake(word, i32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_mismatch_returns_immediately() {
        let word = AtomicU32::new(5);
        let start = Instant::now();
        futex_wait(&word, 4, Some(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_times_out() {
        let word = AtomicU32::new(0);
        let start = Instant::now();
        futex_wait(&word, 0, Some(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_wake_releases_waiter() {
        let word = Arc::new(AtomicU32::new(0));
        let word2 = Arc::clone(&word);

        let waiter = thread::spawn(move || {
            while word2.load(Ordering::Acquire) == 0 {
                futex_wait(&word2, 0, Some(Duration::from_secs(10)));
            }
        });

        thread::sleep(Duration::from_millis(20));
        word.store(1, Ordering::Release);
        futex_wake(&word, i32::MAX);

        waiter.join().unwrap();
    }
}
