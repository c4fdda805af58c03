//! Address-based parking
//!
//! Threads sleep until a 32-bit word changes from a value they observed.
//! Used by `join` (exit status), `wait_for_threads` (exit epoch) and the
//! wake group (generation counters).
//!
//! The futex backend is the default. The `condvar-parking` feature swaps
//! in a mutex+condvar table for everything except the suspend handler,
//! which always sleeps on the raw futex.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

pub mod fallback;
pub mod futex_linux;

/// Compare-and-sleep on a 32-bit word
///
/// `wait` must not go to sleep if `*word != expected` at the moment it
/// would enqueue the caller, and `wake_all` must release every thread
/// enqueued on `word` before the call. Spurious returns are allowed.
pub trait WordParking {
    /// Sleep while `*word == expected`, for at most `timeout`
    fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>);

    /// Wake every thread sleeping on `word`
    fn wake_all(word: &AtomicU32);
}

cfg_if::cfg_if! {
    if #[cfg(feature = "condvar-parking")] {
        pub use fallback::CondvarParking as PlatformParking;
    } else {
        pub use futex_linux::FutexParking as PlatformParking;
    }
}

/// Block until `word` differs from `snapshot` or `deadline` passes.
///
/// Returns `true` if a different value was observed, `false` on timeout.
/// `None` waits without bound.
pub fn wait_until_changed(word: &AtomicU32, snapshot: u32, deadline: Option<Instant>) -> bool {
    loop {
        if word.load(Ordering::Acquire) != snapshot {
            return true;
        }

        let timeout = match deadline {
            Some(d) => {
                let now = Instant::now();
                if now >= d {
                    return false;
                }
                Some(d - now)
            }
            None => None,
        };

        PlatformParking::wait(word, snapshot, timeout);
    }
}

/// Wake every thread blocked in `wait_until_changed` on `word`.
///
/// The caller stores the new value first.
#[inline]
pub fn wake_all(word: &AtomicU32) {
    PlatformParking::wake_all(word);
}

/// Turn a relative timeout into a deadline. Overflow means "never".
#[inline]
pub fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_timeout() {
        let word = AtomicU32::new(0);
        let start = Instant::now();
        let changed = wait_until_changed(&word, 0, deadline_after(Some(Duration::from_millis(50))));
        let elapsed = start.elapsed();

        assert!(!changed);
        assert!(elapsed >= Duration::from_millis(45));
    }

    #[test]
    fn test_already_changed() {
        let word = AtomicU32::new(3);
        assert!(wait_until_changed(&word, 2, None));
    }

    #[test]
    fn test_wake() {
        let word = Arc::new(AtomicU32::new(0));
        let word2 = Arc::clone(&word);

        let handle = thread::spawn(move || {
            wait_until_changed(&word2, 0, deadline_after(Some(Duration::from_secs(10))))
        });

        thread::sleep(Duration::from_millis(50));
        word.fetch_add(1, Ordering::Release);
        wake_all(&word);

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_huge_timeout_is_unbounded() {
        assert_eq!(deadline_after(Some(Duration::MAX)), None);
        assert!(deadline_after(Some(Duration::from_secs(1))).is_some());
        assert_eq!(deadline_after(None), None);
    }
}
