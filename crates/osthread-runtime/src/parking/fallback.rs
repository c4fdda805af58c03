//! Fallback parking using std::sync::Condvar
//!
//! Words hash onto a fixed table of mutex+condvar buckets. The waiter
//! compares the word while holding the bucket lock and the waker takes
//! the same lock before notifying, so the compare-then-sleep step is as
//! atomic as the futex one.

use super::WordParking;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

const BUCKET_COUNT: usize = 64;

struct Bucket {
    lock: Mutex<()>,
    cond: Condvar,
}

impl Bucket {
    const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            cond: Condvar::new(),
        }
    }
}

static BUCKETS: [Bucket; BUCKET_COUNT] = [const { Bucket::new() }; BUCKET_COUNT];

fn bucket_for(word: &AtomicU32) -> &'static Bucket {
    let addr = word as *const AtomicU32 as usize;
    &BUCKETS[(addr >> 2) % BUCKET_COUNT]
}

/// Condvar-based parking (fallback)
pub struct CondvarParking;

impl WordParking for CondvarParking {
    fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) {
        let bucket = bucket_for(word);
        let guard = bucket.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if word.load(Ordering::Acquire) != expected {
            return;
        }

        // Several words can share a bucket; callers re-check their own
        match timeout {
            Some(t) => {
                let (guard, _) = bucket
                    .cond
                    .wait_timeout(guard, t)
                    .unwrap_or_else(PoisonError::into_inner);
                drop(guard);
            }
            None => {
                drop(bucket.cond.wait(guard).unwrap_or_else(PoisonError::into_inner));
            }
        }
    }

    fn wake_all(word: &AtomicU32) {
        let bucket = bucket_for(word);
        drop(bucket.lock.lock().unwrap_or_else(PoisonError::into_inner));
        bucket.cond.notify_all();
    }
}
