//! Timing helpers
//!
//! `Stopwatch` keeps a bounded history of time marks for frame/interval
//! measurements. The free functions sleep the calling OS thread.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use osthread_core::constants::DEFAULT_STOPWATCH_CAPACITY;

// ============================================================================
// Time Utilities
// ============================================================================

/// Monotonic clock reading in nanoseconds
#[inline]
pub fn system_time_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    (ts.tv_sec as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(ts.tv_nsec as u64)
}

/// Sleep the calling thread for `duration`
#[inline]
pub fn sleep_for(duration: Duration) {
    std::thread::sleep(duration);
}

#[inline]
pub fn sleep_for_ms(ms: u64) {
    sleep_for(Duration::from_millis(ms));
}

#[inline]
pub fn sleep_for_us(us: u64) {
    sleep_for(Duration::from_micros(us));
}

// ============================================================================
// Stopwatch
// ============================================================================

/// Bounded history of time marks, newest at the back.
///
/// Never empty: construction and `reset` seed one mark.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    stamps: VecDeque<Instant>,
    capacity: usize,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STOPWATCH_CAPACITY)
    }

    /// Keep at most `capacity` marks (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut stamps = VecDeque::with_capacity(capacity);
        stamps.push_back(Instant::now());
        Self { stamps, capacity }
    }

    /// Forget the history and start a new window now
    pub fn reset(&mut self) {
        self.stamps.clear();
        self.stamps.push_back(Instant::now());
    }

    fn last(&self) -> Instant {
        self.stamps.back().copied().unwrap_or_else(Instant::now)
    }

    fn push(&mut self, stamp: Instant) {
        if self.stamps.len() == self.capacity {
            self.stamps.pop_front();
        }
        self.stamps.push_back(stamp);
    }

    /// Record a mark; returns the time since the previous one
    pub fn mark(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last());
        self.push(now);
        elapsed
    }

    /// Time since the last mark, without recording one
    pub fn check(&self) -> Duration {
        self.last().elapsed()
    }

    /// Discard the time since the last mark.
    ///
    /// Every stored mark moves forward by the elapsed time, so intervals
    /// between marks are kept and the skipped span is not counted.
    pub fn skip(&mut self) -> Duration {
        let elapsed = self.check();
        for stamp in self.stamps.iter_mut() {
            *stamp += elapsed;
        }
        elapsed
    }

    /// Time since the oldest stored mark
    pub fn check_total(&self) -> Duration {
        self.stamps
            .front()
            .map_or(Duration::ZERO, |oldest| oldest.elapsed())
    }

    /// Mean interval between stored marks; zero with fewer than two
    pub fn average(&self) -> Duration {
        match (self.stamps.front(), self.stamps.back()) {
            (Some(oldest), Some(newest)) if self.stamps.len() >= 2 => {
                newest.saturating_duration_since(*oldest) / (self.stamps.len() as u32 - 1)
            }
            _ => Duration::ZERO,
        }
    }

    /// Number of stored marks
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the history size (at least one), keeping the newest marks
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.stamps.len() > self.capacity {
            self.stamps.pop_front();
        }
    }
}
