//! Wait for the first of several threads to finish

use std::time::Duration;

use osthread_core::constants::MAX_WAIT_HANDLES;
use osthread_core::ktrace;

use crate::control::{self, ThreadControl};
use crate::handle::ThreadHandle;
use crate::parking::deadline_after;

/// Block until one of `handles` finishes or `timeout` elapses.
///
/// Returns the index (into `handles`) of a finished thread, or `None`
/// when the slice is empty, none of the handles is joinable, or the
/// timeout expires. Only the first `MAX_WAIT_HANDLES` entries are
/// considered. When several have finished the lowest index is returned;
/// callers must not rely on any fairness beyond that.
///
/// A finished thread stays finished until joined, so calling this again
/// without joining returns the same index.
pub fn wait_for_threads(handles: &[&ThreadHandle], timeout: Option<Duration>) -> Option<usize> {
    let watched: Vec<(usize, &ThreadControl)> = handles
        .iter()
        .take(MAX_WAIT_HANDLES)
        .enumerate()
        .filter_map(|(idx, handle)| handle.joinable_control().map(|c| (idx, c)))
        .collect();

    if watched.is_empty() {
        return None;
    }

    let deadline = deadline_after(timeout);
    loop {
        // Snapshot before scanning: an exit after the scan moves the epoch
        let epoch = control::exit_epoch();

        if let Some(&(idx, _)) = watched.iter().find(|(_, c)| !c.is_active()) {
            ktrace!("wait_for_threads: index {} finished", idx);
            return Some(idx);
        }

        if !control::wait_exit_epoch(epoch, deadline) {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn blocker(stop: &Arc<AtomicBool>) -> ThreadHandle {
        let stop = Arc::clone(stop);
        ThreadHandle::spawn(move || {
            while !stop.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap()
    }

    #[test]
    fn test_empty_and_unjoinable() {
        assert_eq!(wait_for_threads(&[], Some(Duration::ZERO)), None);

        let empty = ThreadHandle::new();
        let current = ThreadHandle::from_current();
        assert_eq!(wait_for_threads(&[&empty, &current], None), None);
    }

    #[test]
    fn test_first_to_finish_wins() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut slow = blocker(&stop);
        let mut quick = ThreadHandle::spawn(|| thread::sleep(Duration::from_millis(10))).unwrap();

        let start = Instant::now();
        let hit = wait_for_threads(&[&quick, &slow], Some(Duration::from_millis(1000)));
        assert_eq!(hit, Some(0));
        // Woken by the exit itself, not by the overall timeout
        assert!(start.elapsed() < Duration::from_millis(110));

        // Index refers to the caller's slice, skipped entries included
        let empty = ThreadHandle::new();
        assert_eq!(wait_for_threads(&[&empty, &slow, &quick], None), Some(2));

        stop.store(true, Ordering::Release);
        assert!(quick.join(None));
        assert!(slow.join(None));
    }

    #[test]
    fn test_timeout() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut a = blocker(&stop);
        let mut b = blocker(&stop);

        let start = Instant::now();
        assert_eq!(wait_for_threads(&[&a, &b], Some(Duration::from_millis(40))), None);
        assert!(start.elapsed() >= Duration::from_millis(35));

        stop.store(true, Ordering::Release);
        assert!(a.join(None));
        assert!(b.join(None));
    }

    #[test]
    fn test_lowest_index_when_several_done() {
        let mut a = ThreadHandle::spawn(|| {}).unwrap();
        let mut b = ThreadHandle::spawn(|| {}).unwrap();
        a.try_join(None).ok();

        // `a` is joined (no longer joinable); `b` finishes on its own
        let deadline = Instant::now() + Duration::from_secs(5);
        while b.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        let c = ThreadHandle::spawn(|| {}).unwrap();
        while c.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(wait_for_threads(&[&a, &b, &c], Some(Duration::ZERO)), Some(1));
        assert!(b.join(None));
    }

    #[test]
    fn test_entries_past_cap_ignored() {
        let empties: Vec<ThreadHandle> = (0..MAX_WAIT_HANDLES).map(|_| ThreadHandle::new()).collect();
        let mut done = ThreadHandle::spawn(|| {}).unwrap();

        let mut refs: Vec<&ThreadHandle> = empties.iter().collect();
        refs.push(&done);
        assert_eq!(wait_for_threads(&refs, Some(Duration::from_millis(20))), None);
        assert_eq!(wait_for_threads(&refs[1..], None), Some(MAX_WAIT_HANDLES - 1));

        assert!(done.join(None));
    }
}
