//! Thread entry point
//!
//! The bound callable and the control block travel to the new thread in
//! one boxed `ThreadStart`. Ownership passes to `pthread_create` with
//! `Box::into_raw` and comes back exactly once: in the trampoline, or in
//! `launch` itself if creation fails.

use std::ffi::c_void;
use std::sync::Arc;

use osthread_core::{kprint, ktrace, BoundCallable, ThreadResult};

use crate::control::ThreadControl;
use crate::platform_linux;
use crate::signal::{self, ControlSignals, MaskGuard};
use crate::tls;

struct ThreadStart {
    body: BoundCallable,
    control: Arc<ThreadControl>,
    signals: ControlSignals,
}

/// Create the OS thread for `body`.
///
/// The child starts with the control signals blocked and unblocks them
/// once its control block is registered.
pub(crate) fn launch(
    body: BoundCallable,
    control: Arc<ThreadControl>,
    signals: ControlSignals,
    stack_size: usize,
) -> ThreadResult<libc::pthread_t> {
    let start = Box::into_raw(Box::new(ThreadStart {
        body,
        control,
        signals,
    }));

    let created = {
        let _mask = MaskGuard::block(signals);
        platform_linux::spawn_raw(trampoline, start.cast(), stack_size)
    };

    match created {
        Ok(thread) => Ok(thread),
        Err(e) => {
            // Never reached the trampoline: reclaim and drop here
            drop(unsafe { Box::from_raw(start) });
            Err(e.into())
        }
    }
}

extern "C" fn trampoline(arg: *mut c_void) -> *mut c_void {
    let start = unsafe { Box::from_raw(arg.cast::<ThreadStart>()) };
    let ThreadStart {
        body,
        control,
        signals,
    } = *start;

    let tid = platform_linux::current_tid();
    kprint::set_thread_tag(tid);
    tls::enter(Arc::clone(&control), false);
    control.publish_tid(tid);
    signal::unblock_current(signals);

    if control.suspend_count() > 0 {
        ktrace!("created suspended, parking");
        control.park_while_suspended();
    }

    ktrace!("running body");
    let status = body.run();
    ktrace!("body finished: {}", status);

    signal::block_current(signals);
    tls::leave();
    kprint::clear_thread_tag();
    control.publish_exit(status);

    status.as_u32() as usize as *mut c_void
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_failed_create_drops_callable_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let counter = DropCounter(Arc::clone(&drops));
        let body = BoundCallable::from_fn(move || drop(counter));

        let signals = signal::control_signals().unwrap();
        // No address space can hold this stack
        let result = launch(body, Arc::new(ThreadControl::new(0)), signals, usize::MAX / 2);

        assert!(result.is_err());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_trampoline_publishes_status() {
        let control = Arc::new(ThreadControl::new(0));
        let signals = signal::control_signals().unwrap();
        let body = BoundCallable::from_fn(|| panic!("contained"));

        let thread = launch(body, Arc::clone(&control), signals, 0).unwrap();
        assert_ne!(control.wait_for_tid(), 0);
        assert!(control.wait_exit(None));
        platform_linux::join_raw(thread).unwrap();

        assert_eq!(control.status(), osthread_core::ExitStatus::ExceptionCaught);
    }
}
