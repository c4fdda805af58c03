//! Thread-local storage for the current thread's control block
//!
//! Two slots: an owning slot that keeps the control block alive for the
//! life of the thread, and a raw pointer the signal handlers read. The
//! raw slot is const-initialised and has no destructor, so reading it
//! from a handler never allocates or registers anything.

use std::cell::{Cell, RefCell};
use std::ptr;
use std::sync::Arc;

use osthread_core::ExitStatus;

use crate::control::ThreadControl;

struct CurrentGuard {
    control: Arc<ThreadControl>,
    /// Thread was not started by this library
    adopted: bool,
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let _ = CURRENT_RAW.try_with(|cell| cell.set(ptr::null()));
        // Spawned threads publish from the trampoline; adopted ones end here
        if self.adopted {
            self.control.publish_exit(ExitStatus::EndedSuccessfully);
        }
    }
}

thread_local! {
    static CURRENT: RefCell<Option<CurrentGuard>> = const { RefCell::new(None) };

    static CURRENT_RAW: Cell<*const ThreadControl> = const { Cell::new(ptr::null()) };
}

/// Register `control` as the calling thread's control block
pub(crate) fn enter(control: Arc<ThreadControl>, adopted: bool) {
    CURRENT_RAW.with(|cell| cell.set(Arc::as_ptr(&control)));
    CURRENT.with(|slot| {
        *slot.borrow_mut() = Some(CurrentGuard { control, adopted });
    });
}

/// Unregister the calling thread's control block
pub(crate) fn leave() {
    let guard = CURRENT.with(|slot| slot.borrow_mut().take());
    drop(guard);
}

/// The calling thread's control block, if one is registered
pub(crate) fn current() -> Option<Arc<ThreadControl>> {
    CURRENT
        .try_with(|slot| slot.borrow().as_ref().map(|g| Arc::clone(&g.control)))
        .ok()
        .flatten()
}

/// Raw control pointer for signal handlers; null if none is registered
#[inline]
pub(crate) fn current_raw() -> *const ThreadControl {
    CURRENT_RAW.with(|cell| cell.get())
}

/// Check if the calling thread has a control block
#[inline]
pub fn is_registered() -> bool {
    !current_raw().is_null()
}
