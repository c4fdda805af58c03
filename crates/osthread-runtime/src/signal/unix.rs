//! Unix control-signal handling
//!
//! The suspend handler parks the receiving thread on its suspend count.
//! The terminate handler ends the receiving thread with the raw `exit`
//! syscall, which skips unwinding and thread-local destructors.
//!
//! Handlers touch only the raw TLS pointer, atomics and the futex.

use std::mem;
use std::ptr;
use std::sync::OnceLock;

use nix::errno::Errno;
use osthread_core::error::OsError;
use osthread_core::{kdebug, kwarn, ThreadError, ThreadResult};

use crate::config;
use crate::tls;

/// Signal numbers in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlSignals {
    pub suspend: libc::c_int,
    pub terminate: libc::c_int,
}

static INSTALLED: OnceLock<Result<ControlSignals, ThreadError>> = OnceLock::new();

/// Install the handlers on first use and return the signal numbers
pub(crate) fn control_signals() -> ThreadResult<ControlSignals> {
    INSTALLED
        .get_or_init(|| {
            let cfg = config::global();
            let signals = ControlSignals {
                suspend: cfg.suspend_signal(),
                terminate: cfg.terminate_signal(),
            };
            install_handler(signals.suspend, on_suspend)?;
            install_handler(signals.terminate, on_terminate)?;
            kdebug!(
                "control signals installed: suspend={} terminate={}",
                signals.suspend,
                signals.terminate
            );
            Ok(signals)
        })
        .clone()
}

fn install_handler(sig: libc::c_int, handler: extern "C" fn(libc::c_int)) -> ThreadResult<()> {
    unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);

        let mut previous: libc::sigaction = mem::zeroed();
        if libc::sigaction(sig, &action, &mut previous) != 0 {
            return Err(OsError::new("sigaction", Errno::last() as i32).into());
        }

        if previous.sa_sigaction != libc::SIG_DFL && previous.sa_sigaction != libc::SIG_IGN {
            kwarn!("replaced an existing handler for signal {}", sig);
        }
    }
    Ok(())
}

extern "C" fn on_suspend(_sig: libc::c_int) {
    let errno = unsafe { *libc::__errno_location() };

    let control = tls::current_raw();
    if !control.is_null() {
        // The owning TLS slot keeps the block alive while the pointer is set
        unsafe { (*control).park_while_suspended() };
    }

    unsafe { *libc::__errno_location() = errno };
}

extern "C" fn on_terminate(_sig: libc::c_int) {
    unsafe {
        libc::syscall(libc::SYS_exit, 0);
    }
}

fn sigset_of(signals: ControlSignals) -> libc::sigset_t {
    unsafe {
        let mut set: libc::sigset_t = mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, signals.suspend);
        libc::sigaddset(&mut set, signals.terminate);
        set
    }
}

fn change_mask(how: libc::c_int, signals: ControlSignals) {
    let set = sigset_of(signals);
    unsafe {
        libc::pthread_sigmask(how, &set, ptr::null_mut());
    }
}

/// Let the control signals reach the calling thread
pub(crate) fn unblock_current(signals: ControlSignals) {
    change_mask(libc::SIG_UNBLOCK, signals);
}

/// Hold the control signals off the calling thread
pub(crate) fn block_current(signals: ControlSignals) {
    change_mask(libc::SIG_BLOCK, signals);
}

/// Blocks the control signals until dropped, then restores the old mask.
///
/// Held around `pthread_create` so the child starts with them blocked.
pub(crate) struct MaskGuard {
    previous: libc::sigset_t,
}

impl MaskGuard {
    pub(crate) fn block(signals: ControlSignals) -> Self {
        let set = sigset_of(signals);
        let mut previous: libc::sigset_t = unsafe { mem::zeroed() };
        unsafe {
            libc::pthread_sigmask(libc::SIG_BLOCK, &set, &mut previous);
        }
        Self { previous }
    }
}

impl Drop for MaskGuard {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, &self.previous, ptr::null_mut());
        }
    }
}

/// Deliver `sig` to `thread`
pub(crate) fn send(thread: libc::pthread_t, sig: libc::c_int) -> Result<(), OsError> {
    match unsafe { libc::pthread_kill(thread, sig) } {
        0 => Ok(()),
        errno => Err(OsError::new("pthread_kill", errno)),
    }
}
