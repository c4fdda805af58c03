//! # osthread-runtime
//!
//! Linux implementation of the osthread native-thread wrapper.
//!
//! This crate provides:
//! - `ThreadHandle`: pthread ownership, join/detach, suspend/resume,
//!   terminate, priority, affinity and naming
//! - `wait_for_threads`: wait for the first of several threads to finish
//! - `wake_group`: 256 broadcast wake channels
//! - Address-based parking (futex, or mutex+condvar with `condvar-parking`)
//! - Control signals for suspend and terminate
//! - Timing helpers and runtime configuration

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub mod config;
        pub mod parking;
        pub mod timer;
        pub mod tls;
        pub mod wake_group;
        mod control;
        mod handle;
        mod platform_linux;
        mod signal;
        mod trampoline;
        mod wait;

        // Re-exports
        pub use config::{ConfigError, ThreadConfig};
        pub use handle::ThreadHandle;
        pub use platform_linux::process_affinity;
        pub use timer::{sleep_for, sleep_for_ms, sleep_for_us, system_time_ns, Stopwatch};
        pub use wait::wait_for_threads;
        pub use wake_group::{wait_for_wakeup, wake_all, WakeChannel};
    } else {
        compile_error!("osthread-runtime supports Linux only");
    }
}
