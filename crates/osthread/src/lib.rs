//! # osthread - native OS threads with lifecycle control
//!
//! Every `ThreadHandle` owns exactly one kernel thread. On top of what
//! `std::thread` offers it can start threads suspended, suspend and
//! resume them, terminate them, set priority, CPU affinity and name, and
//! wait for whichever of several threads finishes first. The
//! `wake_group` module adds 256 broadcast wake channels.
//!
//! ## Quick Start
//!
//! ```ignore
//! use osthread::{ThreadHandle, ExitStatus, CpuMask};
//! use std::time::Duration;
//!
//! fn work(id: u32, rounds: usize) {
//!     for _ in 0..rounds {
//!         // ...
//!     }
//! }
//!
//! let mut worker = ThreadHandle::new();
//! worker.start_with(work, (7, 1000));
//! worker.set_name("worker-7");
//! worker.set_affinity(CpuMask::CPU0);
//!
//! if worker.join(Some(Duration::from_secs(1))) {
//!     assert_eq!(worker.exit_code(), ExitStatus::EndedSuccessfully);
//! }
//! ```
//!
//! ## Waking threads
//!
//! ```ignore
//! use osthread::wake_group;
//!
//! // any number of threads
//! wake_group::wait_for_wakeup(1, None);
//!
//! // elsewhere
//! wake_group::wake_all(1);
//! ```
//!
//! ## Stopping threads
//!
//! The library adds no locking around the arguments a thread receives;
//! share state through `Arc`, atomics or channels. Prefer a
//! `CancellationToken` checked by the thread body over `terminate`,
//! which gives the target no chance to clean up.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      User Code                              │
//! │      ThreadHandle, wait_for_threads, wake_group             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Thread control block                       │
//! │    exit status word, suspend count, kernel tid (atomics)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │ pthreads  │      │   futex   │      │  RT sigs  │
//!    │ sched/nice│      │  parking  │      │ susp/term │
//!    └───────────┘      └───────────┘      └───────────┘
//! ```

// Re-export core types
pub use osthread_core::{
    BoundCallable, CancellationToken, CpuMask, ExitStatus, Invoke, Priority, ThreadError,
    ThreadResult,
};
pub use osthread_core::constants;
pub use osthread_core::error::OsError;

// Re-export kprint macros for debug logging
pub use osthread_core::kprint::{
    init as init_logging, set_flush_enabled, set_log_level, LogLevel,
};
pub use osthread_core::{kdebug, kerror, kinfo, kprint, kprintln, ktrace, kwarn};

// Re-export env utilities
pub use osthread_core::{env_get, env_get_bool, env_get_opt};

// Re-export runtime types
pub use osthread_runtime::{
    config, process_affinity, sleep_for, sleep_for_ms, sleep_for_us, system_time_ns,
    wait_for_threads, wake_group, ConfigError, Stopwatch, ThreadConfig, ThreadHandle,
    WakeChannel,
};
