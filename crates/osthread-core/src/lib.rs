//! # osthread-core
//!
//! Core types for the osthread native-thread wrapper.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! All platform-specific implementations are in `osthread-runtime`.
//!
//! ## Modules
//!
//! - `exit` - Exit status codes reported by a thread
//! - `priority` - The five ordinal scheduling priority levels
//! - `affinity` - CPU affinity bitmask
//! - `bind` - Binder turning a callable plus arguments into one boxed unit of work
//! - `cancel` - Cancellation token for cooperative stopping
//! - `error` - Error types
//! - `kprint` - Kernel-style debug printing macros
//! - `env` - Environment variable utilities

pub mod exit;
pub mod priority;
pub mod affinity;
pub mod bind;
pub mod cancel;
pub mod error;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use exit::ExitStatus;
pub use priority::Priority;
pub use affinity::CpuMask;
pub use bind::{BoundCallable, Invoke};
pub use cancel::CancellationToken;
pub use error::{ThreadError, ThreadResult};
pub use env::{env_get, env_get_bool, env_get_opt};

/// Shared limits
pub mod constants {
    /// Most handles a single `wait_for_threads` call looks at.
    /// Entries past this index are ignored.
    pub const MAX_WAIT_HANDLES: usize = 64;

    /// Number of independent wake-group channels (addressed by a `u8`)
    pub const WAKE_CHANNELS: usize = 256;

    /// Channel used when the caller has no preference
    pub const DEFAULT_WAKE_CHANNEL: u8 = 0;

    /// Longest thread name the kernel stores, excluding the NUL terminator
    pub const MAX_NAME_LEN: usize = 15;

    /// Default number of marks kept by a `Stopwatch`
    pub const DEFAULT_STOPWATCH_CAPACITY: usize = 60;
}
