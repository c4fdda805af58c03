//! Control signals for suspend and terminate
//!
//! Two real-time signals (offsets above SIGRTMIN taken from the config)
//! drive the operations pthreads has no call for.

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub(crate) use unix::*;
    }
}
