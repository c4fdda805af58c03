//! osthread Configuration File
//!
//! Example compile-time configuration for osthread.
//! Copy this file to your project and modify as needed.
//!
//! Usage:
//!   OST_CONFIG_RS=$PWD/cmd/basic/ost_config.rs cargo build -p osthread-basic
//!
//! You only need to include parameters you want to change.
//! All other parameters will use library defaults.
//!
//! These values can still be overridden at runtime via environment variables:
//!   OST_STACK_SIZE=1048576 ./basic

// Stack size for new threads in bytes (0 = pthread default)
pub const STACK_SIZE: usize = 512 * 1024;

// Suspend signal, as an offset above SIGRTMIN
pub const SUSPEND_SIGNAL_OFFSET: i32 = 4;

// Terminate signal, as an offset above SIGRTMIN
pub const TERMINATE_SIGNAL_OFFSET: i32 = 5;

// Enable debug logging
pub const DEBUG_LOGGING: bool = false;
