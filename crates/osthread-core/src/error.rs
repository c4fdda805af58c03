//! Error types for osthread

use core::fmt;

use crate::affinity::CpuMask;

/// Result type for thread operations
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Reasons a thread operation can fail
///
/// The boolean API of `ThreadHandle` collapses these into `false`; the
/// `try_*` methods and constructors hand them back as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    /// The handle already owns a live thread
    AlreadyRunning,

    /// The handle owns no thread
    NotRunning,

    /// The handle refers to a thread it does not own (`from_current`)
    NotJoinable,

    /// A thread tried to join or terminate itself
    SelfReference,

    /// Operation timed out
    Timeout,

    /// Affinity mask names no CPU
    EmptyMask,

    /// Affinity mask names CPUs the process may not use
    MaskNotAllowed {
        requested: CpuMask,
        allowed: CpuMask,
    },

    /// Thread name contains an interior NUL byte
    InvalidName,

    /// Cooperative cancellation was requested
    Cancelled,

    /// A system call failed
    Os(OsError),
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::AlreadyRunning => write!(f, "handle already owns a running thread"),
            ThreadError::NotRunning => write!(f, "handle owns no thread"),
            ThreadError::NotJoinable => write!(f, "handle does not own its thread"),
            ThreadError::SelfReference => write!(f, "a thread cannot join or terminate itself"),
            ThreadError::Timeout => write!(f, "operation timed out"),
            ThreadError::EmptyMask => write!(f, "affinity mask is empty"),
            ThreadError::MaskNotAllowed { requested, allowed } => write!(
                f,
                "affinity mask {} is not within the process mask {}",
                requested, allowed
            ),
            ThreadError::InvalidName => write!(f, "thread name contains a NUL byte"),
            ThreadError::Cancelled => write!(f, "operation cancelled"),
            ThreadError::Os(e) => write!(f, "os error: {}", e),
        }
    }
}

impl std::error::Error for ThreadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThreadError::Os(e) => Some(e),
            _ => None,
        }
    }
}

/// A failed system call and the errno it reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsError {
    pub call: &'static str,
    pub errno: i32,
}

impl OsError {
    pub const fn new(call: &'static str, errno: i32) -> Self {
        Self { call, errno }
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed: {}",
            self.call,
            std::io::Error::from_raw_os_error(self.errno)
        )
    }
}

impl std::error::Error for OsError {}

impl From<OsError> for ThreadError {
    fn from(e: OsError) -> Self {
        ThreadError::Os(e)
    }
}
