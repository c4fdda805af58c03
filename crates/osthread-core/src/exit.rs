//! Thread exit status codes

use core::fmt;

/// Outcome of a thread, as observed through its handle.
///
/// The numeric values are part of the contract: the trampoline returns
/// them and the control block stores them in its status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ExitStatus {
    /// The thread body returned normally
    EndedSuccessfully = 0,

    /// The thread body panicked; the panic was contained at the thread boundary
    ExceptionCaught = 1,

    /// The thread was forcibly ended with `terminate`
    Terminated = 2,

    /// The handle let go of the thread without waiting for it
    Detached = 3,

    /// Nothing is known: the handle never owned a thread
    Invalid = 4,

    /// The thread has not finished yet
    StillActive = 259,
}

impl ExitStatus {
    /// Raw status word value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decode a status word. Unknown values decode as `Invalid`.
    #[inline]
    pub const fn from_u32(v: u32) -> ExitStatus {
        match v {
            0 => ExitStatus::EndedSuccessfully,
            1 => ExitStatus::ExceptionCaught,
            2 => ExitStatus::Terminated,
            3 => ExitStatus::Detached,
            259 => ExitStatus::StillActive,
            _ => ExitStatus::Invalid,
        }
    }

    /// True while the thread is still running
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, ExitStatus::StillActive)
    }

    /// True if the thread is known to have stopped running
    #[inline]
    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            ExitStatus::EndedSuccessfully | ExitStatus::ExceptionCaught | ExitStatus::Terminated
        )
    }
}

impl From<u32> for ExitStatus {
    fn from(v: u32) -> Self {
        ExitStatus::from_u32(v)
    }
}

impl From<ExitStatus> for u32 {
    fn from(status: ExitStatus) -> u32 {
        status.as_u32()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::EndedSuccessfully => write!(f, "ended successfully"),
            ExitStatus::ExceptionCaught => write!(f, "panic caught"),
            ExitStatus::Terminated => write!(f, "terminated"),
            ExitStatus::Detached => write!(f, "detached"),
            ExitStatus::Invalid => write!(f, "invalid"),
            ExitStatus::StillActive => write!(f, "still active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitStatus::EndedSuccessfully.as_u32(), 0);
        assert_eq!(ExitStatus::ExceptionCaught.as_u32(), 1);
        assert_eq!(ExitStatus::Terminated.as_u32(), 2);
        assert_eq!(ExitStatus::Detached.as_u32(), 3);
        assert_eq!(ExitStatus::Invalid.as_u32(), 4);
        assert_eq!(ExitStatus::StillActive.as_u32(), 259);
    }

    #[test]
    fn test_unknown_code_is_invalid() {
        assert_eq!(ExitStatus::from_u32(5), ExitStatus::Invalid);
        assert_eq!(ExitStatus::from(258), ExitStatus::Invalid);
        assert_eq!(ExitStatus::from(2), ExitStatus::Terminated);
    }

    #[test]
    fn test_state_predicates() {
        assert!(ExitStatus::StillActive.is_active());
        assert!(!ExitStatus::StillActive.is_finished());

        assert!(ExitStatus::EndedSuccessfully.is_finished());
        assert!(ExitStatus::ExceptionCaught.is_finished());
        assert!(ExitStatus::Terminated.is_finished());

        // Detached says nothing about whether the thread stopped
        assert!(!ExitStatus::Detached.is_finished());
        assert!(!ExitStatus::Invalid.is_finished());
    }
}
