//! Cooperative stop flag
//!
//! OS threads cannot be cancelled safely from the outside; `terminate`
//! skips every destructor in the target. The supported way to stop a
//! thread is to hand it a token and have the body poll it.
//!
//! ```ignore
//! let token = CancellationToken::new();
//! let mut worker = ThreadHandle::spawn_with(
//!     |token: CancellationToken| while !token.is_cancelled() { step() },
//!     (token.clone(),),
//! )?;
//! token.cancel();
//! worker.join(None);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ThreadError, ThreadResult};

/// Shared cancellation flag. Clones observe the same flag.
///
/// A child token also reports cancelled once any ancestor is cancelled;
/// cancelling the child leaves the parent alone.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: None,
            }),
        }
    }

    /// Create a token that is also cancelled by this one
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    /// True once this token or any ancestor was cancelled
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        let mut token = self;
        loop {
            if token.inner.cancelled.load(Ordering::Acquire) {
                return true;
            }
            match &token.inner.parent {
                Some(parent) => token = parent,
                None => return false,
            }
        }
    }

    /// Request cancellation. Only this token's own flag is set.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// `Err(ThreadError::Cancelled)` once cancelled, for use with `?`
    #[inline]
    pub fn check(&self) -> ThreadResult<()> {
        if self.is_cancelled() {
            Err(ThreadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}
