//! Binder: callable + argument tuple -> one boxed, single-shot unit of work
//!
//! Arguments are moved into the bound callable when it is built. Anything
//! the thread should share with its creator has to be passed as an explicit
//! shared handle (`Arc`, atomic, channel), never as a borrow.
//!
//! ```ignore
//! use osthread_core::BoundCallable;
//!
//! fn add(a: u32, b: u32, out: Arc<AtomicU32>) { out.store(a + b, Ordering::Release); }
//!
//! let out = Arc::new(AtomicU32::new(0));
//! let work = BoundCallable::new(add, (2, 3, out.clone()));
//! assert_eq!(work.run(), ExitStatus::EndedSuccessfully);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::exit::ExitStatus;

/// A callable that can consume an argument tuple of matching arity.
///
/// Implemented for every `FnOnce` taking up to eight arguments. The
/// return value of the callable is discarded.
pub trait Invoke<Args>: Send + 'static {
    fn invoke(self, args: Args);
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Ret + Send + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn invoke(self, ($($arg,)*): ($($arg,)*)) {
                let _ = self($($arg),*);
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, G);
impl_invoke!(A, B, C, D, E, G, H);
impl_invoke!(A, B, C, D, E, G, H, I);

/// Heap-owned, run-once unit of work handed across the thread boundary.
///
/// Running it consumes it, so the captured state is dropped exactly once
/// whether the body returns or panics. Dropping it without running (for
/// example when thread creation fails) also drops the captures once.
pub struct BoundCallable {
    call: Box<dyn FnOnce() + Send + 'static>,
}

impl BoundCallable {
    /// Bind `f` to an argument tuple
    pub fn new<F, Args>(f: F, args: Args) -> Self
    where
        F: Invoke<Args>,
        Args: Send + 'static,
    {
        Self::from_fn(move || f.invoke(args))
    }

    /// Wrap a zero-argument closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { call: Box::new(f) }
    }

    /// Run the body, converting a panic into `ExceptionCaught`.
    ///
    /// No panic escapes this call; the payload is dropped here.
    pub fn run(self) -> ExitStatus {
        let call = self.call;
        match panic::catch_unwind(AssertUnwindSafe(move || call())) {
            Ok(()) => ExitStatus::EndedSuccessfully,
            Err(payload) => {
                crate::kdebug!("thread body panicked: {}", panic_message(payload.as_ref()));
                // A payload whose destructor panics must not unwind out of the trampoline
                let _ = panic::catch_unwind(AssertUnwindSafe(move || drop(payload)));
                ExitStatus::ExceptionCaught
            }
        }
    }
}

impl fmt::Debug for BoundCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCallable").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string payload>"
    }
}
