//! Owned native thread handle
//!
//! A `ThreadHandle` owns at most one live OS thread. Moving the handle
//! moves the ownership; there is no `Clone`. Dropping a handle that
//! still owns a thread detaches it.
//!
//! The operational API reports failure with `false` and never panics on
//! misuse. The `try_*` variants return the `ThreadError` instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use osthread_core::{
    kdebug, BoundCallable, CpuMask, ExitStatus, Invoke, Priority, ThreadError, ThreadResult,
};

use crate::config;
use crate::control::ThreadControl;
use crate::parking::deadline_after;
use crate::platform_linux;
use crate::signal;
use crate::tls;
use crate::trampoline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Created by `start`; joined or detached through this handle
    Spawned,
    /// Obtained with `from_current`; never reaped through this handle
    Adopted,
}

struct Live {
    thread: libc::pthread_t,
    control: Arc<ThreadControl>,
    origin: Origin,
}

/// Handle owning one native thread
pub struct ThreadHandle {
    live: Option<Live>,
    /// The user's last suspend/resume request, consulted by the next start
    requested_suspended: bool,
    cached_status: ExitStatus,
    cached_valid: bool,
}

impl Default for ThreadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a failed operation and collapse it to `false`
fn report<T>(op: &str, result: ThreadResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            kdebug!("{} failed: {}", op, e);
            false
        }
    }
}

impl ThreadHandle {
    /// An empty handle that owns no thread
    pub const fn new() -> Self {
        Self {
            live: None,
            requested_suspended: false,
            cached_status: ExitStatus::Invalid,
            cached_valid: false,
        }
    }

    /// Start `f` on a new thread and return its handle
    pub fn spawn<F>(f: F) -> ThreadResult<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut handle = Self::new();
        handle.launch(BoundCallable::from_fn(f), false)?;
        Ok(handle)
    }

    /// Start `f(args...)` on a new thread and return its handle
    pub fn spawn_with<F, Args>(f: F, args: Args) -> ThreadResult<Self>
    where
        F: Invoke<Args>,
        Args: Send + 'static,
    {
        let mut handle = Self::new();
        handle.launch(BoundCallable::new(f, args), false)?;
        Ok(handle)
    }

    // ── start ──

    /// Start `f` on a new thread. Fails if this handle already owns one.
    pub fn start<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        report("start", self.launch(BoundCallable::from_fn(f), false))
    }

    /// Start `f(args...)`; `args` is moved in, so later changes by the
    /// caller are not seen by the thread.
    pub fn start_with<F, Args>(&mut self, f: F, args: Args) -> bool
    where
        F: Invoke<Args>,
        Args: Send + 'static,
    {
        report("start", self.launch(BoundCallable::new(f, args), false))
    }

    /// Start `f` with its body held until `resume`
    pub fn start_suspended<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        report("start", self.launch(BoundCallable::from_fn(f), true))
    }

    pub fn start_suspended_with<F, Args>(&mut self, f: F, args: Args) -> bool
    where
        F: Invoke<Args>,
        Args: Send + 'static,
    {
        report("start", self.launch(BoundCallable::new(f, args), true))
    }

    /// Start an already bound callable
    pub fn try_start(&mut self, body: BoundCallable, suspended: bool) -> ThreadResult<()> {
        self.launch(body, suspended)
    }

    fn launch(&mut self, body: BoundCallable, suspended: bool) -> ThreadResult<()> {
        // `body` is dropped on every early return
        if self.live.is_some() {
            return Err(ThreadError::AlreadyRunning);
        }

        let signals = signal::control_signals()?;
        let suspended = suspended || self.requested_suspended;
        let control = Arc::new(ThreadControl::new(u32::from(suspended)));

        let thread = trampoline::launch(
            body,
            Arc::clone(&control),
            signals,
            config::global().stack_size,
        )?;
        let tid = control.wait_for_tid();

        self.live = Some(Live {
            thread,
            control,
            origin: Origin::Spawned,
        });
        self.requested_suspended = suspended;
        self.cached_status = ExitStatus::StillActive;
        self.cached_valid = false;

        kdebug!(
            "started thread {}{}",
            tid,
            if suspended { " (suspended)" } else { "" }
        );
        Ok(())
    }

    // ── join / detach ──

    /// Wait for the thread to finish, at most `timeout` (`None` waits
    /// forever). On success the exit status is cached and the handle is
    /// emptied.
    pub fn join(&mut self, timeout: Option<Duration>) -> bool {
        report("join", self.try_join(timeout))
    }

    pub fn try_join(&mut self, timeout: Option<Duration>) -> ThreadResult<ExitStatus> {
        let live = self.live.as_ref().ok_or(ThreadError::NotRunning)?;
        if live.origin == Origin::Adopted {
            return Err(ThreadError::NotJoinable);
        }
        if live.control.tid() == platform_linux::current_tid() {
            return Err(ThreadError::SelfReference);
        }

        if !live.control.wait_exit(deadline_after(timeout)) {
            return Err(ThreadError::Timeout);
        }

        // The status is published last; pthread_join only waits for the return
        platform_linux::join_raw(live.thread)?;
        let status = live.control.status();
        self.retire(status);
        Ok(status)
    }

    /// Release the thread without waiting for it. No-op on an empty handle.
    pub fn detach(&mut self) {
        let Some(live) = self.live.as_ref() else {
            return;
        };

        if live.origin == Origin::Spawned {
            if let Err(e) = platform_linux::detach_raw(live.thread) {
                kdebug!("detach of thread {}: {}", live.control.tid(), e);
            }
        }
        self.retire(ExitStatus::Detached);
    }

    fn retire(&mut self, status: ExitStatus) {
        self.live = None;
        self.cached_status = status;
        self.cached_valid = true;
        self.requested_suspended = false;
    }

    // ── suspend / resume / terminate ──

    /// Ask the thread to stop running until `resume`.
    ///
    /// The request is latched even when it fails, so calling this on an
    /// empty handle makes the next start create the thread suspended.
    pub fn suspend(&mut self) -> bool {
        report("suspend", self.try_suspend())
    }

    /// Add one suspend request and return the previous suspend count
    pub fn try_suspend(&mut self) -> ThreadResult<u32> {
        self.requested_suspended = true;
        let live = self.active()?;

        let signals = signal::control_signals()?;
        let previous = live.control.add_suspend();
        if previous == 0 {
            if let Err(e) = signal::send(live.thread, signals.suspend) {
                live.control.undo_suspend();
                return Err(e.into());
            }
        }
        Ok(previous)
    }

    /// Drop one suspend request. The thread runs again once none remain.
    pub fn resume(&mut self) -> bool {
        report("resume", self.try_resume())
    }

    /// Drop one suspend request and return the previous suspend count
    pub fn try_resume(&mut self) -> ThreadResult<u32> {
        self.requested_suspended = false;
        let live = self.live.as_ref().ok_or(ThreadError::NotRunning)?;
        Ok(live.control.release_suspend())
    }

    /// End the thread at once and release it.
    ///
    /// Returns `false` on an empty handle or when called from the thread
    /// itself.
    ///
    /// # Safety
    ///
    /// The target gets no chance to clean up: no unwinding, no
    /// destructors, no thread-local cleanup. Locks it holds stay locked
    /// and memory it owns leaks. Only use this when nothing else the
    /// process relies on can be held by the target.
    pub unsafe fn terminate(&mut self) -> bool {
        report("terminate", self.try_terminate())
    }

    fn try_terminate(&mut self) -> ThreadResult<()> {
        let live = self.active()?;
        if live.control.tid() == platform_linux::current_tid() {
            return Err(ThreadError::SelfReference);
        }

        let signals = signal::control_signals()?;
        // Publish first: the target never returns to do it
        if live.control.publish_exit(ExitStatus::Terminated) {
            if let Err(e) = signal::send(live.thread, signals.terminate) {
                kdebug!("terminate signal to {}: {}", live.control.tid(), e);
            }
        }

        kdebug!("terminated thread {}", live.control.tid());
        self.detach();
        self.cached_status = ExitStatus::Terminated;
        Ok(())
    }

    // ── scheduling hints ──

    /// Set the thread's priority. Raising it may need privileges.
    pub fn set_priority(&self, priority: Priority) -> bool {
        report("set_priority", self.try_set_priority(priority))
    }

    pub fn try_set_priority(&self, priority: Priority) -> ThreadResult<()> {
        let live = self.active()?;
        platform_linux::set_nice(live.control.tid(), platform_linux::nice_for(priority))?;
        Ok(())
    }

    pub fn priority(&self) -> Option<Priority> {
        let live = self.active().ok()?;
        let nice = platform_linux::get_nice(live.control.tid()).ok()?;
        Some(platform_linux::priority_for(nice))
    }

    /// Restrict the thread to the CPUs in `mask`.
    ///
    /// Fails without changing anything if `mask` is empty or names a CPU
    /// outside `process_affinity()`. Without a cgroup cpuset that set is
    /// the main thread's mask, so pinning the main thread narrows it.
    pub fn set_affinity(&self, mask: CpuMask) -> bool {
        report("set_affinity", self.try_set_affinity(mask))
    }

    pub fn try_set_affinity(&self, mask: CpuMask) -> ThreadResult<()> {
        let live = self.active()?;
        platform_linux::set_thread_affinity(live.control.tid(), mask)
    }

    pub fn affinity(&self) -> Option<CpuMask> {
        let live = self.active().ok()?;
        platform_linux::thread_affinity(live.control.tid()).ok()
    }

    /// Label the thread for debuggers and `ps`. Long names are cut to
    /// 15 bytes; names with a NUL byte are refused.
    pub fn set_name(&self, name: &str) -> bool {
        report("set_name", self.try_set_name(name))
    }

    pub fn try_set_name(&self, name: &str) -> ThreadResult<()> {
        let live = self.active()?;
        platform_linux::set_thread_name(live.thread, name)
    }

    pub fn name(&self) -> Option<String> {
        let live = self.active().ok()?;
        platform_linux::thread_name(live.thread).ok()
    }

    // ── queries ──

    /// Owns a thread that can be joined
    pub fn is_joinable(&self) -> bool {
        matches!(&self.live, Some(live) if live.origin == Origin::Spawned)
    }

    /// Owns a thread that has not finished
    pub fn is_running(&self) -> bool {
        matches!(&self.live, Some(live) if live.control.is_active())
    }

    /// The thread finished, whether or not it was joined
    pub fn has_finished(&self) -> bool {
        match &self.live {
            Some(live) => !live.control.is_active(),
            None => self.cached_valid,
        }
    }

    /// Live status while a thread is owned, else the cached one, else `Invalid`
    pub fn exit_code(&self) -> ExitStatus {
        match &self.live {
            Some(live) => live.control.status(),
            None if self.cached_valid => self.cached_status,
            None => ExitStatus::Invalid,
        }
    }

    pub fn native_handle(&self) -> Option<libc::pthread_t> {
        self.live.as_ref().map(|live| live.thread)
    }

    /// Kernel thread id
    pub fn id(&self) -> Option<u32> {
        self.live.as_ref().map(|live| live.control.tid())
    }

    /// Whether the last suspend/resume call asked for suspension
    pub fn is_suspend_requested(&self) -> bool {
        self.requested_suspended
    }

    /// Outstanding suspend requests on the thread
    pub fn suspend_count(&self) -> u32 {
        self.live
            .as_ref()
            .map_or(0, |live| live.control.suspend_count())
    }

    /// The thread is parked by a suspend request right now
    pub fn is_suspended(&self) -> bool {
        matches!(&self.live, Some(live) if live.control.is_parked())
    }

    // ── current thread ──

    /// A handle to the calling thread.
    ///
    /// Shares the thread's control block, so suspend, the setters and the
    /// queries work. It cannot be joined; detaching it only drops the
    /// reference.
    pub fn from_current() -> Self {
        let control = tls::current().unwrap_or_else(|| {
            let control = Arc::new(ThreadControl::for_running(platform_linux::current_tid()));
            tls::enter(Arc::clone(&control), true);
            control
        });

        Self {
            live: Some(Live {
                thread: platform_linux::current_pthread(),
                control,
                origin: Origin::Adopted,
            }),
            requested_suspended: false,
            cached_status: ExitStatus::StillActive,
            cached_valid: false,
        }
    }

    // ── internal ──

    /// The owned thread, if its OS handle can still be used.
    ///
    /// An adopted thread that has exited is refused: its pthread_t may
    /// already be reused.
    fn active(&self) -> ThreadResult<&Live> {
        let live = self.live.as_ref().ok_or(ThreadError::NotRunning)?;
        if live.origin == Origin::Adopted && !live.control.is_active() {
            return Err(ThreadError::NotRunning);
        }
        Ok(live)
    }

    /// Control block of a joinable thread, for wait-for-any
    pub(crate) fn joinable_control(&self) -> Option<&ThreadControl> {
        match &self.live {
            Some(live) if live.origin == Origin::Spawned => Some(&live.control),
            _ => None,
        }
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            if live.origin == Origin::Spawned {
                kdebug!("handle dropped while owning thread {}, detaching", live.control.tid());
            }
            self.detach();
        }
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("id", &self.id())
            .field("origin", &self.live.as_ref().map(|live| live.origin))
            .field("exit_code", &self.exit_code())
            .field("suspend_requested", &self.requested_suspended)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::thread;
    use std::time::Instant;

    const LONG: Option<Duration> = Some(Duration::from_secs(10));

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    #[test]
    fn test_start_and_join() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);

        let mut handle = ThreadHandle::new();
        assert!(handle.start(move || {
            ran2.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(handle.is_joinable());
        assert!(handle.id().is_some());
        assert!(handle.native_handle().is_some());

        assert!(handle.join(LONG));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(handle.exit_code(), ExitStatus::EndedSuccessfully);
        assert!(handle.has_finished());
        assert!(!handle.is_joinable());
        assert_eq!(handle.id(), None);
    }

    #[test]
    fn test_args_are_snapshotted() {
        let (tx, rx) = mpsc::channel();
        let mut label = String::from("before");

        let mut handle = ThreadHandle::new();
        assert!(handle.start_with(
            |label: String, n: u32, tx: mpsc::Sender<(String, u32)>| {
                tx.send((label, n)).unwrap();
            },
            (label.clone(), 7, tx),
        ));
        label.push_str("-changed");

        assert!(handle.join(LONG));
        assert_eq!(rx.recv().unwrap(), ("before".to_string(), 7));
        assert_eq!(label, "before-changed");
    }

    #[test]
    fn test_join_empty_handle() {
        let mut handle = ThreadHandle::new();
        assert!(!handle.join(Some(Duration::ZERO)));
        assert_eq!(handle.try_join(None), Err(ThreadError::NotRunning));
        assert!(!handle.has_finished());
        assert_eq!(handle.exit_code(), ExitStatus::Invalid);
    }

    #[test]
    fn test_start_twice_fails() {
        let gate = Arc::new(AtomicBool::new(false));
        let gate2 = Arc::clone(&gate);

        let mut handle = ThreadHandle::spawn(move || {
            while !gate2.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        assert!(!handle.start(|| {}));
        assert!(handle.is_running());

        gate.store(true, Ordering::Release);
        assert!(handle.join(LONG));

        // A joined handle can be started again
        assert!(handle.start(|| {}));
        assert!(handle.join(LONG));
        assert_eq!(handle.exit_code(), ExitStatus::EndedSuccessfully);
    }

    #[test]
    fn test_join_timeout() {
        let gate = Arc::new(AtomicBool::new(false));
        let gate2 = Arc::clone(&gate);

        let mut handle = ThreadHandle::spawn(move || {
            while !gate2.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        let start = Instant::now();
        assert_eq!(
            handle.try_join(Some(Duration::from_millis(30))),
            Err(ThreadError::Timeout)
        );
        assert!(start.elapsed() >= Duration::from_millis(25));
        assert!(handle.is_joinable());
        assert_eq!(handle.exit_code(), ExitStatus::StillActive);

        gate.store(true, Ordering::Release);
        assert!(handle.join(LONG));
    }

    #[test]
    fn test_panic_becomes_exception_caught() {
        let mut handle = ThreadHandle::spawn(|| panic!("boom")).unwrap();
        assert_eq!(handle.try_join(LONG), Ok(ExitStatus::ExceptionCaught));
        assert_eq!(handle.exit_code(), ExitStatus::ExceptionCaught);
    }

    #[test]
    fn test_detach() {
        let mut handle = ThreadHandle::spawn(|| thread::sleep(Duration::from_millis(20))).unwrap();
        handle.detach();

        assert!(handle.has_finished());
        assert_eq!(handle.exit_code(), ExitStatus::Detached);
        assert!(!handle.join(Some(Duration::ZERO)));
        assert!(unsafe { !handle.terminate() });

        // Idempotent
        handle.detach();
        assert_eq!(handle.exit_code(), ExitStatus::Detached);
    }

    #[test]
    fn test_self_join_refused() {
        let slot: Arc<Mutex<Option<ThreadHandle>>> = Arc::new(Mutex::new(None));
        let slot2 = Arc::clone(&slot);
        let (tx, rx) = mpsc::channel();

        let handle = ThreadHandle::spawn(move || {
            let joined = loop {
                if let Some(own) = slot2.lock().unwrap().as_mut() {
                    break own.try_join(Some(Duration::ZERO));
                }
                thread::sleep(Duration::from_millis(1));
            };
            tx.send(joined).unwrap();
        })
        .unwrap();

        *slot.lock().unwrap() = Some(handle);
        assert_eq!(rx.recv().unwrap(), Err(ThreadError::SelfReference));

        let mut handle = slot.lock().unwrap().take().unwrap();
        assert!(handle.join(LONG));
    }

    #[test]
    fn test_start_suspended_then_resume() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = Arc::clone(&ran);

        let mut handle = ThreadHandle::new();
        assert!(handle.start_suspended(move || ran2.store(true, Ordering::SeqCst)));
        assert!(handle.is_suspend_requested());
        assert!(wait_until(|| handle.is_suspended()));

        thread::sleep(Duration::from_millis(20));
        assert!(!ran.load(Ordering::SeqCst));

        assert_eq!(handle.try_resume(), Ok(1));
        assert!(!handle.is_suspend_requested());
        assert!(handle.join(LONG));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_suspend_before_start_is_latched() {
        let mut handle = ThreadHandle::new();
        assert!(!handle.suspend());
        assert!(handle.is_suspend_requested());

        assert!(handle.start(|| {}));
        assert_eq!(handle.suspend_count(), 1);
        assert!(wait_until(|| handle.is_suspended()));

        assert!(handle.resume());
        assert!(handle.join(LONG));
    }

    #[test]
    fn test_suspend_and_resume_running_thread() {
        let counter = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let (counter2, stop2) = (Arc::clone(&counter), Arc::clone(&stop));

        let mut handle = ThreadHandle::spawn(move || {
            while !stop2.load(Ordering::Acquire) {
                counter2.fetch_add(1, Ordering::Relaxed);
                thread::sleep(Duration::from_micros(100));
            }
        })
        .unwrap();

        assert!(wait_until(|| counter.load(Ordering::Relaxed) > 0));
        assert_eq!(handle.try_suspend(), Ok(0));
        assert_eq!(handle.try_suspend(), Ok(1));
        assert!(wait_until(|| handle.is_suspended()));

        let frozen = counter.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.load(Ordering::Relaxed), frozen);

        assert_eq!(handle.try_resume(), Ok(2));
        assert!(handle.is_suspended());
        assert_eq!(handle.try_resume(), Ok(1));
        assert!(wait_until(|| counter.load(Ordering::Relaxed) > frozen));

        // Resuming a running thread is harmless
        assert_eq!(handle.try_resume(), Ok(0));

        stop.store(true, Ordering::Release);
        assert!(handle.join(LONG));
    }

    #[test]
    fn test_terminate() {
        let reached_end = Arc::new(AtomicBool::new(false));
        let reached_end2 = Arc::clone(&reached_end);

        let mut handle = ThreadHandle::spawn(move || loop {
            thread::sleep(Duration::from_millis(1));
            if reached_end2.load(Ordering::Relaxed) {
                break;
            }
        })
        .unwrap();

        assert!(unsafe { handle.terminate() });
        assert_eq!(handle.exit_code(), ExitStatus::Terminated);
        assert!(handle.has_finished());
        assert!(!handle.is_joinable());
        assert!(!handle.join(Some(Duration::ZERO)));
        assert!(unsafe { !handle.terminate() });
        reached_end.store(true, Ordering::Relaxed);
    }

    #[test]
    fn test_terminate_suspended_thread() {
        let mut handle = ThreadHandle::new();
        assert!(handle.start_suspended(|| {}));
        assert!(wait_until(|| handle.is_suspended()));

        assert!(unsafe { handle.terminate() });
        assert_eq!(handle.exit_code(), ExitStatus::Terminated);
    }

    #[test]
    fn test_terminate_self_refused() {
        let (tx, rx) = mpsc::channel();
        let mut handle = ThreadHandle::spawn(move || {
            let mut me = ThreadHandle::from_current();
            tx.send(unsafe { me.terminate() }).unwrap();
        })
        .unwrap();

        assert!(!rx.recv().unwrap());
        assert_eq!(handle.try_join(LONG), Ok(ExitStatus::EndedSuccessfully));
    }

    #[test]
    fn test_from_current() {
        let mut me = ThreadHandle::from_current();
        assert!(!me.is_joinable());
        assert!(me.is_running());
        assert_eq!(me.id(), Some(platform_linux::current_tid()));
        assert_eq!(me.try_join(Some(Duration::ZERO)), Err(ThreadError::NotJoinable));
        assert!(me.priority().is_some());
        assert!(me.affinity().is_some());

        me.detach();
        assert_eq!(me.exit_code(), ExitStatus::Detached);
    }

    #[test]
    fn test_from_current_shares_control_block() {
        let (tx, rx) = mpsc::channel();
        let (go_tx, go_rx) = mpsc::channel::<()>();

        let mut handle = ThreadHandle::spawn(move || {
            let me = ThreadHandle::from_current();
            tx.send(me.id()).unwrap();
            go_rx.recv().unwrap();
        })
        .unwrap();

        assert_eq!(rx.recv().unwrap(), handle.id());
        go_tx.send(()).unwrap();
        assert!(handle.join(LONG));
    }

    #[test]
    fn test_set_affinity() {
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = Arc::clone(&stop);
        let mut handle = ThreadHandle::spawn(move || {
            while !stop2.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        let allowed = platform_linux::process_affinity().unwrap();
        let before = handle.affinity().unwrap();

        assert!(!handle.set_affinity(CpuMask::EMPTY));
        assert_eq!(handle.try_set_affinity(CpuMask::EMPTY), Err(ThreadError::EmptyMask));

        // A CPU outside the process mask is refused and nothing changes
        if let Some(outside) = (0..CpuMask::MAX_CPUS).find(|&cpu| !allowed.contains(cpu)) {
            let mask = allowed.with(outside);
            assert!(!handle.set_affinity(mask));
            assert_eq!(handle.affinity(), Some(before));
        }

        let first = CpuMask::cpu(allowed.first().unwrap());
        assert!(handle.set_affinity(first));
        assert_eq!(handle.affinity(), Some(first));

        stop.store(true, Ordering::Release);
        assert!(handle.join(LONG));
        assert!(!handle.set_affinity(first));
    }

    #[test]
    fn test_set_priority() {
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = Arc::clone(&stop);
        let mut handle = ThreadHandle::spawn(move || {
            while !stop2.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        // Lowering is always allowed
        assert!(handle.set_priority(Priority::Lowest));
        assert_eq!(handle.priority(), Some(Priority::Lowest));

        stop.store(true, Ordering::Release);
        assert!(handle.join(LONG));
        assert!(!handle.set_priority(Priority::Normal));
        assert_eq!(handle.priority(), None);
    }

    #[test]
    fn test_set_name() {
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = Arc::clone(&stop);
        let mut handle = ThreadHandle::spawn(move || {
            while !stop2.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        assert!(handle.set_name("worker-1"));
        assert_eq!(handle.name().as_deref(), Some("worker-1"));

        assert!(handle.set_name("a-name-longer-than-fifteen"));
        assert_eq!(handle.name().as_deref(), Some("a-name-longer-t"));

        assert_eq!(handle.try_set_name("bad\0name"), Err(ThreadError::InvalidName));

        stop.store(true, Ordering::Release);
        assert!(handle.join(LONG));
        assert!(!handle.set_name("gone"));
    }

    #[test]
    fn test_drop_detaches() {
        let finished = Arc::new(AtomicBool::new(false));
        let finished2 = Arc::clone(&finished);
        {
            let _handle = ThreadHandle::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                finished2.store(true, Ordering::SeqCst);
            })
            .unwrap();
        }
        assert!(wait_until(|| finished.load(Ordering::SeqCst)));
    }

    #[test]
    fn test_move_transfers_ownership() {
        let handle = ThreadHandle::spawn(|| {}).unwrap();
        let id = handle.id();

        let mut moved = handle;
        assert_eq!(moved.id(), id);
        assert!(moved.join(LONG));
    }
}
