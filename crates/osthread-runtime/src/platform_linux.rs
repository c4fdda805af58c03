//! Thin wrappers over the Linux thread calls
//!
//! Each wrapper turns a failure into an `OsError` naming the call.

use std::ffi::{CStr, CString};
use std::mem;
use std::ptr;

use nix::errno::Errno;
use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;
use osthread_core::constants::MAX_NAME_LEN;
use osthread_core::error::OsError;
use osthread_core::{CpuMask, Priority, ThreadError, ThreadResult};

/// Trampoline signature expected by `pthread_create`
pub(crate) type StartRoutine = extern "C" fn(*mut libc::c_void) -> *mut libc::c_void;

/// Kernel tid of the calling thread
#[inline]
pub(crate) fn current_tid() -> u32 {
    nix::unistd::gettid().as_raw() as u32
}

/// Create a joinable thread running `routine(arg)`.
///
/// `stack_size` of 0 keeps the pthread default.
pub(crate) fn spawn_raw(
    routine: StartRoutine,
    arg: *mut libc::c_void,
    stack_size: usize,
) -> Result<libc::pthread_t, OsError> {
    unsafe {
        let mut attr: libc::pthread_attr_t = mem::zeroed();
        let rc = libc::pthread_attr_init(&mut attr);
        if rc != 0 {
            return Err(OsError::new("pthread_attr_init", rc));
        }

        if stack_size != 0 {
            let rc = libc::pthread_attr_setstacksize(&mut attr, stack_size);
            if rc != 0 {
                libc::pthread_attr_destroy(&mut attr);
                return Err(OsError::new("pthread_attr_setstacksize", rc));
            }
        }

        let mut thread: libc::pthread_t = mem::zeroed();
        let rc = libc::pthread_create(&mut thread, &attr, routine, arg);
        libc::pthread_attr_destroy(&mut attr);

        if rc != 0 {
            return Err(OsError::new("pthread_create", rc));
        }
        Ok(thread)
    }
}

/// Reap a thread that has finished or is about to
pub(crate) fn join_raw(thread: libc::pthread_t) -> Result<(), OsError> {
    match unsafe { libc::pthread_join(thread, ptr::null_mut()) } {
        0 => Ok(()),
        rc => Err(OsError::new("pthread_join", rc)),
    }
}

pub(crate) fn detach_raw(thread: libc::pthread_t) -> Result<(), OsError> {
    match unsafe { libc::pthread_detach(thread) } {
        0 => Ok(()),
        rc => Err(OsError::new("pthread_detach", rc)),
    }
}

#[inline]
pub(crate) fn current_pthread() -> libc::pthread_t {
    unsafe { libc::pthread_self() }
}

// ── Priority ──

/// Nice value for each priority level
pub(crate) fn nice_for(priority: Priority) -> libc::c_int {
    -5 * priority.level() as libc::c_int
}

/// Closest priority level for a nice value
pub(crate) fn priority_for(nice: libc::c_int) -> Priority {
    let level = (-nice as f32 / 5.0).round() as i32;
    Priority::from_level(level.clamp(-2, 2)).unwrap_or_default()
}

/// Set the nice value of one thread (`PRIO_PROCESS` with a tid)
pub(crate) fn set_nice(tid: u32, nice: libc::c_int) -> Result<(), OsError> {
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, tid as libc::id_t, nice) };
    if rc != 0 {
        return Err(OsError::new("setpriority", Errno::last() as i32));
    }
    Ok(())
}

pub(crate) fn get_nice(tid: u32) -> Result<libc::c_int, OsError> {
    // -1 is a valid result; errno tells them apart
    Errno::clear();
    let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, tid as libc::id_t) };
    if nice == -1 {
        let errno = Errno::last();
        if errno != Errno::UnknownErrno {
            return Err(OsError::new("getpriority", errno as i32));
        }
    }
    Ok(nice)
}

// ── Affinity ──

fn mask_from_set(set: &CpuSet) -> CpuMask {
    (0..CpuMask::MAX_CPUS)
        .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
        .fold(CpuMask::EMPTY, |mask, cpu| mask.with(cpu))
}

fn set_from_mask(mask: CpuMask) -> Result<CpuSet, OsError> {
    let mut set = CpuSet::new();
    for cpu in mask.iter() {
        set.set(cpu).map_err(|e| OsError::new("CPU_SET", e as i32))?;
    }
    Ok(set)
}

/// CPUs the process may run on
///
/// The cgroup v2 `cpuset.cpus.effective` of the calling process when the
/// cpuset controller exposes it, otherwise the main thread's mask. In the
/// fallback case a main thread pinned to fewer CPUs narrows the result.
pub fn process_affinity() -> ThreadResult<CpuMask> {
    if let Some(mask) = cgroup_cpus() {
        return Ok(mask);
    }
    let set = sched_getaffinity(Pid::this())
        .map_err(|e| OsError::new("sched_getaffinity", e as i32))?;
    Ok(mask_from_set(&set))
}

fn cgroup_cpus() -> Option<CpuMask> {
    let membership = std::fs::read_to_string("/proc/self/cgroup").ok()?;
    // cgroup v2 has a single "0::<path>" line
    let path = membership.lines().find_map(|line| line.strip_prefix("0::"))?;
    let file = format!("/sys/fs/cgroup{}/cpuset.cpus.effective", path.trim_end_matches('/'));
    let list = std::fs::read_to_string(file).ok()?;
    parse_cpu_list(&list).filter(|mask| !mask.is_empty())
}

/// Parse a kernel CPU list such as `0-3,8,10-11`.
///
/// CPUs past `CpuMask::MAX_CPUS` are dropped; a malformed list gives `None`.
fn parse_cpu_list(list: &str) -> Option<CpuMask> {
    let mut mask = CpuMask::EMPTY;
    for part in list.trim().split(',').filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (lo.parse::<usize>().ok()?, hi.parse::<usize>().ok()?),
            None => {
                let cpu = part.parse::<usize>().ok()?;
                (cpu, cpu)
            }
        };
        if lo > hi {
            return None;
        }
        for cpu in lo..=hi.min(CpuMask::MAX_CPUS - 1) {
            mask = mask.with(cpu);
        }
    }
    Some(mask)
}

pub(crate) fn thread_affinity(tid: u32) -> Result<CpuMask, OsError> {
    let set = sched_getaffinity(Pid::from_raw(tid as libc::pid_t))
        .map_err(|e| OsError::new("sched_getaffinity", e as i32))?;
    Ok(mask_from_set(&set))
}

/// Restrict one thread to `mask`.
///
/// Rejects an empty mask and any mask outside the process mask, leaving
/// the thread's affinity untouched.
pub(crate) fn set_thread_affinity(tid: u32, mask: CpuMask) -> ThreadResult<()> {
    if mask.is_empty() {
        return Err(ThreadError::EmptyMask);
    }

    let allowed = process_affinity()?;
    if !mask.is_subset_of(allowed) {
        return Err(ThreadError::MaskNotAllowed {
            requested: mask,
            allowed,
        });
    }

    let set = set_from_mask(mask)?;
    sched_setaffinity(Pid::from_raw(tid as libc::pid_t), &set)
        .map_err(|e| OsError::new("sched_setaffinity", e as i32))?;
    Ok(())
}

// ── Names ──

/// Cut `name` to the kernel limit without splitting a character
pub(crate) fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

pub(crate) fn set_thread_name(thread: libc::pthread_t, name: &str) -> ThreadResult<()> {
    let name = CString::new(truncate_name(name)).map_err(|_| ThreadError::InvalidName)?;
    match unsafe { libc::pthread_setname_np(thread, name.as_ptr()) } {
        0 => Ok(()),
        rc => Err(OsError::new("pthread_setname_np", rc).into()),
    }
}

pub(crate) fn thread_name(thread: libc::pthread_t) -> Result<String, OsError> {
    let mut buf = [0 as libc::c_char; MAX_NAME_LEN + 1];
    let rc = unsafe { libc::pthread_getname_np(thread, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return Err(OsError::new("pthread_getname_np", rc));
    }
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}
