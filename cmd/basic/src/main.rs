//! Basic osthread example
//!
//! Starts a few workers, names and pins them, suspends one for a while,
//! waits for the first to finish and joins the rest.
//!
//! # Environment Variables
//!
//! - `OST_FLUSH_EPRINT=1` - Flush debug output immediately (useful for crash debugging)
//! - `OST_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)

use osthread::{kdebug, kinfo, process_affinity, wait_for_threads};
use osthread::{CpuMask, Priority, Stopwatch, ThreadConfig, ThreadHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn work(id: usize, rounds: u64, progress: Arc<AtomicU64>) {
    kdebug!("[worker {}] started", id);
    for _ in 0..rounds {
        progress.fetch_add(1, Ordering::Relaxed);
        osthread::sleep_for_us(200);
    }
    kdebug!("[worker {}] finished", id);
}

// OST_LOG_LEVEL=debug OST_FLUSH_EPRINT=1 cargo run -p osthread-basic
fn main() {
    println!("=== osthread Basic Example ===\n");

    ThreadConfig::from_env().print();
    println!();

    let allowed = process_affinity().unwrap_or(CpuMask::CPU0);
    let cpus: Vec<usize> = allowed.iter().collect();
    println!("Process may run on {} CPU(s): {}", cpus.len(), allowed);

    let mut clock = Stopwatch::new();
    let progress: Vec<Arc<AtomicU64>> = (0..4).map(|_| Arc::new(AtomicU64::new(0))).collect();
    let mut workers: Vec<ThreadHandle> = Vec::new();

    for (i, p) in progress.iter().enumerate() {
        let mut handle = ThreadHandle::new();
        // Worker 0 is short so wait_for_threads has a clear winner
        let rounds = if i == 0 { 200 } else { 1000 };
        if !handle.start_with(work, (i, rounds, Arc::clone(p))) {
            eprintln!("failed to start worker {}", i);
            continue;
        }

        handle.set_name(&format!("worker-{}", i));
        handle.set_priority(if i == 3 { Priority::Lowest } else { Priority::Normal });
        if !cpus.is_empty() {
            handle.set_affinity(CpuMask::cpu(cpus[i % cpus.len()]));
        }

        println!(
            "Started worker {} (tid={:?}, name={:?}, affinity={:?})",
            i,
            handle.id(),
            handle.name(),
            handle.affinity()
        );
        workers.push(handle);
    }
    println!("Startup took {:?}\n", clock.mark());

    if let Some(worker) = workers.get_mut(1) {
        if worker.suspend() {
            let frozen = progress[1].load(Ordering::Relaxed);
            osthread::sleep_for_ms(50);
            println!(
                "Worker 1 suspended: progress {} -> {} over 50ms",
                frozen,
                progress[1].load(Ordering::Relaxed)
            );
            worker.resume();
        }
    }

    let refs: Vec<&ThreadHandle> = workers.iter().collect();
    match wait_for_threads(&refs, Some(Duration::from_secs(10))) {
        Some(idx) => println!("First to finish: worker {} after {:?}", idx, clock.check()),
        None => println!("WARNING: no worker finished in time"),
    }

    for (i, worker) in workers.iter_mut().enumerate() {
        if worker.join(Some(Duration::from_secs(10))) {
            kinfo!("worker {} exited: {}", i, worker.exit_code());
        } else {
            println!("WARNING: worker {} did not finish", i);
        }
    }

    println!("\nAll workers done after {:?}", clock.mark());
    println!("\n=== Example Complete ===");
}
