//! Wake channel example
//!
//! A producer ticks a wake channel; several consumers wait on it and
//! count the ticks they observe. A consumer that is busy when a tick
//! fires misses it (wakes are edge-triggered), so counts may differ.
//!
//! # Environment Variables
//!
//! - `OST_LOG_LEVEL=debug` - Set log level
//! - `WAKEUP_CONSUMERS` - Number of consumers (default 4)
//! - `WAKEUP_TICKS` - Number of ticks (default 20)

use osthread::{env_get, kdebug, CancellationToken, Stopwatch, ThreadHandle, WakeChannel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CHANNEL: WakeChannel = WakeChannel::new(1);

fn consumer(id: usize, seen: Arc<AtomicUsize>, token: CancellationToken) {
    while !token.is_cancelled() {
        if CHANNEL.wait(Some(Duration::from_millis(100))) {
            seen.fetch_add(1, Ordering::Relaxed);
            kdebug!("[consumer {}] tick {}", id, CHANNEL.generation());
        }
    }
}

fn main() {
    println!("=== osthread Wake Channel Example ===\n");

    let consumers: usize = env_get("WAKEUP_CONSUMERS", 4);
    let ticks: usize = env_get("WAKEUP_TICKS", 20);

    let token = CancellationToken::new();
    let counters: Vec<Arc<AtomicUsize>> = (0..consumers).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    let mut handles = Vec::with_capacity(consumers);
    for (i, seen) in counters.iter().enumerate() {
        match ThreadHandle::spawn_with(consumer, (i, Arc::clone(seen), token.child())) {
            Ok(handle) => handles.push(handle),
            Err(e) => eprintln!("consumer {}: {}", i, e),
        }
    }

    // Let consumers reach their first wait
    osthread::sleep_for_ms(20);

    let mut clock = Stopwatch::new();
    for _ in 0..ticks {
        CHANNEL.wake_all();
        osthread::sleep_for_ms(5);
        clock.mark();
    }
    println!(
        "Sent {} ticks, average interval {:?}",
        ticks,
        clock.average()
    );

    token.cancel();
    for (i, handle) in handles.iter_mut().enumerate() {
        handle.join(None);
        println!("consumer {} saw {} tick(s)", i, counters[i].load(Ordering::Relaxed));
    }

    println!("\n=== Example Complete ===");
}
