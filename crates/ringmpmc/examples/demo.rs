//! Three producers and two consumers sharing an 8-slot ring of 64-byte chunks.
//!
//! Producers use the non-blocking claim and drop an item when the ring is
//! full; consumers poll until the ring is stopped and drained.
//!
//! Run with: `RUST_LOG=debug cargo run --example demo --features tracing`

use rand::Rng;
use ringmpmc_rs::{Config, RingBuffer, Signal, Unavailable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const CAPACITY: usize = 8;
const CHUNK_SIZE: usize = 64;
const PRODUCERS: usize = 3;
const CONSUMERS: usize = 2;
const ITEMS_PER_PRODUCER: usize = 20;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let ring = Arc::new(
        RingBuffer::with_config(Config::new(CAPACITY, CHUNK_SIZE, true))
            .expect("demo configuration is valid"),
    );
    let produced = Arc::new(AtomicUsize::new(0));
    let consumed = Arc::new(AtomicUsize::new(0));

    info!(
        capacity = ring.capacity(),
        chunk_size = ring.chunk_size(),
        producers = PRODUCERS,
        consumers = CONSUMERS,
        items_per_producer = ITEMS_PER_PRODUCER,
        "starting"
    );
    let start = Instant::now();

    let producer_handles: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let ring = Arc::clone(&ring);
            let produced = Arc::clone(&produced);
            thread::Builder::new()
                .name(format!("producer-{id}"))
                .spawn(move || {
                    let mut rng = rand::thread_rng();
                    for i in 0..ITEMS_PER_PRODUCER {
                        let value: u32 = rng.gen_range(1..=1000);
                        let Ok(mut slot) = ring.try_produce() else {
                            // ring full or contended: this item is skipped
                            continue;
                        };
                        let text = format!("P{id}-{i}-{value}");
                        slot.fill(
                            text.as_bytes(),
                            Signal::new(id as i32, f64::from(value) / 1000.0),
                        );
                        debug!(position = slot.position(), %text, "produced");
                        drop(slot);
                        produced.fetch_add(1, Ordering::Relaxed);
                    }
                })
                .expect("failed to spawn producer thread")
        })
        .collect();

    let consumer_handles: Vec<_> = (0..CONSUMERS)
        .map(|id| {
            let ring = Arc::clone(&ring);
            let consumed = Arc::clone(&consumed);
            thread::Builder::new()
                .name(format!("consumer-{id}"))
                .spawn(move || loop {
                    match ring.consume() {
                        Ok(slot) => {
                            debug!(
                                text = %String::from_utf8_lossy(slot.bytes()),
                                tag = slot.signal().tag,
                                value = slot.signal().value,
                                size = slot.len(),
                                lane0 = slot.lanes()[0],
                                "consumed"
                            );
                            consumed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(Unavailable::Stopped) => break,
                        Err(other) => debug!(?other, "consumer retry"),
                    }
                })
                .expect("failed to spawn consumer thread")
        })
        .collect();

    for handle in producer_handles {
        handle.join().expect("producer panicked");
    }
    ring.stop();
    for handle in consumer_handles {
        handle.join().expect("consumer panicked");
    }

    let elapsed = start.elapsed();
    let produced = produced.load(Ordering::Relaxed);
    let consumed = consumed.load(Ordering::Relaxed);
    let metrics = ring.metrics();

    info!(produced, consumed, ?elapsed, "finished");
    info!(
        producer_claims = metrics.producer_claims,
        commits = metrics.commits,
        consumer_claims = metrics.consumer_claims,
        releases = metrics.releases,
        unavailable = metrics.unavailable,
        backoff_snoozes = metrics.backoff_snoozes,
        "metrics"
    );
    assert_eq!(produced, consumed, "every committed chunk is consumed");
}
