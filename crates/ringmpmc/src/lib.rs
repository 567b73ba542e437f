//! RingMPMC - Lock-Free Multi-Producer Multi-Consumer Chunk Ring
//!
//! A bounded circular queue of fixed-size byte chunks that any number of
//! producer and consumer threads share without locks. Each slot carries a
//! sequence counter; a compare-and-swap on the shared `tail` (producers) or
//! `head` (consumers) cursor hands a slot to exactly one thread, and a
//! Release store on the slot's counter publishes it to the other side.
//!
//! # Key Features
//!
//! - Zero-copy claim/commit/release tickets over preallocated chunk storage
//! - Non-blocking (`try_*`) and polling (spin → yield) claim disciplines
//! - Scoped guards that commit/release on every exit path
//! - One-way `stop()` that lets consumers drain what was already produced
//! - Cache-padded cursors, power-of-two masking, no allocation per operation
//!
//! # Example
//!
//! ```
//! use ringmpmc_rs::{RingBuffer, Signal};
//!
//! let ring = RingBuffer::new(8, 64).unwrap();
//!
//! // Ticket API: claim, write, commit
//! let mut ticket = ring.try_claim_producer().unwrap();
//! ticket.payload_mut()[..2].copy_from_slice(b"hi");
//! ticket.set_len(2);
//! ticket.set_signal(Signal::new(7, 0.5));
//! ring.commit_producer(ticket);
//!
//! // Scoped API: commits when the guard goes out of scope
//! ring.produce().unwrap().fill(b"there", Signal::default());
//!
//! // Consume: claim, read, release
//! let ticket = ring.try_claim_consumer().unwrap();
//! assert_eq!(ticket.bytes(), b"hi");
//! assert_eq!(ticket.signal().tag, 7);
//! ring.release_consumer(ticket);
//!
//! let consumed = ring.consume_available(|slot| {
//!     println!("Received: {:?}", slot.bytes());
//! });
//! assert_eq!(consumed, 1);
//!
//! ring.stop();
//! assert!(ring.try_claim_producer().unwrap_err().is_stopped());
//! ```

// Tracing macros - no-op when feature disabled
#[cfg(feature = "tracing")]
macro_rules! trace_debug { ($($arg:tt)*) => { tracing::debug!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug { ($($arg:tt)*) => {} }

#[cfg(feature = "tracing")]
macro_rules! trace_trace { ($($arg:tt)*) => { tracing::trace!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_trace { ($($arg:tt)*) => {} }

mod backoff;
mod config;
mod error;
mod guard;
mod invariants;
mod metrics;
mod ring;
mod ticket;

pub use backoff::Backoff;
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use error::{ConfigError, Unavailable};
pub use guard::{ConsumerGuard, ProducerGuard};
pub use metrics::MetricsSnapshot;
pub use ring::RingBuffer;
pub use ticket::{ReadTicket, Signal, WriteTicket};
