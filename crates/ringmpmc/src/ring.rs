use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_not_past_tail, debug_assert_readable,
    debug_assert_same_ring, debug_assert_writable,
};
use crate::metrics::Metrics;
use crate::{
    Backoff, Config, ConfigError, ConsumerGuard, MetricsSnapshot, ProducerGuard, ReadTicket,
    Signal, Unavailable, WriteTicket,
};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::cmp;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// =============================================================================
// SLOT SEQUENCE PROTOCOL
// =============================================================================
//
// Every slot carries a `sequence` counter. Positions are unbounded u64 values
// (`head` and `tail` never wrap in practice); a position addresses slot
// `position & mask`. The counter stores a stamp derived from the position a
// thread wants, with the low bit marking Full:
//
//   sequence == 2 * position                Empty, writable for this lap
//   sequence == 2 * position + 1            Full, readable
//   sequence == 2 * (position + capacity)   drained; Empty for the next lap
//
// The doubling keeps "Full at p" and "Empty at p + capacity" distinct even
// when `capacity == 1`.
//
// ## Claiming
//
// **Producer:** load `tail` (Relaxed), load the slot's `sequence` (Acquire),
// `diff = sequence - empty_stamp(tail)`. On `diff == 0` the slot is ours once
// the CAS `tail: pos -> pos + 1` succeeds. `diff < 0` means the previous
// lap's data is still unread (Full); `diff > 0` means another producer
// already moved past this position and our `tail` read is stale.
//
// **Consumer:** load `head` (Relaxed), load `sequence` (Acquire),
// `diff = sequence - full_stamp(head)`. On `diff == 0` the CAS
// `head: pos -> pos + 1` hands the slot to exactly one consumer. `diff < 0`
// means not committed yet (Empty); `diff > 0` means a stale `head` read.
//
// Any non-zero diff is retried by the blocking claims, never treated as an
// error.
//
// ## Publishing
//
// The cursor CAS only allocates the position; it publishes nothing and can
// be Relaxed. Payload visibility rides on the sequence counter alone:
//
// 1. Producer writes payload, lanes and metadata (plain stores)
// 2. Producer stores `sequence = full_stamp(pos)` with Release
// 3. Consumer loads `sequence` with Acquire and sees `full_stamp(pos)`
// 4. Consumer reads, then stores `empty_stamp(pos + capacity)` with Release
// 5. The next lap's producer loads that with Acquire before overwriting
//
// ## Shutdown
//
// `stopped` is a one-way flag. Producers check it before every attempt.
// Consumers only report `Stopped` once the flag is set and no claimed
// position is outstanding (`head == tail`), so slots whose producers were
// already in flight are still delivered.
//
// =============================================================================

/// Sequence value of a slot that is Empty for `position`.
#[inline]
pub(crate) const fn empty_stamp(position: u64) -> u64 {
    position.wrapping_mul(2)
}

/// Sequence value of a slot that is Full for `position`.
#[inline]
pub(crate) const fn full_stamp(position: u64) -> u64 {
    empty_stamp(position).wrapping_add(1)
}

/// Per-slot metadata written by the producer alongside the payload.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlotMeta {
    pub(crate) signal: Signal,
    pub(crate) len: usize,
}

/// One cell of the slot array: the sequence counter plus its metadata.
///
/// Allocated once at construction and never moved.
struct Slot {
    sequence: AtomicU64,
    meta: UnsafeCell<SlotMeta>,
}

impl Slot {
    fn new(position: u64) -> Self {
        Self {
            sequence: AtomicU64::new(empty_stamp(position)),
            meta: UnsafeCell::new(SlotMeta::default()),
        }
    }
}

/// Bounded lock-free MPMC ring buffer of fixed-size byte chunks.
///
/// Any number of threads may claim, commit and release concurrently through
/// a shared reference. No operation ever takes a lock or parks the thread;
/// the blocking claims spin and yield (see [`Backoff`]).
///
/// Each slot exposes three co-located views of one logical record:
/// - a payload of exactly `chunk_size` bytes (the source of truth)
/// - a secondary view of `lanes_per_chunk` `i16` lanes
/// - a [`Signal`] (integer tag, float value) and a byte count
pub struct RingBuffer {
    // === PRODUCER HOT ===
    /// Next position handed to a producer
    tail: CachePadded<AtomicU64>,

    // === CONSUMER HOT ===
    /// Next position handed to a consumer
    head: CachePadded<AtomicU64>,

    // === COLD STATE ===
    stopped: CachePadded<AtomicBool>,
    metrics: Metrics,
    config: Config,

    // === GEOMETRY === (fixed at construction)
    capacity: usize,
    mask: usize,
    chunk_size: usize,
    lanes_per_chunk: usize,

    // === STORAGE ===
    slots: Box<[Slot]>,
    payload: Box<[UnsafeCell<u8>]>,
    lanes: Box<[UnsafeCell<i16>]>,
}

// SAFETY: the storage cells behind `UnsafeCell` are only accessed by the
// thread holding the ticket for that slot. Ownership is handed over by the
// cursor CAS and published with Release/Acquire on the slot's sequence.
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Creates a ring buffer with `capacity` slots (rounded up to a power of
    /// two) of `chunk_size` bytes each.
    pub fn new(capacity: usize, chunk_size: usize) -> Result<Self, ConfigError> {
        Self::with_config(Config::new(capacity, chunk_size, false))
    }

    /// Creates a ring buffer from a full configuration.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        if config.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        let overflow = ConfigError::StorageOverflow {
            capacity: config.capacity,
            chunk_size: config.chunk_size,
        };

        let capacity = config.capacity().ok_or(overflow)?;
        let lanes_per_chunk = config.lanes_per_chunk();
        let payload_len = capacity.checked_mul(config.chunk_size).ok_or(overflow)?;
        let lanes_len = capacity.checked_mul(lanes_per_chunk).ok_or(overflow)?;

        // All slots start Empty for lap 0: stamped with their own index.
        let slots = (0..capacity as u64).map(Slot::new).collect();
        let payload = (0..payload_len).map(|_| UnsafeCell::new(0)).collect();
        let lanes = (0..lanes_len).map(|_| UnsafeCell::new(0)).collect();

        trace_debug!(
            capacity,
            chunk_size = config.chunk_size,
            lanes_per_chunk,
            "ring buffer constructed"
        );

        Ok(Self {
            tail: CachePadded::new(AtomicU64::new(0)),
            head: CachePadded::new(AtomicU64::new(0)),
            stopped: CachePadded::new(AtomicBool::new(false)),
            metrics: Metrics::new(),
            config,
            capacity,
            mask: capacity - 1,
            chunk_size: config.chunk_size,
            lanes_per_chunk,
            slots,
            payload,
            lanes,
        })
    }

    // ---------------------------------------------------------------------
    // CONSTANTS & STATUS
    // ---------------------------------------------------------------------

    /// Returns the effective (power of two) slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the index mask (`capacity - 1`).
    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Returns the payload chunk size in bytes.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of `i16` lanes in each slot's secondary view.
    #[inline]
    pub fn lanes_per_chunk(&self) -> usize {
        self.lanes_per_chunk
    }

    /// Returns the configuration this buffer was built from.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Returns the number of positions claimed by producers and not yet
    /// claimed by consumers. Approximate under concurrency.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        cmp::min(tail.saturating_sub(head) as usize, self.capacity)
    }

    /// Returns true if no position is outstanding. Approximate under concurrency.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once [`stop`](Self::stop) has been called.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    #[inline]
    pub(crate) fn index(&self, position: u64) -> usize {
        (position as usize) & self.mask
    }

    #[inline]
    fn slot(&self, position: u64) -> &Slot {
        &self.slots[self.index(position)]
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Claims the next slot for writing with a single attempt.
    ///
    /// Never spins: returns [`Unavailable::Full`] if the slot still holds
    /// unread data, [`Unavailable::Contended`] if another producer took the
    /// position first, and [`Unavailable::Stopped`] after [`stop`](Self::stop).
    ///
    /// The returned ticket must be passed to
    /// [`commit_producer`](Self::commit_producer), or the slot is never
    /// published and consumers stall on it. Prefer [`try_produce`](Self::try_produce).
    pub fn try_claim_producer(&self) -> Result<WriteTicket<'_>, Unavailable> {
        let claimed = self.attempt_producer();
        self.record_producer_claim(&claimed);
        claimed.map(|position| WriteTicket::new(self, position))
    }

    /// Claims the next slot for writing, polling until one is free.
    ///
    /// # Polling contract
    ///
    /// The calling thread stays in a retry loop: it spins with exponential
    /// backoff for the first 16 retries and yields to the scheduler on every
    /// retry after that. It never blocks on a mutex or an OS wait primitive.
    /// The loop ends with a ticket, or with [`Unavailable::Stopped`] once the
    /// buffer is stopped.
    pub fn claim_producer(&self) -> Result<WriteTicket<'_>, Unavailable> {
        let claimed = self.poll_until_available(|| self.attempt_producer());
        self.record_producer_claim(&claimed);
        claimed.map(|position| WriteTicket::new(self, position))
    }

    /// Publishes a written slot to consumers.
    ///
    /// All writes made through the ticket happen-before the consumer that
    /// later claims this position observes them.
    pub fn commit_producer(&self, ticket: WriteTicket<'_>) {
        debug_assert_same_ring!(self, ticket.ring());
        self.publish_full(ticket.position());
    }

    /// One claim attempt: on success `tail` has moved past the returned position.
    fn attempt_producer(&self) -> Result<u64, Unavailable> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(Unavailable::Stopped);
        }

        let position = self.tail.load(Ordering::Relaxed);
        let sequence = self.slot(position).sequence.load(Ordering::Acquire);
        let diff = sequence.wrapping_sub(empty_stamp(position)) as i64;

        match diff.cmp(&0) {
            cmp::Ordering::Equal => {
                self.tail
                    .compare_exchange(
                        position,
                        position.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .map_err(|_| Unavailable::Contended)?;

                debug_assert_bounded_count!(
                    position
                        .wrapping_add(1)
                        .wrapping_sub(self.head.load(Ordering::Relaxed)),
                    self.capacity as u64
                );
                Ok(position)
            }
            cmp::Ordering::Less => Err(Unavailable::Full),
            cmp::Ordering::Greater => Err(Unavailable::Contended),
        }
    }

    /// Empty -> Full: `sequence = full_stamp(position)` with Release.
    pub(crate) fn publish_full(&self, position: u64) {
        let slot = self.slot(position);
        debug_assert_writable!(slot.sequence.load(Ordering::Relaxed), position);

        slot.sequence.store(full_stamp(position), Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_commits(1);
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Claims the next full slot for reading with a single attempt.
    ///
    /// Never spins: returns [`Unavailable::Empty`] if nothing is committed at
    /// the head position, [`Unavailable::Contended`] if another consumer took
    /// it first, and [`Unavailable::Stopped`] once the buffer is stopped and
    /// drained.
    ///
    /// The returned ticket must be passed to
    /// [`release_consumer`](Self::release_consumer), or the slot is never
    /// reused. Prefer [`try_consume`](Self::try_consume).
    pub fn try_claim_consumer(&self) -> Result<ReadTicket<'_>, Unavailable> {
        let claimed = self.attempt_consumer();
        self.record_consumer_claim(&claimed);
        claimed.map(|position| ReadTicket::new(self, position))
    }

    /// Claims the next full slot for reading, polling until one is committed.
    ///
    /// Same polling contract as [`claim_producer`](Self::claim_producer).
    /// Ends with [`Unavailable::Stopped`] only once the buffer is stopped and
    /// every claimed position has been consumed.
    pub fn claim_consumer(&self) -> Result<ReadTicket<'_>, Unavailable> {
        let claimed = self.poll_until_available(|| self.attempt_consumer());
        self.record_consumer_claim(&claimed);
        claimed.map(|position| ReadTicket::new(self, position))
    }

    /// Returns a read slot to producers for its next lap.
    pub fn release_consumer(&self, ticket: ReadTicket<'_>) {
        debug_assert_same_ring!(self, ticket.ring());
        self.publish_empty(ticket.position());
    }

    /// One claim attempt: on success `head` has moved past the returned position.
    fn attempt_consumer(&self) -> Result<u64, Unavailable> {
        let position = self.head.load(Ordering::Relaxed);
        let sequence = self.slot(position).sequence.load(Ordering::Acquire);
        let diff = sequence.wrapping_sub(full_stamp(position)) as i64;

        match diff.cmp(&0) {
            cmp::Ordering::Equal => {
                self.head
                    .compare_exchange(
                        position,
                        position.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .map_err(|_| Unavailable::Contended)?;

                debug_assert_head_not_past_tail!(
                    position.wrapping_add(1),
                    self.tail.load(Ordering::Relaxed)
                );
                Ok(position)
            }
            cmp::Ordering::Less if self.is_drained(position) => Err(Unavailable::Stopped),
            cmp::Ordering::Less => Err(Unavailable::Empty),
            cmp::Ordering::Greater => Err(Unavailable::Contended),
        }
    }

    /// Stopped, and no producer holds a position at or after `head`.
    fn is_drained(&self, head: u64) -> bool {
        self.stopped.load(Ordering::Acquire) && self.tail.load(Ordering::Acquire) == head
    }

    /// Full -> Empty(next lap): `sequence = empty_stamp(position + capacity)`
    /// with Release.
    pub(crate) fn publish_empty(&self, position: u64) {
        let slot = self.slot(position);
        debug_assert_readable!(slot.sequence.load(Ordering::Relaxed), position);

        let next_lap = position.wrapping_add(self.capacity as u64);
        slot.sequence.store(empty_stamp(next_lap), Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_releases(1);
        }
    }

    // ---------------------------------------------------------------------
    // SCOPED CLAIMS
    // ---------------------------------------------------------------------

    /// Non-blocking claim whose guard commits on drop.
    pub fn try_produce(&self) -> Result<ProducerGuard<'_>, Unavailable> {
        self.try_claim_producer().map(ProducerGuard::new)
    }

    /// Polling claim whose guard commits on drop.
    pub fn produce(&self) -> Result<ProducerGuard<'_>, Unavailable> {
        self.claim_producer().map(ProducerGuard::new)
    }

    /// Non-blocking claim whose guard releases on drop.
    pub fn try_consume(&self) -> Result<ConsumerGuard<'_>, Unavailable> {
        self.try_claim_consumer().map(ConsumerGuard::new)
    }

    /// Polling claim whose guard releases on drop.
    pub fn consume(&self) -> Result<ConsumerGuard<'_>, Unavailable> {
        self.claim_consumer().map(ConsumerGuard::new)
    }

    // ---------------------------------------------------------------------
    // CONVENIENCE WRAPPERS
    // ---------------------------------------------------------------------

    /// Writes one record, polling for a free slot.
    ///
    /// Copies up to `chunk_size` bytes, mirrors them into the lanes, records
    /// the byte count and `signal`, then commits. Returns the number of bytes
    /// stored.
    pub fn push(&self, bytes: &[u8], signal: Signal) -> Result<usize, Unavailable> {
        let mut ticket = self.claim_producer()?;
        let written = ticket.fill(bytes, signal);
        self.commit_producer(ticket);
        Ok(written)
    }

    /// Writes one record if a slot is free right now.
    pub fn try_push(&self, bytes: &[u8], signal: Signal) -> Result<usize, Unavailable> {
        let mut ticket = self.try_claim_producer()?;
        let written = ticket.fill(bytes, signal);
        self.commit_producer(ticket);
        Ok(written)
    }

    /// Drains every slot that is full right now, without waiting.
    ///
    /// Each slot is released after `handler` returns, or while unwinding if
    /// it panics. Returns the number of slots handled.
    pub fn consume_available<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(&ReadTicket<'_>),
    {
        let mut count = 0;
        loop {
            match self.try_consume() {
                Ok(guard) => {
                    handler(&guard);
                    count += 1;
                }
                Err(Unavailable::Contended) => continue,
                Err(_) => break,
            }
        }
        count
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Stops the buffer. One-way.
    ///
    /// Every later producer claim reports [`Unavailable::Stopped`]. Consumers
    /// keep receiving the slots that are full (or being filled by producers
    /// already past their claim) and see `Stopped` once those are drained.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::Release) {
            trace_debug!(
                head = self.head.load(Ordering::Relaxed),
                tail = self.tail.load(Ordering::Relaxed),
                "ring buffer stopped"
            );
        }
    }

    // ---------------------------------------------------------------------
    // INTERNALS
    // ---------------------------------------------------------------------

    /// Retries `attempt` with [`Backoff`] until it succeeds or reports `Stopped`.
    fn poll_until_available<F>(&self, mut attempt: F) -> Result<u64, Unavailable>
    where
        F: FnMut() -> Result<u64, Unavailable>,
    {
        let mut backoff = Backoff::new();
        let mut snoozes = 0u64;
        loop {
            match attempt() {
                Err(Unavailable::Full | Unavailable::Empty | Unavailable::Contended) => {
                    backoff.snooze();
                    snoozes += 1;
                }
                done => {
                    if self.config.enable_metrics && snoozes > 0 {
                        self.metrics.add_backoff_snoozes(snoozes);
                    }
                    return done;
                }
            }
        }
    }

    fn record_producer_claim(&self, claimed: &Result<u64, Unavailable>) {
        if self.config.enable_metrics {
            match claimed {
                Ok(_) => self.metrics.add_producer_claims(1),
                Err(_) => self.metrics.add_unavailable(1),
            }
        }
    }

    fn record_consumer_claim(&self, claimed: &Result<u64, Unavailable>) {
        if self.config.enable_metrics {
            match claimed {
                Ok(_) => self.metrics.add_consumer_claims(1),
                Err(_) => self.metrics.add_unavailable(1),
            }
        }
    }

    /// Start of the payload chunk for `position`.
    pub(crate) fn payload_ptr(&self, position: u64) -> *mut u8 {
        let start = self.index(position) * self.chunk_size;
        UnsafeCell::raw_get(self.payload[start..start + self.chunk_size].as_ptr())
    }

    /// Start of the lane chunk for `position`.
    pub(crate) fn lanes_ptr(&self, position: u64) -> *mut i16 {
        let start = self.index(position) * self.lanes_per_chunk;
        UnsafeCell::raw_get(self.lanes[start..start + self.lanes_per_chunk].as_ptr())
    }

    /// Metadata cell for `position`.
    pub(crate) fn meta_ptr(&self, position: u64) -> *mut SlotMeta {
        self.slot(position).meta.get()
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("chunk_size", &self.chunk_size)
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence_at(ring: &RingBuffer, index: usize) -> u64 {
        ring.slots[index].sequence.load(Ordering::Relaxed)
    }

    #[test]
    fn test_new_initializes_sequences_to_index() {
        let ring = RingBuffer::new(5, 16).unwrap();

        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.mask(), 7);
        for i in 0..8 {
            assert_eq!(sequence_at(&ring, i), empty_stamp(i as u64));
        }
        assert!(ring.is_empty());
        assert!(!ring.is_stopped());
    }

    #[test]
    fn test_new_rejects_zero_chunk() {
        assert_eq!(RingBuffer::new(4, 0).unwrap_err(), ConfigError::ZeroChunkSize);
    }

    #[test]
    fn test_new_rejects_unroundable_capacity() {
        let err = RingBuffer::new(usize::MAX, 1).unwrap_err();
        assert_eq!(
            err,
            ConfigError::StorageOverflow {
                capacity: usize::MAX,
                chunk_size: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_overflowing_storage() {
        let err = RingBuffer::new(usize::MAX / 2, 4).unwrap_err();
        assert!(matches!(err, ConfigError::StorageOverflow { .. }));
    }

    #[test]
    fn test_one_byte_chunk_still_has_a_lane() {
        let ring = RingBuffer::new(2, 1).unwrap();
        assert_eq!(ring.lanes_per_chunk(), 1);

        let mut ticket = ring.try_claim_producer().unwrap();
        assert_eq!(ticket.payload_mut().len(), 1);
        assert_eq!(ticket.lanes_mut().len(), 1);
        ring.commit_producer(ticket);
    }

    #[test]
    fn test_sequence_state_machine() {
        let ring = RingBuffer::new(4, 8).unwrap();

        let ticket = ring.try_claim_producer().unwrap();
        assert_eq!(ticket.position(), 0);
        // claim does not touch the sequence
        assert_eq!(sequence_at(&ring, 0), empty_stamp(0));

        ring.commit_producer(ticket);
        assert_eq!(sequence_at(&ring, 0), full_stamp(0));

        let ticket = ring.try_claim_consumer().unwrap();
        assert_eq!(ticket.position(), 0);
        ring.release_consumer(ticket);
        assert_eq!(sequence_at(&ring, 0), empty_stamp(4));
    }

    #[test]
    fn test_single_slot_full_is_not_next_lap_empty() {
        let ring = RingBuffer::new(1, 8).unwrap();
        assert_eq!(ring.capacity(), 1);

        assert_eq!(ring.try_push(b"first", Signal::default()), Ok(5));
        assert_eq!(
            ring.try_push(b"second", Signal::default()),
            Err(Unavailable::Full)
        );
        assert_eq!(sequence_at(&ring, 0), full_stamp(0));

        let read = ring.try_claim_consumer().unwrap();
        assert_eq!(read.bytes(), b"first");
        ring.release_consumer(read);
        assert_eq!(sequence_at(&ring, 0), empty_stamp(1));
        assert_eq!(ring.try_claim_consumer().unwrap_err(), Unavailable::Empty);

        assert_eq!(ring.try_push(b"second", Signal::default()), Ok(6));
        let read = ring.try_claim_consumer().unwrap();
        assert_eq!(read.bytes(), b"second");
        ring.release_consumer(read);
    }

    #[test]
    fn test_producer_reports_full_then_consumer_frees() {
        let ring = RingBuffer::new(2, 8).unwrap();

        for _ in 0..2 {
            let ticket = ring.try_claim_producer().unwrap();
            ring.commit_producer(ticket);
        }
        assert_eq!(ring.try_claim_producer().unwrap_err(), Unavailable::Full);
        assert_eq!(ring.len(), 2);

        let ticket = ring.try_claim_consumer().unwrap();
        ring.release_consumer(ticket);

        let ticket = ring.try_claim_producer().unwrap();
        assert_eq!(ticket.position(), 2);
        assert_eq!(ticket.index(), 0);
        ring.commit_producer(ticket);
    }

    #[test]
    fn test_consumer_reports_empty_until_commit() {
        let ring = RingBuffer::new(4, 8).unwrap();
        assert_eq!(ring.try_claim_consumer().unwrap_err(), Unavailable::Empty);

        // claimed but uncommitted is still Empty for consumers
        let ticket = ring.try_claim_producer().unwrap();
        assert_eq!(ring.try_claim_consumer().unwrap_err(), Unavailable::Empty);

        ring.commit_producer(ticket);
        assert!(ring.try_claim_consumer().is_ok());
    }

    #[test]
    fn test_stop_with_outstanding_producer_is_not_drained() {
        let ring = RingBuffer::new(4, 8).unwrap();
        let ticket = ring.try_claim_producer().unwrap();
        ring.stop();

        // producer is in flight, so consumers must keep waiting for it
        assert_eq!(ring.try_claim_consumer().unwrap_err(), Unavailable::Empty);
        ring.commit_producer(ticket);

        let read = ring.try_claim_consumer().unwrap();
        ring.release_consumer(read);
        assert_eq!(ring.try_claim_consumer().unwrap_err(), Unavailable::Stopped);
    }

    #[test]
    fn test_metrics_collected_when_enabled() {
        let ring = RingBuffer::with_config(Config::new(2, 8, true)).unwrap();

        ring.try_push(b"a", Signal::default()).unwrap();
        ring.try_push(b"b", Signal::default()).unwrap();
        assert!(ring.try_push(b"c", Signal::default()).is_err());
        assert_eq!(ring.consume_available(|_| {}), 2);

        let m = ring.metrics();
        assert_eq!(m.producer_claims, 2);
        assert_eq!(m.commits, 2);
        assert_eq!(m.consumer_claims, 2);
        assert_eq!(m.releases, 2);
        // one Full producer claim, one Empty consumer claim ending the drain
        assert_eq!(m.unavailable, 2);
    }

    #[test]
    fn test_metrics_disabled_by_default() {
        let ring = RingBuffer::new(2, 8).unwrap();
        ring.try_push(b"a", Signal::default()).unwrap();
        assert_eq!(ring.metrics(), MetricsSnapshot::default());
    }

    #[test]
    fn test_debug_output() {
        let ring = RingBuffer::new(3, 8).unwrap();
        let text = format!("{:?}", ring);
        assert!(text.contains("capacity: 4"));
        assert!(text.contains("stopped: false"));
    }
}
