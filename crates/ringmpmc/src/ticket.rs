//! Borrowed views of one claimed slot.
//!
//! A ticket is the transient, exclusive right to one slot's bytes between a
//! claim and the matching commit (producer) or release (consumer). It holds
//! no storage of its own: just the issuing buffer and the claimed position.
//! Every view it hands out borrows the ticket, and commit/release consume
//! the ticket, so no view can outlive the claim.

use crate::ring::SlotMeta;
use crate::RingBuffer;
use std::fmt;
use std::slice;

/// Per-slot metadata pair: an integer tag and a floating point value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signal {
    pub tag: i32,
    pub value: f64,
}

impl Signal {
    pub const fn new(tag: i32, value: f64) -> Self {
        Self { tag, value }
    }
}

/// Writable view of a slot claimed by a producer.
///
/// Obtained from [`RingBuffer::try_claim_producer`] or
/// [`RingBuffer::claim_producer`]; published with
/// [`RingBuffer::commit_producer`]. Dropping it without committing leaves the
/// position unpublished forever; use [`ProducerGuard`](crate::ProducerGuard)
/// when early exits are possible.
#[must_use = "a claimed slot that is never committed stalls every consumer behind it"]
pub struct WriteTicket<'a> {
    ring: &'a RingBuffer,
    position: u64,
}

impl<'a> WriteTicket<'a> {
    pub(crate) fn new(ring: &'a RingBuffer, position: u64) -> Self {
        Self { ring, position }
    }

    pub(crate) fn ring(&self) -> &'a RingBuffer {
        self.ring
    }

    /// Global position of this claim.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Physical slot index (`position & mask`).
    #[inline]
    pub fn index(&self) -> usize {
        self.ring.index(self.position)
    }

    /// The whole payload chunk, exactly `chunk_size` bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        // SAFETY: this ticket holds the only claim on the slot (cursor CAS);
        // the pointer covers `chunk_size` initialized bytes of that slot.
        unsafe { slice::from_raw_parts(self.ring.payload_ptr(self.position), self.ring.chunk_size()) }
    }

    /// The whole payload chunk, writable.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `payload`; `&mut self` keeps the view unique.
        unsafe {
            slice::from_raw_parts_mut(self.ring.payload_ptr(self.position), self.ring.chunk_size())
        }
    }

    /// The slot's secondary `i16` view.
    #[inline]
    pub fn lanes(&self) -> &[i16] {
        // SAFETY: exclusive claim; pointer covers `lanes_per_chunk` lanes.
        unsafe {
            slice::from_raw_parts(self.ring.lanes_ptr(self.position), self.ring.lanes_per_chunk())
        }
    }

    /// The slot's secondary `i16` view, writable.
    #[inline]
    pub fn lanes_mut(&mut self) -> &mut [i16] {
        // SAFETY: exclusive claim; `&mut self` keeps the view unique.
        unsafe {
            slice::from_raw_parts_mut(
                self.ring.lanes_ptr(self.position),
                self.ring.lanes_per_chunk(),
            )
        }
    }

    /// Current metadata pair of the slot.
    #[inline]
    pub fn signal(&self) -> Signal {
        self.meta().signal
    }

    #[inline]
    pub fn set_signal(&mut self, signal: Signal) {
        self.meta_mut().signal = signal;
    }

    /// Number of payload bytes marked valid.
    #[inline]
    pub fn len(&self) -> usize {
        self.meta().len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records how many payload bytes are valid.
    ///
    /// `len` must not exceed the chunk size.
    #[inline]
    pub fn set_len(&mut self, len: usize) {
        debug_assert!(
            len <= self.ring.chunk_size(),
            "byte count {} exceeds chunk size {}",
            len,
            self.ring.chunk_size()
        );
        self.meta_mut().len = len;
    }

    /// Copies `bytes` (truncated to the chunk size) into the payload, records
    /// the byte count and `signal`, and mirrors the bytes into the lanes.
    ///
    /// Returns the number of bytes stored.
    pub fn fill(&mut self, bytes: &[u8], signal: Signal) -> usize {
        let n = bytes.len().min(self.ring.chunk_size());
        self.payload_mut()[..n].copy_from_slice(&bytes[..n]);
        self.set_len(n);
        self.set_signal(signal);
        self.mirror_lanes();
        n
    }

    /// Copies the valid payload bytes into the lanes (native byte order),
    /// zero-filling the lanes past them.
    pub fn mirror_lanes(&mut self) {
        let len = self.len();
        // SAFETY: payload and lanes are separate allocations, both exclusively
        // ours through the claim; `&mut self` keeps the views unique.
        let (payload, lanes) = unsafe {
            (
                slice::from_raw_parts(self.ring.payload_ptr(self.position), len),
                slice::from_raw_parts_mut(
                    self.ring.lanes_ptr(self.position),
                    self.ring.lanes_per_chunk(),
                ),
            )
        };

        let mut pairs = payload.chunks(2);
        for lane in lanes.iter_mut() {
            *lane = match pairs.next() {
                Some(&[lo, hi]) => i16::from_ne_bytes([lo, hi]),
                Some(&[lo]) => i16::from_ne_bytes([lo, 0]),
                _ => 0,
            };
        }
    }

    fn meta(&self) -> &SlotMeta {
        // SAFETY: exclusive claim on the slot's metadata cell.
        unsafe { &*self.ring.meta_ptr(self.position) }
    }

    fn meta_mut(&mut self) -> &mut SlotMeta {
        // SAFETY: exclusive claim; `&mut self` keeps the reference unique.
        unsafe { &mut *self.ring.meta_ptr(self.position) }
    }
}

impl fmt::Debug for WriteTicket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTicket")
            .field("position", &self.position)
            .field("len", &self.len())
            .field("signal", &self.signal())
            .finish()
    }
}

/// Read-only view of a slot claimed by a consumer.
///
/// Obtained from [`RingBuffer::try_claim_consumer`] or
/// [`RingBuffer::claim_consumer`]; returned to producers with
/// [`RingBuffer::release_consumer`]. Dropping it without releasing retires
/// the slot for good; use [`ConsumerGuard`](crate::ConsumerGuard) when early
/// exits are possible.
#[must_use = "a claimed slot that is never released is lost to producers"]
pub struct ReadTicket<'a> {
    ring: &'a RingBuffer,
    position: u64,
}

impl<'a> ReadTicket<'a> {
    pub(crate) fn new(ring: &'a RingBuffer, position: u64) -> Self {
        Self { ring, position }
    }

    pub(crate) fn ring(&self) -> &'a RingBuffer {
        self.ring
    }

    /// Global position of this claim.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Physical slot index (`position & mask`).
    #[inline]
    pub fn index(&self) -> usize {
        self.ring.index(self.position)
    }

    /// The whole payload chunk, exactly `chunk_size` bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        // SAFETY: the producer's Release store of the Full stamp was observed
        // with Acquire before this ticket existed, and no producer writes the
        // slot again until this ticket is released.
        unsafe { slice::from_raw_parts(self.ring.payload_ptr(self.position), self.ring.chunk_size()) }
    }

    /// The valid prefix of the payload (`payload()[..len()]`).
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        let len = self.len().min(self.ring.chunk_size());
        &self.payload()[..len]
    }

    /// The slot's secondary `i16` view.
    #[inline]
    pub fn lanes(&self) -> &[i16] {
        // SAFETY: see `payload`.
        unsafe {
            slice::from_raw_parts(self.ring.lanes_ptr(self.position), self.ring.lanes_per_chunk())
        }
    }

    #[inline]
    pub fn signal(&self) -> Signal {
        self.meta().signal
    }

    /// Number of payload bytes the producer marked valid.
    #[inline]
    pub fn len(&self) -> usize {
        self.meta().len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn meta(&self) -> &SlotMeta {
        // SAFETY: see `payload`.
        unsafe { &*self.ring.meta_ptr(self.position) }
    }
}

impl fmt::Debug for ReadTicket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadTicket")
            .field("position", &self.position)
            .field("len", &self.len())
            .field("signal", &self.signal())
            .finish()
    }
}
