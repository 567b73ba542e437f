use thiserror::Error;

/// Error returned when a [`RingBuffer`](crate::RingBuffer) cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A chunk must hold at least one byte.
    #[error("chunk size must be at least one byte")]
    ZeroChunkSize,
    /// The payload storage (`capacity * chunk_size`) does not fit in memory.
    #[error("storage for {capacity} slots of {chunk_size} bytes overflows usize")]
    StorageOverflow {
        /// The requested slot count.
        capacity: usize,
        /// The requested chunk size.
        chunk_size: usize,
    },
}

/// Why a claim could not hand out a slot.
///
/// None of these are failures of the buffer. They are the normal
/// "no slot for you right now" signal: skip, retry later, or leave the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unavailable {
    /// Producer side: the next slot still holds data no consumer has released.
    #[error("ring buffer is full")]
    Full,
    /// Consumer side: the next slot has not been committed yet.
    #[error("ring buffer is empty")]
    Empty,
    /// Another thread won the cursor for this position first.
    #[error("slot was claimed by another thread")]
    Contended,
    /// The buffer was stopped (for consumers: stopped and fully drained).
    #[error("ring buffer is stopped")]
    Stopped,
}

impl Unavailable {
    /// Returns true if no further claim on this side can ever succeed.
    #[inline]
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}
