//! Debug assertion macros for the slot sequence protocol.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead
//! in release builds. They catch caller contract violations (finalizing a
//! ticket twice through the raw API, finalizing a ticket on the wrong buffer)
//! and protocol bugs alike.

// =============================================================================
// Slot state at finalize time
// =============================================================================

/// Assert that a slot is still Empty for `position` when its producer commits.
///
/// **Invariant**: only the producer holding `position` moves `sequence` off
/// `empty_stamp(position)`, so it still holds that value at commit time.
///
/// Used in: `RingBuffer::publish_full()`
macro_rules! debug_assert_writable {
    ($sequence:expr, $position:expr) => {
        debug_assert!(
            $sequence == $crate::ring::empty_stamp($position),
            "commit of position {} found slot sequence {} (expected {})",
            $position,
            $sequence,
            $crate::ring::empty_stamp($position)
        )
    };
}

/// Assert that a slot is still Full for `position` when its consumer releases.
///
/// **Invariant**: at release time `sequence == full_stamp(position)`.
///
/// Used in: `RingBuffer::publish_empty()`
macro_rules! debug_assert_readable {
    ($sequence:expr, $position:expr) => {
        debug_assert!(
            $sequence == $crate::ring::full_stamp($position),
            "release of position {} found slot sequence {} (expected {})",
            $position,
            $sequence,
            $crate::ring::full_stamp($position)
        )
    };
}

// =============================================================================
// Cursor ordering
// =============================================================================

/// Assert that the consumer cursor never passes the producer cursor.
///
/// **Invariant**: `head ≤ tail`
///
/// Used in: consumer claims after winning the head CAS
macro_rules! debug_assert_head_not_past_tail {
    ($new_head:expr, $tail:expr) => {
        debug_assert!(
            $new_head <= $tail,
            "advancing head {} beyond tail {}",
            $new_head,
            $tail
        )
    };
}

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ (tail - head) ≤ capacity`
///
/// Used in: producer claims after winning the tail CAS
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "claimed count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Ticket ownership
// =============================================================================

/// Assert that a ticket is finalized on the buffer that issued it.
///
/// Used in: `commit_producer()`, `release_consumer()`
macro_rules! debug_assert_same_ring {
    ($ring:expr, $ticket_ring:expr) => {
        debug_assert!(
            std::ptr::eq($ring, $ticket_ring),
            "ticket finalized on a ring buffer that did not issue it"
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_not_past_tail;
pub(crate) use debug_assert_readable;
pub(crate) use debug_assert_same_ring;
pub(crate) use debug_assert_writable;
