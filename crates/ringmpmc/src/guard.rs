//! Scoped ticket handles that finalize exactly once.
//!
//! A guard wraps a successfully claimed ticket and commits (producer) or
//! releases (consumer) it when dropped, unless that already happened
//! explicitly. Early returns, `?` and unwinding panics therefore recycle the
//! slot instead of leaking it.
//!
//! Guards are neither `Clone` nor `Copy`. Moving one moves the duty to
//! finalize with it; the moved-from binding is statically dead.

use crate::{ReadTicket, WriteTicket};
use std::ops::{Deref, DerefMut};

/// Producer claim that commits on drop.
///
/// ```
/// use ringmpmc_rs::{RingBuffer, Signal};
///
/// let ring = RingBuffer::new(4, 64).unwrap();
/// if let Ok(mut slot) = ring.try_produce() {
///     slot.fill(b"hello", Signal::new(1, 0.25));
/// } // committed here
///
/// let slot = ring.try_consume().unwrap();
/// assert_eq!(slot.bytes(), b"hello");
/// ```
#[must_use = "dropping the guard commits the slot immediately"]
#[derive(Debug)]
pub struct ProducerGuard<'a> {
    ticket: WriteTicket<'a>,
    finalized: bool,
}

impl<'a> ProducerGuard<'a> {
    pub(crate) fn new(ticket: WriteTicket<'a>) -> Self {
        Self {
            ticket,
            finalized: false,
        }
    }

    /// Commits now instead of at scope exit.
    pub fn commit(mut self) {
        self.finalize();
    }

    fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            self.ticket.ring().publish_full(self.ticket.position());
        }
    }
}

impl<'a> Deref for ProducerGuard<'a> {
    type Target = WriteTicket<'a>;

    fn deref(&self) -> &Self::Target {
        &self.ticket
    }
}

impl DerefMut for ProducerGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ticket
    }
}

impl Drop for ProducerGuard<'_> {
    fn drop(&mut self) {
        self.finalize();
    }
}

/// Consumer claim that releases on drop.
#[must_use = "dropping the guard releases the slot immediately"]
#[derive(Debug)]
pub struct ConsumerGuard<'a> {
    ticket: ReadTicket<'a>,
    finalized: bool,
}

impl<'a> ConsumerGuard<'a> {
    pub(crate) fn new(ticket: ReadTicket<'a>) -> Self {
        Self {
            ticket,
            finalized: false,
        }
    }

    /// Releases now instead of at scope exit.
    pub fn release(mut self) {
        self.finalize();
    }

    fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            self.ticket.ring().publish_empty(self.ticket.position());
        }
    }
}

impl<'a> Deref for ConsumerGuard<'a> {
    type Target = ReadTicket<'a>;

    fn deref(&self) -> &Self::Target {
        &self.ticket
    }
}

impl Drop for ConsumerGuard<'_> {
    fn drop(&mut self) {
        self.finalize();
    }
}
