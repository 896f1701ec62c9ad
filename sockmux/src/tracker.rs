//! Grant tracker.

use thiserror::Error;

use crate::channel::Fifo;

/// A response arrived with no outstanding grant.
///
/// Either the device responds unsolicited or the tracker desynchronized from
/// the response channel. Fatal: there is no destination to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("response arrived with no outstanding grant")]
pub struct TrackerDesync;

/// FIFO record of which host won each committed grant.
///
/// One entry is recorded per request forwarded downstream and completed per
/// response routed back, so the fill level equals the number of in-flight
/// transactions. Capacity equals the device response-channel depth; the
/// socket withholds grants at capacity, which is what keeps a response from
/// ever arriving without buffering and without a recorded destination.
#[derive(Debug)]
pub struct GrantTracker {
    order: Fifo<usize>,
}

impl GrantTracker {
    /// Creates a tracker for at most `depth` in-flight transactions.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        Self { order: Fifo::new(depth) }
    }

    /// Records `host` as the winner of a committed grant.
    pub fn record(&mut self, host: usize) {
        let recorded = self.order.offer(host);
        debug_assert!(recorded, "grant recorded past the in-flight window");
    }

    /// Destination of the oldest in-flight transaction, if any.
    pub fn peek_destination(&self) -> Option<usize> { self.order.peek().copied() }

    /// Retires the oldest in-flight transaction, returning its destination.
    pub fn complete(&mut self) -> Result<usize, TrackerDesync> {
        self.order.pop().map_err(|_| TrackerDesync)
    }

    /// Number of in-flight transactions.
    pub fn in_flight(&self) -> usize { self.order.len() }

    /// Returns whether the in-flight window is exhausted.
    pub fn at_capacity(&self) -> bool { self.order.is_full() }

    /// Returns whether no transaction is in flight.
    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}
