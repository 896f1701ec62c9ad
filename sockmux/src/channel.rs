//! Bounded transaction channel.

use std::collections::VecDeque;

use thiserror::Error;

/// Popped an empty channel.
///
/// Indicates a caller-side contract violation: callers check `is_empty` (or
/// `peek`) before popping, so this error never occurs in correct usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pop from an empty channel")]
pub struct UnderflowError;

/// Fixed-depth ordered buffer with full/empty signaling.
///
/// Models one direction of a link's buffering. An offer to a full channel is
/// refused with no side effect; contents are never overwritten. Depth is fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct Fifo<T> {
    slots: VecDeque<T>,
    depth: usize,
}

impl<T> Fifo<T> {
    /// Creates a channel with `depth` slots.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "channel depth must be nonzero");
        Self { slots: VecDeque::with_capacity(depth), depth }
    }

    /// Accepts `item` iff the channel is not full; returns whether accepted.
    ///
    /// A refused offer leaves both `item`'s slot and the channel untouched;
    /// the producer retries on a later cycle.
    #[must_use]
    pub fn offer(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push_back(item);
        true
    }

    /// Returns the head without removing it.
    pub fn peek(&self) -> Option<&T> { self.slots.front() }

    /// Removes and returns the head.
    pub fn pop(&mut self) -> Result<T, UnderflowError> { self.slots.pop_front().ok_or(UnderflowError) }

    /// Number of occupied slots.
    pub fn len(&self) -> usize { self.slots.len() }

    /// Returns whether no slot is occupied.
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Returns whether every slot is occupied.
    pub fn is_full(&self) -> bool { self.slots.len() == self.depth }

    /// Total slot count, fixed at construction.
    pub fn depth(&self) -> usize { self.depth }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offers_until_full() {
        let mut fifo = Fifo::new(2);
        assert!(fifo.offer(10));
        assert!(fifo.offer(20));
        assert!(fifo.is_full());
        assert!(!fifo.offer(30));
    }

    #[test]
    fn refused_offer_has_no_side_effect() {
        let mut fifo = Fifo::new(1);
        assert!(fifo.offer(1));
        assert!(!fifo.offer(2));
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop(), Ok(1));
    }

    #[test]
    fn pops_in_fifo_order() {
        let mut fifo = Fifo::new(3);
        for v in [1, 2, 3] {
            assert!(fifo.offer(v));
        }
        assert_eq!(fifo.pop(), Ok(1));
        assert_eq!(fifo.pop(), Ok(2));
        assert!(fifo.offer(4));
        assert_eq!(fifo.pop(), Ok(3));
        assert_eq!(fifo.pop(), Ok(4));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut fifo = Fifo::new(2);
        assert!(fifo.offer(7));
        assert_eq!(fifo.peek(), Some(&7));
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop(), Ok(7));
    }

    #[test]
    fn pop_on_empty_underflows() {
        let mut fifo = Fifo::<u8>::new(1);
        assert_eq!(fifo.pop(), Err(UnderflowError));
    }

    #[test]
    #[should_panic(expected = "depth must be nonzero")]
    fn zero_depth_is_rejected() {
        let _ = Fifo::<u8>::new(0);
    }
}
