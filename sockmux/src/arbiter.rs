//! Rotating-priority request arbiter.

/// Round-robin arbiter over `n` request ports.
///
/// The priority pointer marks the highest-priority port. Selection takes the
/// lowest-indexed pending request at or after the pointer, wrapping to the
/// lowest-indexed pending request overall when none remains at or after it.
/// Committing a grant rotates the pointer to one past the winner, so a port
/// that just won yields to every other pending port before winning again; a
/// port that keeps requesting is never starved.
#[derive(Debug)]
pub struct RoundRobinArbiter {
    n: usize,
    ptr: usize,
}

impl RoundRobinArbiter {
    /// Maximum number of ports, one per bit of the request vector.
    pub const MAX_PORTS: usize = u64::BITS as usize;

    /// Creates an arbiter over `n` ports with priority at port 0.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= n <= MAX_PORTS`.
    pub fn new(n: usize) -> Self {
        assert!(n >= 1, "arbiter needs at least one port");
        assert!(n <= Self::MAX_PORTS, "request vector holds at most {} ports", Self::MAX_PORTS);
        Self { n, ptr: 0 }
    }

    /// Selects the winner for `requests` without rotating the pointer.
    ///
    /// Bit `i` of `requests` means port `i` has a pending, not-yet-granted
    /// request. Returns `None` when no bit is set. The lowest-index rule is a
    /// total order, so ties are impossible.
    pub fn pick(&self, requests: u64) -> Option<usize> {
        debug_assert!(self.n == Self::MAX_PORTS || requests >> self.n == 0, "request bits past port count");
        if requests == 0 {
            return None;
        }
        let mask = !0u64 << self.ptr;
        let masked = requests & mask;
        let winner = if masked != 0 { masked.trailing_zeros() } else { requests.trailing_zeros() };
        Some(winner as usize)
    }

    /// Rotates priority to one past `winner` (mod the port count).
    ///
    /// Called only when the granted request actually moved downstream; a
    /// suppressed grant leaves the pointer in place.
    pub fn commit(&mut self, winner: usize) {
        debug_assert!(winner < self.n, "winner out of range");
        self.ptr = (winner + 1) % self.n;
    }

    /// Current priority pointer.
    pub fn pointer(&self) -> usize { self.ptr }

    /// Number of ports.
    pub fn ports(&self) -> usize { self.n }
}
