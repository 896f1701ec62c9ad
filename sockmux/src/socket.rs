//! Socket multiplexer.

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::arbiter::RoundRobinArbiter;
use crate::channel::Fifo;
use crate::router::{self, Fault};
use crate::tracker::GrantTracker;

/// Construction-time configuration error. Never tolerated silently.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a socket needs at least one host port")]
    NoHosts,
    #[error("host count {0} does not fit the request vector")]
    TooManyHosts(usize),
    #[error("{0} depth must be nonzero")]
    ZeroDepth(&'static str),
    #[error("tracker depth {tracker} does not match device response depth {device_rsp}")]
    TrackerDepthMismatch { tracker: usize, device_rsp: usize },
}

/// Buffer sizing for a socket. All depths are in transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConfig {
    /// Number of host ports (N).
    pub hosts: usize,
    /// Outbound request queue depth per host.
    pub host_req_depth: usize,
    /// Inbound response queue depth per host.
    pub host_rsp_depth: usize,
    /// Device request queue depth.
    pub device_req_depth: usize,
    /// Device response queue depth; bounds the in-flight window.
    pub device_rsp_depth: usize,
    /// Grant tracker depth. Must equal `device_rsp_depth`.
    pub tracker_depth: usize,
}

impl SocketConfig {
    /// Configuration for `hosts` ports with the modeled socket's sizing
    /// (every buffer two transactions deep).
    pub fn new(hosts: usize) -> Self {
        Self {
            hosts,
            host_req_depth: 2,
            host_rsp_depth: 2,
            device_req_depth: 2,
            device_rsp_depth: 2,
            tracker_depth: 2,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts == 0 {
            return Err(ConfigError::NoHosts);
        }
        if self.hosts > RoundRobinArbiter::MAX_PORTS {
            return Err(ConfigError::TooManyHosts(self.hosts));
        }
        for (depth, name) in [
            (self.host_req_depth, "host request"),
            (self.host_rsp_depth, "host response"),
            (self.device_req_depth, "device request"),
            (self.device_rsp_depth, "device response"),
            (self.tracker_depth, "tracker"),
        ] {
            if depth == 0 {
                return Err(ConfigError::ZeroDepth(name));
            }
        }
        if self.tracker_depth != self.device_rsp_depth {
            return Err(ConfigError::TrackerDepthMismatch {
                tracker: self.tracker_depth,
                device_rsp: self.device_rsp_depth,
            });
        }
        Ok(())
    }
}

/// One requester's interface: an outbound request queue and an inbound
/// response queue. Owned by the socket for its whole lifetime.
#[derive(Debug)]
pub struct HostPort<T> {
    pub(crate) req: Fifo<T>,
    pub(crate) rsp: Fifo<T>,
}

impl<T> HostPort<T> {
    pub(crate) fn new(req_depth: usize, rsp_depth: usize) -> Self {
        Self { req: Fifo::new(req_depth), rsp: Fifo::new(rsp_depth) }
    }
}

/// The single downstream interface: one request queue and one response queue.
#[derive(Debug)]
pub struct DevicePort<T> {
    pub(crate) req: Fifo<T>,
    pub(crate) rsp: Fifo<T>,
}

/// Running counters for observability; never consulted by the protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketStats {
    /// Requests granted and forwarded downstream.
    pub grants: u64,
    /// Responses routed back to a host.
    pub responses_routed: u64,
    /// Submissions refused for lack of room in the host's outbound queue.
    pub rejected_submissions: u64,
}

/// N-to-1 socket multiplexer.
///
/// Composes N [`HostPort`]s, one [`DevicePort`], a [`RoundRobinArbiter`] and
/// a [`GrantTracker`] into a deterministic step machine. Each [`advance`]
/// moves at most one granted request downstream and routes buffered responses
/// back in grant order; all entities are created at construction and only
/// transactions flow afterwards.
///
/// [`advance`]: SocketMux::advance
#[derive(Debug)]
pub struct SocketMux<T> {
    hosts: Vec<HostPort<T>>,
    device: DevicePort<T>,
    arbiter: RoundRobinArbiter,
    tracker: GrantTracker,
    cycle: u64,
    stats: SocketStats,
}

impl<T> SocketMux<T> {
    /// Builds a socket from a validated configuration. Fails fast on
    /// misconfiguration; in particular the tracker depth must equal the
    /// device response depth so every in-flight response has both a buffer
    /// slot and a recorded destination.
    pub fn new(config: SocketConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hosts: (0..config.hosts)
                .map(|_| HostPort::new(config.host_req_depth, config.host_rsp_depth))
                .collect(),
            device: DevicePort {
                req: Fifo::new(config.device_req_depth),
                rsp: Fifo::new(config.device_rsp_depth),
            },
            arbiter: RoundRobinArbiter::new(config.hosts),
            tracker: GrantTracker::new(config.tracker_depth),
            cycle: 0,
            stats: SocketStats::default(),
        })
    }

    /// Queues a request on `host`'s outbound port.
    ///
    /// Returns whether the request was accepted; `false` is the normal
    /// backpressure signal (the queue is full), never a dropped request.
    ///
    /// # Panics
    ///
    /// Panics if `host` is out of range.
    pub fn submit_request(&mut self, host: usize, payload: T) -> bool {
        let accepted = self.hosts[host].req.offer(payload);
        if accepted {
            trace!(cycle = self.cycle, host, "request submitted");
        } else {
            self.stats.rejected_submissions += 1;
            trace!(cycle = self.cycle, host, "request refused, outbound queue full");
        }
        accepted
    }

    /// Takes the next response queued for `host`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `host` is out of range.
    pub fn try_receive_response(&mut self, host: usize) -> Option<T> {
        self.hosts[host].rsp.pop().ok()
    }

    /// Returns whether the device port can take another granted request this
    /// step. Readiness poll for the peripheral side.
    pub fn device_accepts_request(&self) -> bool { !self.device.req.is_full() }

    /// Takes the next request forwarded to the device, if any.
    pub fn device_take_request(&mut self) -> Option<T> { self.device.req.pop().ok() }

    /// Queues a device response; returns whether it was accepted.
    ///
    /// With a well-behaved device this never refuses: grants are withheld
    /// once the in-flight window fills, so the response queue always has a
    /// slot for every outstanding transaction.
    pub fn device_offer_response(&mut self, payload: T) -> bool { self.device.rsp.offer(payload) }

    /// Runs one evaluation cycle.
    ///
    /// Queue-full state and the in-flight count are latched once at step
    /// start; the request side and the response side both evaluate against
    /// that snapshot, so a slot freed or a grant recorded within the step is
    /// not observed until the next one (synchronous update, no settle loop).
    pub fn advance(&mut self) -> Result<(), Fault> {
        let outstanding = self.tracker.in_flight();
        let downstream_ready = !self.device.req.is_full() && !self.tracker.at_capacity();

        // Request side: arbitrate and move at most one request downstream.
        if downstream_ready {
            if let Some(winner) = self.arbiter.pick(self.pending_requests()) {
                let payload = self.hosts[winner].req.pop().expect("pending host has a queued request");
                let forwarded = self.device.req.offer(payload);
                debug_assert!(forwarded, "device request queue was checked for room");
                self.tracker.record(winner);
                self.arbiter.commit(winner);
                self.stats.grants += 1;
                trace!(cycle = self.cycle, host = winner, "request granted");
            }
        }

        // Response side: drain the device response channel in grant order,
        // completing only grants that were outstanding at step start.
        let routed = router::route(&mut self.device.rsp, &mut self.tracker, &mut self.hosts, outstanding)?;
        self.stats.responses_routed += routed as u64;

        self.cycle += 1;
        Ok(())
    }

    /// Bit vector of hosts with a pending, not-yet-granted request.
    fn pending_requests(&self) -> u64 {
        self.hosts.iter().positions(|h| !h.req.is_empty()).fold(0, |v, i| v | 1 << i)
    }

    /// Number of host ports.
    pub fn hosts(&self) -> usize { self.hosts.len() }

    /// Evaluation cycles run so far.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Requests accepted downstream whose response has not yet been routed.
    pub fn in_flight(&self) -> usize { self.tracker.in_flight() }

    /// Running counters.
    pub fn stats(&self) -> SocketStats { self.stats }
}
