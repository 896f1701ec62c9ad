//! Response router.

use thiserror::Error;
use tracing::{error, trace};

use crate::channel::Fifo;
use crate::socket::HostPort;
use crate::tracker::{GrantTracker, TrackerDesync};

/// Unrecoverable protocol fault.
///
/// Faults indicate a defective device or an internal sequencing bug, never a
/// recoverable backpressure condition. The engine halts rather than guess a
/// destination; the response path is left untouched for inspection.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("tracker desync: {0}")]
    TrackerDesync(#[from] TrackerDesync),
}

/// Drains the device response channel into host inbound queues.
///
/// `max_pops` is the in-flight count latched at step start: a response can
/// only complete a grant recorded on an earlier step, so a response present
/// beyond that window has no outstanding grant and faults instead of being
/// routed against an entry the request side recorded within the same step.
/// The tracker head names the only legal destination for the channel head:
/// responses keep strict global FIFO order across hosts, so a full
/// destination queue stalls the entire response path until that host drains.
/// Returns the number of responses routed this cycle.
pub(crate) fn route<T>(
    device_rsp: &mut Fifo<T>, tracker: &mut GrantTracker, hosts: &mut [HostPort<T>], max_pops: usize,
) -> Result<usize, Fault> {
    let mut routed = 0;
    while !device_rsp.is_empty() {
        if routed == max_pops {
            error!("response arrived with no outstanding grant");
            return Err(TrackerDesync.into());
        }
        let dest = match tracker.peek_destination() {
            Some(dest) => dest,
            None => {
                error!("response arrived with no outstanding grant");
                return Err(TrackerDesync.into());
            }
        };
        if hosts[dest].rsp.is_full() {
            // The head response cannot be skipped ahead of an earlier one.
            trace!(host = dest, "response path stalled on a full inbound queue");
            break;
        }
        let payload = device_rsp.pop().expect("response channel is non-empty");
        let dest = tracker.complete().expect("tracker is non-empty");
        let delivered = hosts[dest].rsp.offer(payload);
        debug_assert!(delivered, "inbound queue was checked for room");
        trace!(host = dest, "response routed");
        routed += 1;
    }
    Ok(routed)
}
