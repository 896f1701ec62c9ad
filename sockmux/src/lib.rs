//! Sockmux: cycle-level model of an N-to-1 shared-bus socket multiplexer.
//!
//! N hosts issue split request/response transactions over a single shared
//! downstream channel to one device. A rotating-priority arbiter grants one
//! request per cycle, a grant tracker remembers which host each in-flight
//! transaction belongs to, and a response router hands every device response
//! back to its originating host in grant order. Backpressure is signaled
//! synchronously at every boundary; no transaction is ever dropped or
//! misrouted.
//!
//! The model advances as a deterministic step machine: [`SocketMux::advance`]
//! evaluates one cycle against a snapshot of queue state latched at step
//! start. A surrounding harness drives the host-facing and device-facing
//! ports between steps.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::private_doc_tests)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(elided_lifetimes_in_paths)]

pub mod arbiter;
pub mod channel;
pub mod router;
pub mod socket;
pub mod tracker;

pub use arbiter::RoundRobinArbiter;
pub use channel::{Fifo, UnderflowError};
pub use router::Fault;
pub use socket::{ConfigError, DevicePort, HostPort, SocketConfig, SocketMux, SocketStats};
pub use tracker::{GrantTracker, TrackerDesync};
