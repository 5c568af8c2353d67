//! # scanlock-pipeline
//!
//! Dual-stage line-cipher pipeline runtime for scanlock.
//!
//! This crate drives the pure state machines from `scanlock-core` across
//! an async boundary: an ingress stage (stage A) acquires scanlines and
//! frame-sync pulses from external collaborators, an egress stage
//! (stage B) ciphers and emits them, and a bounded channel of
//! owned-buffer messages connects the two.
//!
//! ```text
//!  line source ─┐
//!               ├─ stage A ── bounded channel ── stage B ── line sink
//!  sync detector┘               (PipelineMessage)
//! ```
//!
//! On the transmitter the cipher runs on stage A (lines are encrypted
//! before they enter the channel); on the receiver it runs on stage B.
//! Either way the frame-sync marker travels in-band, so resynchronization
//! happens at the same position in the line stream on both sides.
//!
//! Hardware binding is out of scope: the collaborators in [`io`] are
//! narrow async contracts, and [`mock`] provides in-memory versions for
//! tests and software loopback.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod io;
pub mod mock;
pub mod pipeline;

pub use config::LinkConfig;
pub use io::{LineSink, LineSource, SyncDetector};
pub use mock::{
    ingress, scripted_ingress, CollectingSink, FeedEvent, IngressFeed, MockLineSource,
    MockSyncDetector,
};
pub use pipeline::Pipeline;

// The run-summary type callers get back from [`Pipeline::run`].
pub use scanlock_core::SyncStats;
