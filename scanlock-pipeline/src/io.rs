//! External collaborator contracts.
//!
//! The analog front- and back-end of the system — capture/digitization,
//! sync-pulse detection, DAC output — are fixed-function peripherals with
//! no algorithmic content. The pipeline consumes them through these three
//! narrow async traits; concrete hardware bindings live outside this
//! workspace, and [`crate::mock`] provides in-memory versions.
//!
//! Every wait is indefinite. The line-ready and frame-sync signals are
//! independent and may race; the ingress stage polls them concurrently,
//! so implementations must tolerate a dropped (cancelled) wait without
//! consuming the signal it was waiting for.

use async_trait::async_trait;
use scanlock_types::{LineBuffer, LinkError};

/// Produces raw scanlines at the line cadence.
#[async_trait]
pub trait LineSource: Send {
    /// Wait until the next line's samples are available.
    async fn await_line_ready(&mut self) -> Result<(), LinkError>;

    /// Read the pending line into `line`.
    ///
    /// Only valid after [`Self::await_line_ready`] completed; the samples
    /// must be exactly one configured line wide.
    async fn read_line(&mut self, line: &mut LineBuffer) -> Result<(), LinkError>;
}

/// Detects frame boundary pulses, independent of line timing.
#[async_trait]
pub trait SyncDetector: Send {
    /// Wait until the next frame boundary pulse.
    async fn await_frame_sync(&mut self) -> Result<(), LinkError>;
}

/// Consumes ciphered (or passed-through) scanlines.
#[async_trait]
pub trait LineSink: Send {
    /// Emit one line; completes only once the transfer has finished.
    ///
    /// The egress stage never starts a second transfer while one is in
    /// flight, so a slow sink back-pressures the whole pipeline.
    async fn write_line(&mut self, line: &LineBuffer) -> Result<(), LinkError>;

    /// Emit a frame boundary so downstream timing can re-arm.
    async fn write_frame_sync_marker(&mut self) -> Result<(), LinkError>;
}
