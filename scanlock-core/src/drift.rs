//! Drift detection, recovery, and diagnostics.
//!
//! Each side keeps a per-frame line counter that a correctly-timed frame
//! boundary clears ([`DriftMonitor::begin_frame`]) immediately before the
//! boundary is acted on ([`DriftMonitor::frame_sync`]). A non-zero counter
//! at that point means a frame boundary was missed or duplicated upstream:
//! the keystreams have drifted, and incremental repair is hopeless because
//! there is no integrity check in the stream to repair against.
//!
//! Recovery is deliberately blunt: fully reinitialize the controller from
//! the original pre-shared key. A few frames come out corrupted, but both
//! sides reconverge on a globally known state.

use crate::sync::SyncController;
use scanlock_types::Role;

/// Accumulated sync errors beyond this count flag a persistent fault.
pub const SYNC_ERROR_THRESHOLD: u32 = 10;

/// Lines between latency log summaries.
const STATS_REPORT_INTERVAL: u64 = 100;

/// Outcome of processing one frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Normal resynchronization.
    Synced,
    /// Drift detected; the controller was hard-reinitialized.
    Recovered {
        /// True once more than [`SYNC_ERROR_THRESHOLD`] errors have
        /// accumulated. Diagnostic only — recovery still ran.
        persistent_fault: bool,
    },
}

/// Per-frame line bookkeeping and the drift heuristic.
#[derive(Debug, Default, Clone)]
pub struct DriftMonitor {
    lines_this_frame: u32,
    sync_error_count: u32,
}

impl DriftMonitor {
    /// New monitor with clear counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed line of the current frame.
    pub fn line_processed(&mut self) {
        self.lines_this_frame = self.lines_this_frame.wrapping_add(1);
    }

    /// Clear the per-frame line counter.
    ///
    /// This is the correctly-timed boundary event; in the reference
    /// hardware it was the vsync interrupt handler's counter reset. The
    /// egress stage calls it immediately before [`Self::frame_sync`], so
    /// the drift check only fires when a boundary was genuinely missed.
    pub fn begin_frame(&mut self) {
        self.lines_this_frame = 0;
    }

    /// Act on a frame boundary: resync, or hard-recover on drift.
    ///
    /// Used on the side whose egress stage owns the controller (the
    /// receiver). On drift the controller ends up freshly initialized
    /// from the pre-shared key, not in the resync-evolved state.
    pub fn frame_sync(&mut self, controller: &mut SyncController, role: Role) -> FrameOutcome {
        match self.check_boundary() {
            Some(persistent_fault) => {
                controller.reinit();
                FrameOutcome::Recovered { persistent_fault }
            }
            None => {
                controller.resync(role);
                FrameOutcome::Synced
            }
        }
    }

    /// Boundary bookkeeping without a controller.
    ///
    /// The transmitter resyncs on its ingress stage (before the marker is
    /// enqueued), so its egress stage has nothing to reinitialize; drift
    /// there is counted and reported only.
    pub fn frame_boundary(&mut self) -> FrameOutcome {
        match self.check_boundary() {
            Some(persistent_fault) => FrameOutcome::Recovered { persistent_fault },
            None => FrameOutcome::Synced,
        }
    }

    fn check_boundary(&mut self) -> Option<bool> {
        if self.lines_this_frame == 0 {
            return None;
        }
        self.lines_this_frame = 0;
        self.sync_error_count = self.sync_error_count.saturating_add(1);
        Some(self.sync_error_count > SYNC_ERROR_THRESHOLD)
    }

    /// Total sync errors observed since startup.
    pub fn sync_error_count(&self) -> u32 {
        self.sync_error_count
    }

    /// Lines processed since the last frame boundary.
    pub fn lines_this_frame(&self) -> u32 {
        self.lines_this_frame
    }
}

/// Diagnostic counters; never consulted by the cipher path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    /// Frame boundaries processed.
    pub frame_count: u64,
    /// Lines processed.
    pub line_count: u64,
    /// Sync errors (copied from the drift monitor at run end).
    pub sync_error_count: u32,
    /// Worst observed per-line processing latency, microseconds.
    pub max_latency_us: u64,
    /// Latency accumulated since the last report window.
    pub total_processing_us: u64,
}

impl SyncStats {
    /// Record one processed line and its latency.
    ///
    /// Returns the window's mean latency every 100 lines so the caller
    /// can log a summary (and resets the window accumulator).
    pub fn record_line(&mut self, latency_us: u64) -> Option<u64> {
        self.line_count += 1;
        self.total_processing_us += latency_us;
        if latency_us > self.max_latency_us {
            self.max_latency_us = latency_us;
        }
        if self.line_count % STATS_REPORT_INTERVAL == 0 {
            let mean = self.total_processing_us / STATS_REPORT_INTERVAL;
            self.total_processing_us = 0;
            Some(mean)
        } else {
            None
        }
    }

    /// Record one processed frame boundary.
    pub fn record_frame(&mut self) {
        self.frame_count += 1;
    }
}
