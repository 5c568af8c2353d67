//! Inter-stage hand-off messages.
//!
//! The two pipeline stages communicate exclusively through a bounded FIFO
//! channel of [`PipelineMessage`]s. Frame boundaries travel in-band so a
//! `FrameSync` is never reordered relative to the lines around it; exactly
//! one marker is enqueued per physical frame-sync event, always ahead of
//! the first line of the next frame.

use crate::LineBuffer;

/// A unit of work handed from the ingress stage to the egress stage.
#[derive(Debug, PartialEq, Eq)]
pub enum PipelineMessage {
    /// One scanline. Ownership of the buffer moves with the message.
    Line(LineBuffer),
    /// A frame boundary; triggers keystream resynchronization downstream.
    FrameSync,
}

impl PipelineMessage {
    /// True for the frame-boundary marker.
    pub fn is_frame_sync(&self) -> bool {
        matches!(self, PipelineMessage::FrameSync)
    }
}
