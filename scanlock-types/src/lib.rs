//! # scanlock-types
//!
//! Shared data-model types for the scanlock synchronized line-cipher
//! pipeline.
//!
//! This crate provides the foundational types used across all scanlock
//! crates:
//! - [`LineBuffer`] - fixed-width scanline storage, recycled for every line
//! - [`PipelineMessage`] - the line-or-frame-boundary hand-off unit
//! - [`Role`] - transmitter/receiver side selector
//! - [`LinkError`] - error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod line;
mod message;
mod role;

pub use error::LinkError;
pub use line::LineBuffer;
pub use message::PipelineMessage;
pub use role::Role;
