//! # scanlock-core
//!
//! Pure cipher and synchronization logic for scanlock (no I/O, instant
//! tests).
//!
//! This crate implements the keystream generator, the per-frame
//! resynchronization controller, the line transform, and the drift
//! detection logic — without any channel, timer, or hardware access.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects beyond their own state. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Bit-exact lockstep reasoning: the transmitter's and receiver's
//!   keystreams must be byte-identical at byte-identical offsets, and
//!   every keystream draw in this crate is countable and reproducible
//!
//! The actual scheduling (two concurrent stages, bounded channels, the
//! external line source/sink) is performed by `scanlock-pipeline`, which
//! drives these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod drift;
pub mod keystream;
pub mod sync;

pub use cipher::{apply_keystream, apply_keystream_in_place};
pub use drift::{DriftMonitor, FrameOutcome, SyncStats, SYNC_ERROR_THRESHOLD};
pub use keystream::{GeneratorState, SEED_MIX_S0, SEED_MIX_S1, WARMUP_STEPS};
pub use sync::{SyncController, SEED_EVOLUTION_MASK, SEED_EVOLUTION_PERIOD};
