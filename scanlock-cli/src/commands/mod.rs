//! Command implementations.

pub mod keystream;
pub mod loopback;
pub mod selftest;

use anyhow::{Context, Result};

/// Parse a 64-bit key from a hex string, with or without a `0x` prefix.
pub fn parse_key(text: &str) -> Result<u64> {
    let digits = text.trim_start_matches("0x");
    u64::from_str_radix(digits, 16).with_context(|| format!("invalid hex key: {text}"))
}
