//! Dump keystream words for a key.
//!
//! Two builds that print the same words for the same key share the same
//! protocol constants (seed mixing, warm-up count); the quickest way to
//! rule out a constant mismatch when a link shows only garbage.

use anyhow::Result;
use scanlock_core::SyncController;

use super::parse_key;

pub fn run(key_text: &str, count: usize) -> Result<()> {
    let key = parse_key(key_text)?;
    let mut controller = SyncController::new(key);

    println!("keystream for key {key:016X}:");
    for i in 0..count {
        println!("{i:4}: {:016X}", controller.consume());
    }
    Ok(())
}
