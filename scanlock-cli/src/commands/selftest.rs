//! Cipher consistency self-test over fixed patterns, the software half of
//! the firmware's power-on checks (the hardware-loopback checks need the
//! actual board).

use anyhow::{bail, Result};
use scanlock_core::{apply_keystream_in_place, SyncController};
use scanlock_types::Role;

const KEY: u64 = 0x1234_5678_9ABC_DEF0;

pub fn run() -> Result<()> {
    println!("Running scanlock self-test...");

    let consistency = cipher_consistency();
    let lockstep = resync_lockstep();

    println!();
    println!("=== SELF-TEST RESULT ===");
    println!("Cipher consistency: {}", label(consistency));
    println!("Resync lockstep:    {}", label(lockstep));
    println!("========================");

    if consistency && lockstep {
        println!("All tests PASSED.");
        Ok(())
    } else {
        bail!("self-test failed");
    }
}

fn label(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "ERROR"
    }
}

/// Encrypt a 256-byte ramp with one controller, decrypt with a second
/// fresh one, expect the original back.
fn cipher_consistency() -> bool {
    let plain: Vec<u8> = (0u16..256).map(|i| i as u8).collect();
    let mut buffer = plain.clone();

    let mut tx = SyncController::new(KEY);
    apply_keystream_in_place(&mut buffer, &mut tx);
    let scrambled = buffer != plain;

    let mut rx = SyncController::new(KEY);
    apply_keystream_in_place(&mut buffer, &mut rx);

    scrambled && buffer == plain
}

/// Both sides resync, then keystreams must still agree word for word.
fn resync_lockstep() -> bool {
    let mut tx = SyncController::new(KEY);
    let mut rx = SyncController::new(KEY);

    for _ in 0..7 {
        tx.consume();
        rx.consume();
    }
    tx.resync(Role::Transmitter);
    rx.resync(Role::Receiver);

    (0..64).all(|_| tx.consume() == rx.consume())
}
