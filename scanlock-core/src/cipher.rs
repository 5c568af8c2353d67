//! Word-wise XOR line transform.
//!
//! One keystream word is drawn per aligned 4-byte group, truncated to its
//! low 32 bits, and XORed byte-wise against the group; the 0–3 trailing
//! bytes each draw their own word, truncated to 8 bits. All words are
//! processed before the remainder — the ordering is normative, since it
//! determines which keystream words cover which bytes.
//!
//! XOR is self-inverse, so encryption and decryption are the same
//! operation; the transmitter and receiver jointly rely on applying it
//! with identically positioned generator state.

use crate::sync::SyncController;

/// Transform one line in place, advancing `controller` by exactly
/// `len/4 + len%4` keystream draws.
///
/// The 32-bit keystream word covers its group in little-endian byte
/// order. That matches how the reference hardware stored the word, and
/// because both sides split the word the same way the result is
/// host-endianness-agnostic.
pub fn apply_keystream_in_place(line: &mut [u8], controller: &mut SyncController) {
    let mut groups = line.chunks_exact_mut(4);
    for group in &mut groups {
        let word = (controller.consume() as u32).to_le_bytes();
        for (byte, key) in group.iter_mut().zip(word) {
            *byte ^= key;
        }
    }
    for byte in groups.into_remainder() {
        *byte ^= controller.consume() as u8;
    }
}

/// Transform `input` into `output` without touching `input`.
///
/// Same keystream consumption as [`apply_keystream_in_place`].
///
/// # Panics
///
/// Panics if the two buffers differ in length; the pipeline configures
/// both sides of a transform from the same line width.
pub fn apply_keystream(input: &[u8], output: &mut [u8], controller: &mut SyncController) {
    output.copy_from_slice(input);
    apply_keystream_in_place(output, controller);
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: u64 = 0x1234_5678_9ABC_DEF0;

    fn ramp(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 256) as u8).collect()
    }

    #[test]
    fn transform_is_self_inverse_for_any_alignment() {
        for len in [0usize, 1, 3, 4, 7, 8, 255, 720] {
            let plain = ramp(len);
            let mut wire = plain.clone();

            let mut tx = SyncController::new(KEY);
            apply_keystream_in_place(&mut wire, &mut tx);
            if len > 0 {
                assert_ne!(wire, plain, "len {len}: line left in the clear");
            }

            let mut rx = SyncController::new(KEY);
            apply_keystream_in_place(&mut wire, &mut rx);
            assert_eq!(wire, plain, "len {len}");
        }
    }

    #[test]
    fn consumes_one_draw_per_word_or_trailing_byte() {
        for len in [0usize, 1, 2, 3, 4, 5, 720, 721, 722, 723] {
            let mut ctl = SyncController::new(KEY);
            let mut line = ramp(len);
            apply_keystream_in_place(&mut line, &mut ctl);

            let mut reference = SyncController::new(KEY);
            for _ in 0..(len / 4 + len % 4) {
                reference.consume();
            }
            assert_eq!(ctl, reference, "len {len}");
        }
    }

    #[test]
    fn words_precede_remainder_in_the_keystream() {
        // A 6-byte line uses draw 1 for bytes 0..4 and draws 2 and 3 for
        // the two trailing bytes. Verify against a hand-driven controller.
        let mut ctl = SyncController::new(KEY);
        let w1 = (ctl.consume() as u32).to_le_bytes();
        let b5 = ctl.consume() as u8;
        let b6 = ctl.consume() as u8;

        let mut line = [0u8; 6];
        let mut other = SyncController::new(KEY);
        apply_keystream_in_place(&mut line, &mut other);

        assert_eq!(&line[..4], &w1);
        assert_eq!(line[4], b5);
        assert_eq!(line[5], b6);
    }

    #[test]
    fn two_buffer_form_matches_in_place_form() {
        let plain = ramp(720);
        let mut out = vec![0u8; 720];
        let mut a = SyncController::new(KEY);
        apply_keystream(&plain, &mut out, &mut a);

        let mut in_place = plain.clone();
        let mut b = SyncController::new(KEY);
        apply_keystream_in_place(&mut in_place, &mut b);

        assert_eq!(out, in_place);
        assert_eq!(a, b);
    }

    #[test]
    fn interposed_resync_keeps_sides_in_lockstep() {
        let mut tx = SyncController::new(KEY);
        let mut rx = SyncController::new(KEY);

        let plain = ramp(720);
        let mut wire = plain.clone();
        apply_keystream_in_place(&mut wire, &mut tx);
        apply_keystream_in_place(&mut wire, &mut rx);
        assert_eq!(wire, plain);

        use scanlock_types::Role;
        tx.resync(Role::Transmitter);
        rx.resync(Role::Receiver);

        let mut wire = plain.clone();
        apply_keystream_in_place(&mut wire, &mut tx);
        apply_keystream_in_place(&mut wire, &mut rx);
        assert_eq!(wire, plain);
    }
}
