//! Constant-time operations to prevent timing attacks

use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater, CtOption};

/// XOR `src` into `dst` element-wise
///
/// # Panics
/// Panics if the slices differ in length.
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    assert_eq!(dst.len(), src.len());

    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

/// Read the PKCS#5 pad length of a final block without branching on its
/// contents
///
/// The last byte `p` is accepted when `1 <= p <= block.len()` and the final
/// `p` bytes all equal `p`. Every byte of the block is inspected on every
/// call. Blocks that are empty or longer than 255 bytes are never valid;
/// that check depends only on the public length.
pub fn ct_pkcs5_pad_len(block: &[u8]) -> CtOption<usize> {
    let len = match u8::try_from(block.len()) {
        Ok(len) if len > 0 => len,
        _ => return CtOption::new(0, Choice::from(0)),
    };

    let pad = block[block.len() - 1];
    let mut valid = !pad.ct_eq(&0) & !pad.ct_gt(&len);

    for (i, byte) in block.iter().enumerate() {
        // distance from the end, 1 for the last byte
        let distance = len - i as u8;
        let in_pad = !distance.ct_gt(&pad);
        valid &= !in_pad | byte.ct_eq(&pad);
    }

    CtOption::new(pad as usize, valid)
}
