//! Output sizing: buffers of exactly the reported size always suffice

use proptest::prelude::*;
use tokencipher_api::{Direction, Error, Mode, PaddingMode};
use tokencipher_engine::{CipherOperation, SliceCursor};
use tokencipher_softtoken::SoftToken;
use tokencipher_tests::{run_chunked, soft_token, test_key, test_rng};

const TRANSFORMATIONS: &[&str] = &[
    "AES/ECB/NoPadding",
    "AES/ECB/PKCS5Padding",
    "AES/CBC/PKCS5Padding",
    "AES/CTR/NoPadding",
    "DESede/CBC/NoPadding",
    "DESede/CBC/PKCS5Padding",
    "ARCFOUR",
];

/// Drive `op` with output buffers cut to exactly the advertised lengths
fn run_exact(op: &mut CipherOperation<SoftToken>, input: &[u8], cuts: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, input.len());
        let piece = &input[start..cut];
        let mut buf = vec![0u8; op.update_length(piece.len())];
        let n = op.update(piece, &mut buf).unwrap();
        out.extend_from_slice(&buf[..n]);
        start = cut;
    }
    let rest = &input[start..];
    let mut buf = vec![0u8; op.finish_length(rest.len())];
    assert_eq!(op.output_size(rest.len()), buf.len());
    let n = op.finish(rest, &mut buf).unwrap();
    out.extend_from_slice(&buf[..n]);
    out
}

#[test]
fn test_short_update_buffer_changes_nothing() {
    let token = soft_token(false);
    let mut op = CipherOperation::from_transformation(token, "AES/CBC/PKCS5Padding").unwrap();
    let key = test_key(op.spec().algorithm());
    op.init(Direction::Encrypt, &key, Some(&[3u8; 16])).unwrap();

    let data = [9u8; 40];
    let mut small = [0u8; 16];
    assert_eq!(
        op.update(&data, &mut small),
        Err(Error::ShortBuffer {
            required: 32,
            available: 16
        })
    );
    assert!(op.is_initialized());

    let mut out = Vec::new();
    op.update_into(&data, &mut out).unwrap();
    op.finish_into(&[], &mut out).unwrap();

    op.init(Direction::Encrypt, &key, Some(&[3u8; 16])).unwrap();
    assert_eq!(run_chunked(&mut op, &data, 0).unwrap(), out);
}

#[test]
fn test_short_finish_buffer_changes_nothing() {
    let token = soft_token(true);
    let mut op = CipherOperation::from_transformation(token, "AES/ECB/PKCS5Padding").unwrap();
    let key = test_key(op.spec().algorithm());
    op.init(Direction::Encrypt, &key, None).unwrap();

    let mut small = [0u8; 15];
    assert!(matches!(
        op.finish(b"hello", &mut small),
        Err(Error::ShortBuffer { required: 16, .. })
    ));
    assert!(op.is_initialized());
    assert_eq!(op.finish_vec(b"hello").unwrap().len(), 16);
}

#[test]
fn test_slice_cursor_accumulates_output() {
    let token = soft_token(true);
    let mut op = CipherOperation::from_transformation(token, "AES/CBC/PKCS5Padding").unwrap();
    let key = test_key(op.spec().algorithm());
    op.init(Direction::Encrypt, &key, Some(&[0u8; 16])).unwrap();

    let mut storage = [0u8; 64];
    let mut cursor = SliceCursor::new(&mut storage);
    op.update_into(&[1u8; 20], &mut cursor).unwrap();
    op.finish_into(&[1u8; 20], &mut cursor).unwrap();
    assert_eq!(cursor.position(), 48);
    assert_eq!(cursor.remaining(), 16);
}

#[test]
fn test_sizes_before_init() {
    let op = CipherOperation::from_transformation(soft_token(false), "AES/CBC/PKCS5Padding")
        .unwrap();
    assert_eq!(op.update_length(37), 32);
    assert_eq!(op.finish_length(37), 37);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_buffers_suffice(
        transformation in prop::sample::select(TRANSFORMATIONS.to_vec()),
        native_offered in any::<bool>(),
        data in prop::collection::vec(any::<u8>(), 0..150),
        mut cuts in prop::collection::vec(0usize..150, 0..6),
        seed in any::<u64>(),
    ) {
        cuts.sort_unstable();
        // ECB padding is only available from a token that pads natively
        let native = native_offered || transformation.contains("/ECB/PKCS5");
        let mut op = CipherOperation::from_transformation(soft_token(native), transformation)
            .unwrap();
        let mut data = data;
        let spec = *op.spec();
        let bs = spec.block_size();
        if bs > 0 && spec.mode() != Mode::Ctr && spec.padding() == PaddingMode::None {
            data.truncate(data.len() - data.len() % bs);
        }
        let key = test_key(spec.algorithm());

        op.init_with_rng(Direction::Encrypt, &key, None, &mut test_rng(seed)).unwrap();
        let iv = op.iv().map(<[u8]>::to_vec);
        let ciphertext = run_exact(&mut op, &data, &cuts);

        op.init(Direction::Decrypt, &key, iv.as_deref()).unwrap();
        let plaintext = run_exact(&mut op, &ciphertext, &cuts);
        prop_assert_eq!(plaintext, data);
    }
}
