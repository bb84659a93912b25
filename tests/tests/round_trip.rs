//! Encrypt/decrypt round trips across every supported transformation

use proptest::prelude::*;
use tokencipher_api::{Direction, Mode, PaddingMode};
use tokencipher_engine::CipherOperation;
use tokencipher_softtoken::SoftToken;
use tokencipher_tests::{init_tracing, run_chunked, run_split, soft_token, test_key, test_rng};

const TRANSFORMATIONS: &[&str] = &[
    "AES/ECB/NoPadding",
    "AES/ECB/PKCS5Padding",
    "AES/CBC/NoPadding",
    "AES/CBC/PKCS5Padding",
    "AES/CTR/NoPadding",
    "DESede/ECB/NoPadding",
    "DESede/ECB/PKCS5Padding",
    "DESede/CBC/NoPadding",
    "DESede/CBC/PKCS5Padding",
    "ARCFOUR",
];

/// ECB padding is only available from a token that pads natively
fn needs_native_padding(transformation: &str) -> bool {
    transformation.contains("/ECB/PKCS5")
}

/// Trim `data` to what the transformation accepts without padding
fn acceptable(op: &CipherOperation<SoftToken>, mut data: Vec<u8>) -> Vec<u8> {
    let spec = op.spec();
    let bs = spec.block_size();
    if bs > 0 && spec.mode() != Mode::Ctr && spec.padding() == PaddingMode::None {
        data.truncate(data.len() - data.len() % bs);
    }
    data
}

fn expected_ciphertext_len(op: &CipherOperation<SoftToken>, plain_len: usize) -> usize {
    let bs = op.block_size();
    if op.spec().padding() == PaddingMode::Pkcs5 {
        (plain_len / bs + 1) * bs
    } else {
        plain_len
    }
}

fn round_trip(transformation: &str, native: bool, data: &[u8], chunk: usize, seed: u64) {
    let token = soft_token(native);
    let mut enc = CipherOperation::from_transformation(token.clone(), transformation).unwrap();
    let key = test_key(enc.spec().algorithm());

    enc.init_with_rng(Direction::Encrypt, &key, None, &mut test_rng(seed))
        .unwrap();
    let iv = enc.iv().map(<[u8]>::to_vec);
    let ciphertext = run_chunked(&mut enc, data, chunk).unwrap();
    assert_eq!(ciphertext.len(), expected_ciphertext_len(&enc, data.len()));

    let mut dec = CipherOperation::from_transformation(token.clone(), transformation).unwrap();
    dec.init(Direction::Decrypt, &key, iv.as_deref()).unwrap();
    let plaintext = run_chunked(&mut dec, &ciphertext, chunk).unwrap();
    assert_eq!(plaintext, data, "{transformation} native={native} chunk={chunk}");

    assert_eq!(token.open_sessions(), token.idle_sessions());
}

#[test]
fn test_block_boundary_lengths() {
    init_tracing();
    for &transformation in TRANSFORMATIONS {
        for native in [false, true] {
            if !native && needs_native_padding(transformation) {
                continue;
            }
            let reference = CipherOperation::from_transformation(soft_token(native), transformation)
                .unwrap();
            let bs = reference.block_size().max(16);
            for len in [0, bs - 1, bs, bs + 1, 3 * bs] {
                let data = acceptable(&reference, vec![0xA5; len]);
                for chunk in [0, 1, 7] {
                    round_trip(transformation, native, &data, chunk, len as u64);
                }
            }
        }
    }
}

#[test]
fn test_engine_and_native_padding_agree() {
    init_tracing();
    for transformation in ["AES/CBC/PKCS5Padding", "DESede/CBC/PKCS5Padding"] {
        let data: Vec<u8> = (0u8..45).collect();
        let mut outputs = Vec::new();
        for native in [false, true] {
            let mut op =
                CipherOperation::from_transformation(soft_token(native), transformation).unwrap();
            let key = test_key(op.spec().algorithm());
            op.init_with_rng(Direction::Encrypt, &key, None, &mut test_rng(9))
                .unwrap();
            assert_eq!(op.uses_native_padding(), native);
            outputs.push(run_chunked(&mut op, &data, 4).unwrap());
        }
        assert_eq!(outputs[0], outputs[1], "{transformation}");
    }
}

fn transformation_and_token() -> impl Strategy<Value = (&'static str, bool)> {
    (prop::sample::select(TRANSFORMATIONS.to_vec()), any::<bool>())
        .prop_map(|(t, native)| (t, native || needs_native_padding(t)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(
        (transformation, native) in transformation_and_token(),
        data in prop::collection::vec(any::<u8>(), 0..200),
        chunk in 0usize..40,
        seed in any::<u64>(),
    ) {
        let reference = CipherOperation::from_transformation(soft_token(native), transformation)
            .unwrap();
        let data = acceptable(&reference, data);
        round_trip(transformation, native, &data, chunk, seed);
    }

    #[test]
    fn prop_fragmentation_does_not_change_output(
        (transformation, native) in transformation_and_token(),
        data in prop::collection::vec(any::<u8>(), 0..160),
        mut cuts in prop::collection::vec(0usize..160, 0..8),
        seed in any::<u64>(),
    ) {
        cuts.sort_unstable();
        let token = soft_token(native);
        let mut op = CipherOperation::from_transformation(token, transformation).unwrap();
        let data = acceptable(&op, data);
        let key = test_key(op.spec().algorithm());

        op.init_with_rng(Direction::Encrypt, &key, None, &mut test_rng(seed)).unwrap();
        let iv = op.iv().map(<[u8]>::to_vec);
        let whole = run_chunked(&mut op, &data, 0).unwrap();

        op.init(Direction::Encrypt, &key, iv.as_deref()).unwrap();
        let pieces = run_split(&mut op, &data, &cuts).unwrap();
        prop_assert_eq!(&whole, &pieces);

        op.init(Direction::Decrypt, &key, iv.as_deref()).unwrap();
        let back = run_split(&mut op, &pieces, &cuts).unwrap();
        prop_assert_eq!(back, data);
    }
}
