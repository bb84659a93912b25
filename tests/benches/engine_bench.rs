use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokencipher_api::{CipherAlgorithm, Direction, SecretKey};
use tokencipher_engine::CipherOperation;
use tokencipher_tests::soft_token;

fn bench_cbc_pkcs5(c: &mut Criterion) {
    let mut group = c.benchmark_group("AES-CBC-PKCS5");

    // Test different data sizes
    for size in [16, 256, 1024, 16384].iter() {
        let data = vec![0u8; *size];
        let iv = [0u8; 16];
        group.throughput(Throughput::Bytes(*size as u64));

        for native in [false, true] {
            let label = if native { "native-pad" } else { "engine-pad" };
            group.bench_with_input(BenchmarkId::new(label, size), size, |b, _| {
                let key = SecretKey::new(CipherAlgorithm::Aes, &[0u8; 16]).unwrap();
                let mut op =
                    CipherOperation::from_transformation(soft_token(native), "AES/CBC/PKCS5Padding")
                        .unwrap();
                b.iter(|| {
                    op.init(Direction::Encrypt, &key, Some(&iv)).unwrap();
                    let _ = op.finish_vec(&data);
                });
            });
        }
    }

    group.finish();
}

fn bench_fragmented_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("AES-CBC-PKCS5-decrypt-fragmented");

    let token = soft_token(false);
    let key = SecretKey::new(CipherAlgorithm::Aes, &[0u8; 16]).unwrap();
    let iv = [0u8; 16];
    let mut enc = CipherOperation::from_transformation(token.clone(), "AES/CBC/PKCS5Padding").unwrap();
    enc.init(Direction::Encrypt, &key, Some(&iv)).unwrap();
    let ciphertext = enc.finish_vec(&vec![0u8; 4096]).unwrap();

    // Chunk sizes that do and do not line up with the block size
    for chunk in [7, 16, 100, 4096].iter() {
        group.bench_with_input(BenchmarkId::new("chunk", chunk), chunk, |b, &chunk| {
            let mut op =
                CipherOperation::from_transformation(token.clone(), "AES/CBC/PKCS5Padding").unwrap();
            let mut out = Vec::with_capacity(ciphertext.len());
            b.iter(|| {
                out.clear();
                op.init(Direction::Decrypt, &key, Some(&iv)).unwrap();
                for piece in ciphertext.chunks(chunk) {
                    op.update_into(piece, &mut out).unwrap();
                }
                op.finish_into(&[], &mut out).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_stream_ciphers(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    let data = vec![0u8; 16384];
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (name, transformation, algorithm) in [
        ("AES-CTR", "AES/CTR/NoPadding", CipherAlgorithm::Aes),
        ("ARCFOUR", "ARCFOUR", CipherAlgorithm::Arcfour),
    ] {
        group.bench_function(name, |b| {
            let key = SecretKey::new(algorithm, &[0x11u8; 16]).unwrap();
            let mut op = CipherOperation::from_transformation(soft_token(false), transformation)
                .unwrap();
            b.iter(|| {
                op.init(Direction::Encrypt, &key, None).unwrap();
                let _ = op.finish_vec(&data);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cbc_pkcs5,
    bench_fragmented_decrypt,
    bench_stream_ciphers
);
criterion_main!(benches);
