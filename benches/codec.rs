//! Criterion benchmarks for the block compression engine.
//!
//! Run with:
//!   cargo bench --bench codec

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nfdump_codec::{CodecConfig, CodecId};

/// Compressible synthetic payload of exactly `size` bytes, standing in for
/// a block of flow records: real capture data compresses well, and a
/// repetitive corpus keeps the numbers about the codec rather than the
/// entropy of one particular sample.
fn synthetic_payload(size: usize) -> Vec<u8> {
    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
        sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. ";
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let rem = size - out.len();
        let take = rem.min(LOREM.len());
        out.extend_from_slice(&LOREM[..take]);
    }
    out
}

fn bench_codec_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_compress_decompress");
    let cfg = CodecConfig::default();

    for &chunk_size in &[16_384usize, 131_072] {
        let payload = synthetic_payload(chunk_size);

        for codec in [CodecId::Lzo, CodecId::Bz2, CodecId::Lz4, CodecId::Lzma] {
            let impl_ = codec.codec();
            let bound = impl_.max_compressed_size(payload.len());

            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}_compress", codec.name()), chunk_size),
                &payload,
                |b, payload| {
                    let mut dst = vec![0u8; bound];
                    b.iter(|| impl_.compress(payload, &mut dst, &cfg).unwrap())
                },
            );

            let mut compressed = vec![0u8; bound];
            let written = impl_.compress(&payload, &mut compressed, &cfg).unwrap();
            compressed.truncate(written);
            let mut decomp_dst = vec![0u8; chunk_size * 2];

            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}_decompress", codec.name()), chunk_size),
                &compressed,
                |b, compressed| {
                    b.iter(|| impl_.decompress(compressed, &mut decomp_dst).unwrap())
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_codec_round_trip);
criterion_main!(benches);
