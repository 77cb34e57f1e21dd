use pack_compress::{BrotliCompressor, BufferWriter, BytesWriter, CompressError, CompressionLevel, Pool, PoolConfig};
use proptest::prelude::*;
use std::io::Read;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
    });
}

fn decompress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, 4096).read_to_end(&mut out).expect("compressed stream should be valid brotli");
    out
}

fn small_segment_pool() -> Arc<Pool<pack_compress::SegmentedWriter>> {
    let config = PoolConfig { max_idle: 4, initial_segment_size: 16, max_segment_size: 256 };
    Arc::new(Pool::from_config(&config))
}

/// Grants a few bytes per reservation, whatever the hint.
struct TinyRegions {
    out: Vec<u8>,
    region: Vec<u8>,
}

impl TinyRegions {
    fn new(region_size: usize) -> Self {
        Self { out: Vec::new(), region: vec![0; region_size] }
    }
}

impl BufferWriter for TinyRegions {
    fn reserve(&mut self, _size_hint: usize) -> &mut [u8] {
        &mut self.region
    }

    fn commit(&mut self, n: usize) {
        self.out.extend_from_slice(&self.region[..n]);
    }
}

#[test]
fn two_writes_decompress_to_their_concatenation() {
    init_tracing();
    let mut compressor = BrotliCompressor::with_quality(1, 22).unwrap();
    compressor.write(b"AAAA").unwrap();
    compressor.write(b"BBBBBBBB").unwrap();

    let compressed = compressor.to_vec().unwrap();
    assert!(!compressed.is_empty());
    assert_eq!(decompress(&compressed), b"AAAABBBBBBBB");
}

#[test]
fn negative_quality_is_rejected() {
    let err = BrotliCompressor::with_quality(-1, 22).unwrap_err();
    assert!(matches!(err, CompressError::InvalidArgument { .. }));
}

#[test]
fn empty_input_is_a_valid_stream() {
    let compressor = BrotliCompressor::with_quality(1, 22).unwrap();
    let compressed = compressor.to_vec().unwrap();
    assert!(decompress(&compressed).is_empty());
}

#[test]
fn one_byte_regions_match_to_vec() {
    init_tracing();
    let mut compressor = BrotliCompressor::builder().quality(6).writer_pool(small_segment_pool()).build().unwrap();
    let input: Vec<u8> = (0..3000u32).map(|i| b"serializer"[(i % 10) as usize] ^ (i / 97) as u8).collect();
    compressor.write(&input).unwrap();

    let mut sink = TinyRegions::new(1);
    compressor.copy_to(&mut sink).unwrap();

    assert_eq!(decompress(&sink.out), decompress(&compressor.to_vec().unwrap()));
    assert_eq!(decompress(&sink.out), input);
}

#[test]
fn incompressible_input_at_smallest_window() {
    init_tracing();
    let mut state = 0x1234_5678_u32;
    let input: Vec<u8> = (0..300_000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[0]
        })
        .collect();

    for quality in [0, 1] {
        let mut compressor = BrotliCompressor::builder().quality(quality).window(10).build().unwrap();
        compressor.write(&input).unwrap();
        assert_eq!(decompress(&compressor.to_vec().unwrap()), input, "quality {quality}");

        let mut out = Vec::new();
        compressor.copy_to_writer(&mut out).unwrap();
        assert_eq!(decompress(&out), input, "quality {quality}");
    }
}

#[test]
fn every_level_round_trips() {
    let input = b"level after level after level".repeat(50);
    for level in [CompressionLevel::NoCompression, CompressionLevel::Fastest, CompressionLevel::Optimal, CompressionLevel::SmallestSize] {
        let mut compressor = BrotliCompressor::with_level(level);
        compressor.write(&input).unwrap();
        assert_eq!(decompress(&compressor.to_vec().unwrap()), input, "{level:?}");
    }
}

#[test]
fn pool_reuse_does_not_leak_previous_session() {
    let pool = small_segment_pool();

    let mut first = BrotliCompressor::builder().writer_pool(Arc::clone(&pool)).build().unwrap();
    first.write(b"first session payload").unwrap();
    first.dispose();

    let mut second = BrotliCompressor::builder().writer_pool(Arc::clone(&pool)).build().unwrap();
    assert_eq!(second.total_written().unwrap(), 0);
    second.write(b"second").unwrap();
    assert_eq!(decompress(&second.to_vec().unwrap()), b"second");
}

#[test]
fn copy_to_writer_streams_frames() {
    let mut compressor = BrotliCompressor::builder().quality(0).writer_pool(small_segment_pool()).build().unwrap();
    let input = b"0123456789abcdef".repeat(300);
    compressor.write(&input).unwrap();

    let mut out = Vec::new();
    compressor.copy_to_writer(&mut out).unwrap();
    assert_eq!(decompress(&out), input);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn writes_round_trip(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 0..16), quality in 0i32..=11, window in 10i32..=24) {
        let mut compressor = BrotliCompressor::builder().quality(quality).window(window).writer_pool(small_segment_pool()).build().unwrap();
        let mut expected = Vec::new();
        for chunk in &chunks {
            compressor.write(chunk).unwrap();
            expected.extend_from_slice(chunk);
        }

        prop_assert_eq!(decompress(&compressor.to_vec().unwrap()), expected.clone());

        let mut sink = BytesWriter::with_capacity(0);
        compressor.copy_to(&mut sink).unwrap();
        prop_assert_eq!(decompress(sink.as_slice()), expected.clone());

        let mut tiny = TinyRegions::new(3);
        compressor.copy_to(&mut tiny).unwrap();
        prop_assert_eq!(decompress(&tiny.out), expected);
    }
}
