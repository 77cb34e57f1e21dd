//! The streaming brotli compressor.
//!
//! A [`BrotliCompressor`] collects uncompressed bytes into a [`SegmentedWriter`] rented from a
//! [`Pool`], and compresses them only when asked for the result:
//!
//! - [`BrotliCompressor::to_vec`]: one contiguous compressed buffer
//! - [`BrotliCompressor::copy_to`]: straight into a caller supplied [`BufferWriter`]
//! - [`BrotliCompressor::copy_to_writer`] / [`BrotliCompressor::copy_to_async`]: frame by frame
//!   into a blocking or async byte stream
//!
//! Each of these runs a fresh brotli stream over the buffered segments, so they can be called
//! any number of times. The rented writer goes back to its pool on [`BrotliCompressor::dispose`]
//! or when the compressor is dropped.

mod builder;
mod frame_stream;

pub use builder::CompressorBuilder;

use crate::buffer::{BufferWriter, SegmentedWriter};
use crate::engine::{BrotliEncoder, OperationStatus, Progress, max_compressed_len};
use crate::error::CompressError;
use crate::options::{CompressionLevel, CompressorOptions};
use crate::pool::{Pool, Pooled, buffer_pool, writer_pool};
use crate::utils::ensure;
use frame_stream::FrameStream;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace};

/// Extra room per segment on top of the one pass bound, every segment fed to the engine may
/// close a meta-block of its own.
const METABLOCK_ALLOWANCE: usize = 16;

/// Smallest size hint asked from a destination.
const MIN_SIZE_HINT: usize = 16;

/// Consecutive calls without any progress tolerated before giving up on a destination.
const MAX_STALLED_CALLS: usize = 8;

/// Compresses bytes written incrementally into one brotli stream.
///
/// # Example
///
/// ```
/// use pack_compress::BrotliCompressor;
///
/// let mut compressor = BrotliCompressor::with_quality(1, 22).unwrap();
/// compressor.write(b"AAAA").unwrap();
/// compressor.write(b"BBBBBBBB").unwrap();
///
/// let compressed = compressor.to_vec().unwrap();
/// assert!(!compressed.is_empty());
/// ```
#[derive(Debug)]
pub struct BrotliCompressor {
    writer: Option<Pooled<SegmentedWriter>>,
    buffer_pool: Arc<Pool<Vec<u8>>>,
    quality: u32,
    window: u32,
}

impl BrotliCompressor {
    /// Creates a compressor with [`CompressionLevel::Fastest`] using the shared pools.
    pub fn new() -> Self {
        Self::with_level(CompressionLevel::default())
    }

    pub fn with_level(level: CompressionLevel) -> Self {
        let options = CompressorOptions::from_level(level);
        Self::create(options, &writer_pool(), buffer_pool())
    }

    /// Creates a compressor with an explicit brotli quality (`0..=11`) and window (`10..=24`).
    pub fn with_quality(quality: i32, window: i32) -> Result<Self, CompressError> {
        Self::with_options(CompressorOptions::new(quality, window))
    }

    pub fn with_options(options: CompressorOptions) -> Result<Self, CompressError> {
        options.validate()?;
        Ok(Self::create(options, &writer_pool(), buffer_pool()))
    }

    pub fn builder() -> CompressorBuilder {
        CompressorBuilder::new()
    }

    // options must be validated
    fn create(options: CompressorOptions, writer_pool: &Arc<Pool<SegmentedWriter>>, buffer_pool: Arc<Pool<Vec<u8>>>) -> Self {
        Self {
            writer: Some(writer_pool.rent()),
            buffer_pool,
            quality: options.quality.unsigned_abs(),
            window: options.window.unsigned_abs(),
        }
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn is_disposed(&self) -> bool {
        self.writer.is_none()
    }

    /// Uncompressed bytes written so far.
    pub fn total_written(&self) -> Result<usize, CompressError> {
        Ok(self.writer()?.total_written())
    }

    /// Appends uncompressed bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<(), CompressError> {
        self.writer_mut()?.extend_from_slice(data);
        Ok(())
    }

    /// Compresses everything written so far into one contiguous buffer.
    ///
    /// The output is staged in a pooled buffer sized to the worst case, so the engine never
    /// runs out of room. If it does anyway the bound was wrong and the call fails with
    /// [`CompressError::CompressionFailed`].
    pub fn to_vec(&self) -> Result<Vec<u8>, CompressError> {
        let writer = self.writer()?;
        let bound = max_compressed_len(writer.total_written(), self.window) + writer.segments().count() * METABLOCK_ALLOWANCE;
        self.to_vec_within(bound)
    }

    /// Compresses into a pooled buffer of exactly `bound` bytes, which goes back to the pool on
    /// every exit.
    fn to_vec_within(&self, bound: usize) -> Result<Vec<u8>, CompressError> {
        let writer = self.writer()?;
        let mut destination = self.buffer_pool.rent();
        destination.resize(bound, 0);

        let mut encoder = self.encoder()?;
        let mut written = 0;
        for segment in writer.segments() {
            let progress = encoder.compress(segment, &mut destination[written..], false);
            check_fixed_progress(progress, segment.len())?;
            written += progress.written;
        }

        let progress = encoder.compress(&[], &mut destination[written..], true);
        check_fixed_progress(progress, 0)?;
        written += progress.written;

        debug!(uncompressed = writer.total_written(), compressed = written, bound, "compressed to vec");
        Ok(destination[..written].to_vec())
    }

    /// Compresses everything written so far into `destination`.
    ///
    /// Whenever the engine runs out of room the written part is committed and a larger region
    /// is reserved, so `destination` may hand out regions of any size.
    pub fn copy_to<W: BufferWriter + ?Sized>(&self, destination: &mut W) -> Result<(), CompressError> {
        let writer = self.writer()?;
        let mut encoder = self.encoder()?;

        let mut produced = 0;
        for segment in writer.segments() {
            produced += compress_into(&mut encoder, segment, &mut *destination, segment.len(), false)?;
        }

        let final_hint = max_compressed_len(writer.total_written(), self.window).saturating_sub(produced);
        produced += compress_into(&mut encoder, &[], &mut *destination, final_hint, true)?;

        debug!(uncompressed = writer.total_written(), compressed = produced, "compressed to buffer writer");
        Ok(())
    }

    /// Compresses everything written so far into `writer`, one frame per engine flush.
    pub fn copy_to_writer<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<(), CompressError> {
        let mut frames = FrameStream::new(self.writer()?, self.encoder()?);
        while let Some(frame) = frames.next_frame()? {
            writer.write_all(frame)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Async flavor of [`BrotliCompressor::copy_to_writer`].
    ///
    /// Compression itself happens synchronously between the writes.
    pub async fn copy_to_async<W: AsyncWrite + Unpin + ?Sized>(&self, writer: &mut W) -> Result<(), CompressError> {
        let mut frames = FrameStream::new(self.writer()?, self.encoder()?);
        while let Some(frame) = frames.next_frame()? {
            writer.write_all(frame).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    /// Gives the buffered segments back to the pool, later calls fail with
    /// [`CompressError::ObjectDisposed`]. Disposing twice does nothing.
    pub fn dispose(&mut self) {
        if let Some(writer) = self.writer.take() {
            trace!(total_written = writer.total_written(), "dispose compressor");
        }
    }

    fn writer(&self) -> Result<&SegmentedWriter, CompressError> {
        self.writer.as_deref().ok_or(CompressError::ObjectDisposed)
    }

    fn writer_mut(&mut self) -> Result<&mut SegmentedWriter, CompressError> {
        self.writer.as_deref_mut().ok_or(CompressError::ObjectDisposed)
    }

    fn encoder(&self) -> Result<BrotliEncoder, CompressError> {
        BrotliEncoder::new(self.quality, self.window)
    }

    fn disposed_panic() -> ! {
        panic!("{}", CompressError::ObjectDisposed)
    }
}

impl Default for BrotliCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BrotliCompressor {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Lets a serializer write straight into the pooled segments.
///
/// # Panics
///
/// Both methods panic once the compressor has been disposed.
impl BufferWriter for BrotliCompressor {
    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        match self.writer.as_deref_mut() {
            Some(writer) => writer.reserve(size_hint),
            None => Self::disposed_panic(),
        }
    }

    fn commit(&mut self, n: usize) {
        match self.writer.as_deref_mut() {
            Some(writer) => writer.commit(n),
            None => Self::disposed_panic(),
        }
    }
}

impl io::Write for BrotliCompressor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BrotliCompressor::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?;
        Ok(())
    }
}

/// Checks a call into a destination sized to the worst case.
fn check_fixed_progress(progress: Progress, input_len: usize) -> Result<(), CompressError> {
    match progress.status {
        OperationStatus::Done => {
            ensure!(
                progress.consumed == input_len,
                CompressError::compression_failed(format!(
                    "engine consumed {} of {} bytes",
                    progress.consumed, input_len
                ))
            );
            Ok(())
        }
        OperationStatus::DestinationTooSmall => {
            error!(?progress, "compressed output exceeds the precomputed bound");
            Err(CompressError::compression_failed("compressed output exceeds the precomputed bound"))
        }
        OperationStatus::InvalidData => {
            error!(?progress, "engine rejected the input");
            Err(CompressError::compression_failed("engine rejected the input"))
        }
    }
}

/// Feeds `input` through `encoder` into `destination`, growing the reservation until it fits.
///
/// Returns the number of compressed bytes committed.
fn compress_into<W: BufferWriter + ?Sized>(
    encoder: &mut BrotliEncoder,
    mut input: &[u8],
    destination: &mut W,
    size_hint: usize,
    final_block: bool,
) -> Result<usize, CompressError> {
    let mut size_hint = size_hint.max(MIN_SIZE_HINT);
    let mut produced = 0;
    let mut stalled = 0;

    loop {
        let region = destination.reserve(size_hint);
        let progress = encoder.compress(input, region, final_block);
        destination.commit(progress.written);
        produced += progress.written;
        input = &input[progress.consumed..];

        match progress.status {
            OperationStatus::Done => {
                ensure!(
                    input.is_empty(),
                    CompressError::compression_failed(format!("engine left {} bytes unconsumed", input.len()))
                );
                return Ok(produced);
            }
            OperationStatus::DestinationTooSmall => {
                if progress.consumed == 0 && progress.written == 0 {
                    stalled += 1;
                    ensure!(
                        stalled < MAX_STALLED_CALLS,
                        CompressError::compression_failed("engine made no progress on a non-empty destination")
                    );
                } else {
                    stalled = 0;
                }
                size_hint = size_hint.saturating_mul(2).max(input.len() + produced);
                trace!(produced, remaining = input.len(), size_hint, "destination too small, reserve more");
            }
            OperationStatus::InvalidData => {
                error!(?progress, final_block, "engine rejected the input");
                return Err(CompressError::compression_failed("engine rejected the input"));
            }
        }
    }
}
