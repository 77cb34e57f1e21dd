use crate::buffer::{BytesWriter, SegmentedWriter, Segments};
use crate::compressor::compress_into;
use crate::engine::{BrotliEncoder, max_compressed_len};
use crate::error::CompressError;
use tracing::trace;

/// Drives one brotli stream over a writer's segments, yielding the compressed bytes produced
/// by each engine call as a frame.
pub(crate) struct FrameStream<'a> {
    segments: Segments<'a>,
    encoder: BrotliEncoder,
    scratch: BytesWriter,
    total_in: usize,
    produced: usize,
    finished: bool,
}

impl<'a> FrameStream<'a> {
    pub(crate) fn new(writer: &'a SegmentedWriter, encoder: BrotliEncoder) -> Self {
        Self {
            segments: writer.segments(),
            encoder,
            scratch: BytesWriter::new(),
            total_in: writer.total_written(),
            produced: 0,
            finished: false,
        }
    }

    /// Returns the next non-empty frame, or `None` once the final block has been returned.
    pub(crate) fn next_frame(&mut self) -> Result<Option<&[u8]>, CompressError> {
        self.scratch.clear();

        while self.scratch.is_empty() {
            if self.finished {
                return Ok(None);
            }

            match self.segments.next() {
                Some(segment) => {
                    self.produced += compress_into(&mut self.encoder, segment, &mut self.scratch, segment.len(), false)?;
                }
                None => {
                    let size_hint = max_compressed_len(self.total_in, self.encoder.window()).saturating_sub(self.produced);
                    self.produced += compress_into(&mut self.encoder, &[], &mut self.scratch, size_hint, true)?;
                    self.finished = true;
                    trace!(total_in = self.total_in, produced = self.produced, "final frame");
                }
            }
        }

        Ok(Some(self.scratch.as_slice()))
    }
}
