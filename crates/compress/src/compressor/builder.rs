use crate::buffer::SegmentedWriter;
use crate::compressor::BrotliCompressor;
use crate::error::CompressError;
use crate::options::{CompressionLevel, CompressorOptions};
use crate::pool::{Pool, buffer_pool, writer_pool};
use std::sync::Arc;

/// Configures a [`BrotliCompressor`], pools default to the process-wide ones.
#[derive(Debug)]
pub struct CompressorBuilder {
    options: CompressorOptions,
    writer_pool: Option<Arc<Pool<SegmentedWriter>>>,
    buffer_pool: Option<Arc<Pool<Vec<u8>>>>,
}

impl CompressorBuilder {
    pub(crate) fn new() -> Self {
        Self { options: CompressorOptions::default(), writer_pool: None, buffer_pool: None }
    }

    pub fn quality(mut self, quality: i32) -> Self {
        self.options.quality = quality;
        self
    }

    pub fn window(mut self, window: i32) -> Self {
        self.options.window = window;
        self
    }

    /// Sets the quality from a named level, the window is left untouched.
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.options.quality = level.quality();
        self
    }

    pub fn options(mut self, options: CompressorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn writer_pool(mut self, pool: Arc<Pool<SegmentedWriter>>) -> Self {
        self.writer_pool = Some(pool);
        self
    }

    pub fn buffer_pool(mut self, pool: Arc<Pool<Vec<u8>>>) -> Self {
        self.buffer_pool = Some(pool);
        self
    }

    /// Validates the options and rents the compressor's writer.
    pub fn build(self) -> Result<BrotliCompressor, CompressError> {
        self.options.validate()?;
        let writer_pool = self.writer_pool.unwrap_or_else(writer_pool);
        let buffer_pool = self.buffer_pool.unwrap_or_else(buffer_pool);
        Ok(BrotliCompressor::create(self.options, &writer_pool, buffer_pool))
    }
}
