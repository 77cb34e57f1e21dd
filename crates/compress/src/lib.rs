//! Pooled, streaming brotli compression for binary serializers
//!
//! A serializer produces bytes incrementally and rarely knows the final size up front. This
//! crate accumulates those bytes in reusable, segmented buffers and compresses them with brotli
//! only when the result is requested, without ever growing one contiguous buffer by copying.
//!
//! # Example
//!
//! ```
//! use pack_compress::{BrotliCompressor, BytesWriter, CompressionLevel};
//! use std::io::Read;
//!
//! let mut compressor = BrotliCompressor::with_level(CompressionLevel::Optimal);
//! compressor.write(b"hello ").unwrap();
//! compressor.write(b"world").unwrap();
//!
//! // one contiguous buffer
//! let compressed = compressor.to_vec().unwrap();
//!
//! // or straight into a growable sink
//! let mut sink = BytesWriter::new();
//! compressor.copy_to(&mut sink).unwrap();
//!
//! let mut decompressed = Vec::new();
//! brotli::Decompressor::new(&compressed[..], 4096).read_to_end(&mut decompressed).unwrap();
//! assert_eq!(decompressed, b"hello world");
//!
//! // hand the segments back to the pool
//! compressor.dispose();
//! ```
//!
//! # Architecture
//!
//! - [`buffer`]: the reserve/commit [`BufferWriter`] contract and the [`SegmentedWriter`]
//! - [`pool`]: thread-safe [`Pool`] lending writers and destination buffers
//! - [`engine`]: the brotli encoder behind a span-in, span-out call
//! - [`compressor`]: the [`BrotliCompressor`] session tying them together
//!
//! # Error Handling
//!
//! Every fallible operation returns [`CompressError`]:
//!
//! - [`CompressError::ObjectDisposed`]: the compressor was already disposed
//! - [`CompressError::CompressionFailed`]: the engine failed, the session can't be resumed
//! - [`CompressError::InvalidArgument`]: quality, window or level out of range
//! - [`CompressError::Io`]: the output stream failed
//!
//! Misusing the reserve/commit contract (committing more than reserved) is a bug and panics.

pub mod buffer;
pub mod compressor;
pub mod engine;
mod error;
pub mod options;
pub mod pool;
mod utils;

pub use buffer::{BufferWriter, BytesWriter, SegmentedWriter};
pub use compressor::{BrotliCompressor, CompressorBuilder};
pub use error::CompressError;
pub use options::{CompressionLevel, CompressorOptions};
pub use pool::{Pool, PoolConfig, Pooled, Recycle};
