//! Growable byte sinks built around a reserve/commit contract.
//!
//! Writers hand out a writable region with [`BufferWriter::reserve`] and are told how much
//! of it was filled with [`BufferWriter::commit`]. This lets producers (a serializer, or the
//! compression engine) write straight into the sink's memory without an intermediate copy.
//!
//! - [`SegmentedWriter`]: a chain of fixed-capacity segments, reusable after [`SegmentedWriter::reset`]
//! - [`BytesWriter`]: a single contiguous `BytesMut` backed sink

mod bytes_writer;
mod segment;
mod segmented_writer;

pub use bytes_writer::BytesWriter;
pub use segmented_writer::SegmentedWriter;
pub use segmented_writer::Segments;
pub(crate) use segmented_writer::{DEFAULT_INITIAL_SEGMENT_SIZE, DEFAULT_MAX_SEGMENT_SIZE};

/// A sink that exposes its memory through a reserve/commit pair.
pub trait BufferWriter {
    /// Returns a writable region sized after `size_hint`.
    ///
    /// The region is never empty. Implementations may return less than `size_hint` bytes,
    /// so callers must look at the returned length instead of assuming the hint was honored.
    fn reserve(&mut self, size_hint: usize) -> &mut [u8];

    /// Marks the first `n` bytes of the last reserved region as written.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the length of the last region returned by [`BufferWriter::reserve`].
    fn commit(&mut self, n: usize);
}

impl<W: BufferWriter + ?Sized> BufferWriter for &mut W {
    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        (**self).reserve(size_hint)
    }

    fn commit(&mut self, n: usize) {
        (**self).commit(n);
    }
}
