use crate::buffer::BufferWriter;
use crate::buffer::segment::Segment;
use std::io;
use std::iter::FusedIterator;
use std::slice;
use tracing::trace;

pub(crate) const DEFAULT_INITIAL_SEGMENT_SIZE: usize = 8 * 1024;
pub(crate) const DEFAULT_MAX_SEGMENT_SIZE: usize = 1024 * 1024;

/// A growable writer made of a chain of fixed-capacity segments.
///
/// Growing never copies committed bytes: when the tail segment can't hold a reservation the
/// writer moves on to the next segment, reusing a retained one when it is large enough and
/// allocating otherwise. New segments double in size from `initial_segment_size` up to
/// `max_segment_size`, but are always at least as large as the reservation.
///
/// [`SegmentedWriter::reset`] forgets the written bytes but keeps every segment, so a writer
/// that is reset and refilled with the same write pattern doesn't allocate again.
#[derive(Debug)]
pub struct SegmentedWriter {
    segments: Vec<Segment>,
    // number of segments in use since the last reset, the tail is `active - 1`
    active: usize,
    total_written: usize,
    reserved: usize,
    next_segment_size: usize,
    max_segment_size: usize,
}

impl SegmentedWriter {
    pub fn new() -> Self {
        Self::with_segment_sizes(DEFAULT_INITIAL_SEGMENT_SIZE, DEFAULT_MAX_SEGMENT_SIZE)
    }

    /// Creates an empty writer, no segment is allocated until the first reservation.
    pub fn with_segment_sizes(initial_segment_size: usize, max_segment_size: usize) -> Self {
        let initial_segment_size = initial_segment_size.max(1);
        Self {
            segments: Vec::new(),
            active: 0,
            total_written: 0,
            reserved: 0,
            next_segment_size: initial_segment_size,
            max_segment_size: max_segment_size.max(initial_segment_size),
        }
    }

    /// Total bytes committed since the last reset.
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    pub fn is_empty(&self) -> bool {
        self.total_written == 0
    }

    /// Sum of the capacity of every retained segment.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    /// Number of retained segments, used or not.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Iterates the written bytes segment by segment, in write order.
    ///
    /// The iterator borrows the writer, so it can be created as many times as needed.
    pub fn segments(&self) -> Segments<'_> {
        Segments { inner: self.segments[..self.active].iter() }
    }

    /// Appends `data`, filling the tail segment before moving to the next one.
    pub fn extend_from_slice(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let region = self.reserve(1);
            let n = region.len().min(data.len());
            region[..n].copy_from_slice(&data[..n]);
            self.commit(n);
            data = &data[n..];
        }
    }

    /// Copies every written byte into one contiguous `Vec`.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(self.total_written);
        for segment in self.segments() {
            vec.extend_from_slice(segment);
        }
        vec
    }

    /// Forgets all written bytes while keeping the allocated segments for reuse.
    pub fn reset(&mut self) {
        for segment in &mut self.segments[..self.active] {
            segment.reset();
        }
        self.active = 0;
        self.total_written = 0;
        self.reserved = 0;
    }

    fn next_segment(&mut self, min_size: usize) {
        let next = self.active;
        let reusable = self.segments.get(next).is_some_and(|segment| segment.capacity() >= min_size);

        if !reusable {
            let size = min_size.max(self.next_segment_size);
            self.next_segment_size = (self.next_segment_size.saturating_mul(2)).min(self.max_segment_size);

            trace!(size, index = next, "allocate new segment");
            let segment = Segment::with_capacity(size);
            if next < self.segments.len() {
                // the retained one is too small for this reservation
                self.segments[next] = segment;
            } else {
                self.segments.push(segment);
            }
        }

        self.active = next + 1;
    }
}

impl Default for SegmentedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferWriter for SegmentedWriter {
    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        let min_size = size_hint.max(1);
        let fits = self.active > 0 && self.segments[self.active - 1].remaining() >= min_size;
        if !fits {
            self.next_segment(min_size);
        }

        let segment = &mut self.segments[self.active - 1];
        self.reserved = segment.remaining();
        segment.spare_mut()
    }

    fn commit(&mut self, n: usize) {
        assert!(n <= self.reserved, "commit {} bytes exceeds the reserved {} bytes", n, self.reserved);
        if n > 0 {
            self.segments[self.active - 1].advance(n);
            self.total_written += n;
        }
        self.reserved = 0;
    }
}

impl io::Write for SegmentedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Iterator over the written bytes of a [`SegmentedWriter`], skipping empty segments.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    inner: slice::Iter<'a, Segment>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|segment| segment.written() > 0).map(Segment::written_bytes)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl FusedIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn collect(writer: &SegmentedWriter) -> Vec<Vec<u8>> {
        writer.segments().map(<[u8]>::to_vec).collect()
    }

    #[test]
    fn test_reserve_commit() {
        let mut writer = SegmentedWriter::with_segment_sizes(16, 64);

        let region = writer.reserve(4);
        assert!(region.len() >= 4);
        region[..4].copy_from_slice(b"AAAA");
        writer.commit(4);

        assert_eq!(writer.total_written(), 4);
        assert_eq!(collect(&writer), vec![b"AAAA".to_vec()]);
    }

    #[test]
    fn test_grow_without_copy() {
        let mut writer = SegmentedWriter::with_segment_sizes(4, 64);
        writer.extend_from_slice(b"0123456789");

        assert_eq!(writer.total_written(), 10);
        assert_eq!(collect(&writer), vec![b"0123".to_vec(), b"456789".to_vec()]);
        assert_eq!(writer.segment_count(), 2);
        assert_eq!(writer.to_vec(), b"0123456789");
    }

    #[test]
    fn test_large_reservation_allocates_at_least_the_hint() {
        let mut writer = SegmentedWriter::with_segment_sizes(4, 8);
        let region = writer.reserve(100);
        assert!(region.len() >= 100);
        writer.commit(100);
        assert_eq!(writer.total_written(), 100);
    }

    #[test]
    fn test_partial_tail_is_left_behind() {
        let mut writer = SegmentedWriter::with_segment_sizes(8, 64);
        writer.extend_from_slice(b"abcdef");

        let region = writer.reserve(4);
        region[..4].copy_from_slice(b"WXYZ");
        writer.commit(4);

        assert_eq!(collect(&writer), vec![b"abcdef".to_vec(), b"WXYZ".to_vec()]);
        assert_eq!(writer.total_written(), 10);
    }

    #[test]
    fn test_segments_is_restartable() {
        let mut writer = SegmentedWriter::with_segment_sizes(2, 2);
        writer.extend_from_slice(b"abcde");

        let segments = writer.segments();
        let first: Vec<&[u8]> = segments.clone().collect();
        let second: Vec<&[u8]> = segments.collect();
        assert_eq!(first, second);
        assert_eq!(first.concat(), b"abcde");
    }

    #[test]
    fn test_reset_retains_capacity() {
        let mut writer = SegmentedWriter::with_segment_sizes(4, 16);
        writer.extend_from_slice(&[7u8; 40]);

        let capacity = writer.capacity();
        let segment_count = writer.segment_count();

        writer.reset();
        assert_eq!(writer.total_written(), 0);
        assert!(writer.is_empty());
        assert_eq!(writer.segments().count(), 0);
        assert_eq!(writer.capacity(), capacity);

        writer.extend_from_slice(&[9u8; 40]);
        assert_eq!(writer.capacity(), capacity);
        assert_eq!(writer.segment_count(), segment_count);
        assert_eq!(writer.to_vec(), vec![9u8; 40]);
    }

    #[test]
    fn test_io_write() {
        let mut writer = SegmentedWriter::with_segment_sizes(3, 3);
        write!(writer, "hello {}", 42).unwrap();
        assert_eq!(writer.to_vec(), b"hello 42");
    }

    #[test]
    fn test_commit_zero_without_reserve() {
        let mut writer = SegmentedWriter::new();
        writer.commit(0);
        assert!(writer.is_empty());
    }

    #[test]
    #[should_panic(expected = "exceeds the reserved")]
    fn test_commit_without_reserve() {
        let mut writer = SegmentedWriter::new();
        writer.commit(1);
    }

    #[test]
    #[should_panic(expected = "exceeds the reserved")]
    fn test_commit_more_than_reserved() {
        let mut writer = SegmentedWriter::with_segment_sizes(4, 4);
        let len = writer.reserve(4).len();
        writer.commit(len + 1);
    }

    #[test]
    #[should_panic(expected = "exceeds the reserved")]
    fn test_double_commit() {
        let mut writer = SegmentedWriter::with_segment_sizes(4, 4);
        writer.reserve(2);
        writer.commit(2);
        writer.commit(1);
    }
}
