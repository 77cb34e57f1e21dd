use crate::buffer::BufferWriter;
use bytes::{Bytes, BytesMut};

/// A contiguous [`BufferWriter`] backed by `BytesMut`.
///
/// Reserved but uncommitted memory stays in the buffer as scratch space, so repeated
/// reserve/commit rounds only zero new memory when the buffer actually grows.
#[derive(Debug, Default)]
pub struct BytesWriter {
    buf: BytesMut,
    written: usize,
    reserved: usize,
}

impl BytesWriter {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity), written: 0, reserved: 0 }
    }

    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    /// Forgets the written bytes, keeping the memory for the next round.
    pub fn clear(&mut self) {
        self.written = 0;
        self.reserved = 0;
    }

    /// Splits off the written bytes, leaving the writer empty.
    pub fn take(&mut self) -> Bytes {
        let written = self.buf.split_to(self.written);
        self.written = 0;
        self.reserved = 0;
        written.freeze()
    }

    pub fn into_bytes(mut self) -> Bytes {
        self.buf.truncate(self.written);
        self.buf.freeze()
    }
}

impl BufferWriter for BytesWriter {
    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        let required = self.written + size_hint.max(1);
        if self.buf.len() < required {
            self.buf.resize(required, 0);
        }
        self.reserved = self.buf.len() - self.written;
        &mut self.buf[self.written..]
    }

    fn commit(&mut self, n: usize) {
        assert!(n <= self.reserved, "commit {} bytes exceeds the reserved {} bytes", n, self.reserved);
        self.written += n;
        self.reserved = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_commit_take() {
        let mut writer = BytesWriter::with_capacity(2);

        let region = writer.reserve(5);
        assert!(region.len() >= 5);
        region[..5].copy_from_slice(b"hello");
        writer.commit(5);

        let region = writer.reserve(1);
        region[0] = b'!';
        writer.commit(1);

        assert_eq!(writer.len(), 6);
        assert_eq!(writer.as_slice(), b"hello!");
        assert_eq!(&writer.take()[..], b"hello!");
        assert!(writer.is_empty());
    }

    #[test]
    fn test_clear_reuses_memory() {
        let mut writer = BytesWriter::with_capacity(0);
        writer.reserve(32);
        writer.commit(32);
        writer.clear();

        assert!(writer.is_empty());
        assert!(writer.reserve(1).len() >= 32);
    }

    #[test]
    fn test_uncommitted_bytes_are_dropped() {
        let mut writer = BytesWriter::new();
        let region = writer.reserve(8);
        region[..8].copy_from_slice(b"abcdefgh");
        writer.commit(3);

        assert_eq!(&writer.into_bytes()[..], b"abc");
    }

    #[test]
    #[should_panic(expected = "exceeds the reserved")]
    fn test_commit_without_reserve() {
        let mut writer = BytesWriter::new();
        writer.commit(1);
    }
}
