/// One fixed-capacity buffer with a write cursor.
///
/// `written` never exceeds the capacity of `buf`.
#[derive(Debug)]
pub(crate) struct Segment {
    buf: Box<[u8]>,
    written: usize,
}

impl Segment {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { buf: vec![0; capacity].into_boxed_slice(), written: 0 }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.written
    }

    pub(crate) fn written_bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.written..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        assert!(n <= self.remaining(), "advance {} bytes exceeds the remaining {} bytes", n, self.remaining());
        self.written += n;
    }

    pub(crate) fn reset(&mut self) {
        self.written = 0;
    }
}
