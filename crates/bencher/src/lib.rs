#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    payload: TestPayload,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, payload: TestPayload) -> Self {
        Self { name, group, payload }
    }

    pub fn small(name: &'static str, payload: TestPayload) -> Self {
        Self::new(name, TestGroup::Small, payload)
    }

    pub fn normal(name: &'static str, payload: TestPayload) -> Self {
        Self::new(name, TestGroup::Normal, payload)
    }

    pub fn large(name: &'static str, payload: TestPayload) -> Self {
        Self::new(name, TestGroup::Large, payload)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn payload(&self) -> &TestPayload {
        &self.payload
    }
}

/// A serializer-like payload: `records` records of `record_size` bytes each, written one by one.
#[derive(Debug, Copy, Clone)]
pub struct TestPayload {
    records: usize,
    record_size: usize,
}

impl TestPayload {
    pub const fn new(records: usize, record_size: usize) -> Self {
        Self { records, record_size }
    }

    pub fn total_len(&self) -> usize {
        self.records * self.record_size
    }

    /// Builds the records, half repetitive field names and half varying values.
    pub fn records(&self) -> Vec<Vec<u8>> {
        (0..self.records)
            .map(|i| {
                (0..self.record_size)
                    .map(|j| if j % 2 == 0 { b"field"[j / 2 % 5] } else { ((i * 31 + j * 7) % 251) as u8 })
                    .collect()
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}
