use crate::buffer::{DEFAULT_INITIAL_SEGMENT_SIZE, DEFAULT_MAX_SEGMENT_SIZE};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_MAX_IDLE: usize = 64;

/// Sizing of a writer [`Pool`](crate::pool::Pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle writers kept around, extra returned writers are dropped. `0` disables caching.
    pub max_idle: usize,
    /// Capacity of the first segment a new writer allocates.
    pub initial_segment_size: usize,
    /// Upper bound of the doubling segment growth, larger reservations still get their size.
    pub max_segment_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
            initial_segment_size: DEFAULT_INITIAL_SEGMENT_SIZE,
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
        }
    }
}
