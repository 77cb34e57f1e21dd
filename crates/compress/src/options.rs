use crate::error::CompressError;
use crate::utils::ensure;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Valid brotli quality, `0` spends no effort and `11` compresses best.
pub const QUALITY_RANGE: RangeInclusive<i32> = 0..=11;

/// Valid brotli window, as the base 2 logarithm of the history size.
pub const WINDOW_RANGE: RangeInclusive<i32> = 10..=24;

pub const DEFAULT_WINDOW: i32 = 22;

const QUALITY_OPTIMAL: i32 = 4;

/// Named compression levels, mapped onto a brotli quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    /// quality 4
    Optimal,
    /// quality 1
    #[default]
    Fastest,
    /// quality 0
    NoCompression,
    /// quality 11
    SmallestSize,
}

impl CompressionLevel {
    pub fn quality(self) -> i32 {
        match self {
            CompressionLevel::Optimal => QUALITY_OPTIMAL,
            CompressionLevel::Fastest => 1,
            CompressionLevel::NoCompression => *QUALITY_RANGE.start(),
            CompressionLevel::SmallestSize => *QUALITY_RANGE.end(),
        }
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = CompressError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionLevel::Optimal),
            1 => Ok(CompressionLevel::Fastest),
            2 => Ok(CompressionLevel::NoCompression),
            3 => Ok(CompressionLevel::SmallestSize),
            _ => Err(CompressError::invalid_argument(format!("unknown compression level {value}"))),
        }
    }
}

/// Engine tuning of a compressor, deserializable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorOptions {
    pub quality: i32,
    pub window: i32,
}

impl CompressorOptions {
    pub fn new(quality: i32, window: i32) -> Self {
        Self { quality, window }
    }

    pub fn from_level(level: CompressionLevel) -> Self {
        Self::new(level.quality(), DEFAULT_WINDOW)
    }

    pub fn validate(&self) -> Result<(), CompressError> {
        ensure!(
            QUALITY_RANGE.contains(&self.quality),
            CompressError::invalid_argument(format!("quality {} is outside {:?}", self.quality, QUALITY_RANGE))
        );
        ensure!(
            WINDOW_RANGE.contains(&self.window),
            CompressError::invalid_argument(format!("window {} is outside {:?}", self.window, WINDOW_RANGE))
        );
        Ok(())
    }
}

impl Default for CompressorOptions {
    fn default() -> Self {
        Self::from_level(CompressionLevel::default())
    }
}
