//! The brotli engine seen through a span-in, span-out contract.
//!
//! [`BrotliEncoder::compress`] takes an input span and an output span and reports how many bytes
//! it consumed and produced, so the caller decides where the output goes and how to grow it.

use crate::error::CompressError;
use crate::utils::ensure;
use brotli::enc::StandardAlloc;
use brotli::enc::encode::{BrotliEncoderOperation, BrotliEncoderParameter, BrotliEncoderStateStruct};
use std::fmt;

/// Outcome of one [`BrotliEncoder::compress`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// the whole input was consumed and no output is pending
    Done,
    /// the output span filled up before the call could finish
    DestinationTooSmall,
    /// the engine rejected the call, its state is unusable
    InvalidData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub status: OperationStatus,
    pub consumed: usize,
    pub written: usize,
}

impl Progress {
    fn new(status: OperationStatus, consumed: usize, written: usize) -> Self {
        Self { status, consumed, written }
    }

    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }
}

/// Largest block the engine may close as one meta-block without adding header overhead.
const MAX_BLOCK_BITS: u32 = 14;

/// Worst case size of the brotli stream for `input_len` bytes compressed in one pass with a
/// `window` bits sliding window.
///
/// Covers the stream header, one uncompressed meta-block header per block and the last empty
/// meta-block. A block is 16 KiB, or `1 << window` bytes for smaller windows since the fastest
/// qualities never put more than one window into a meta-block.
pub fn max_compressed_len(input_len: usize, window: u32) -> usize {
    if input_len == 0 {
        return 2;
    }
    let num_blocks = input_len >> window.min(MAX_BLOCK_BITS);
    let overhead = 2 + 4 * num_blocks + 3 + 1;
    input_len.saturating_add(overhead)
}

/// One brotli stream in progress.
pub struct BrotliEncoder {
    state: BrotliEncoderStateStruct<StandardAlloc>,
    total_out: Option<usize>,
    quality: u32,
    window: u32,
}

impl BrotliEncoder {
    /// Creates an encoder, `quality` and `window` must already be in their valid ranges.
    pub fn new(quality: u32, window: u32) -> Result<Self, CompressError> {
        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());
        ensure!(
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_QUALITY, quality),
            CompressError::invalid_argument(format!("brotli rejected quality {quality}"))
        );
        ensure!(
            state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_LGWIN, window),
            CompressError::invalid_argument(format!("brotli rejected window {window}"))
        );
        Ok(Self { state, total_out: Some(0), quality, window })
    }

    /// Compresses `input` into `output`.
    ///
    /// With `final_block` set the stream is finished: buffered input is flushed and the last
    /// meta-block is written. Only an empty `input` should be passed with `final_block`.
    ///
    /// On [`OperationStatus::DestinationTooSmall`] the reported `consumed` and `written` bytes are
    /// already final, the call must be repeated with the rest of the input and a fresh output.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8], final_block: bool) -> Progress {
        let op = if final_block {
            BrotliEncoderOperation::BROTLI_OPERATION_FINISH
        } else {
            BrotliEncoderOperation::BROTLI_OPERATION_PROCESS
        };

        let mut available_in = input.len();
        let mut in_offset = 0;
        let mut available_out = output.len();
        let mut out_offset = 0;

        loop {
            let ok = self.state.compress_stream(
                op,
                &mut available_in,
                input,
                &mut in_offset,
                &mut available_out,
                output,
                &mut out_offset,
                &mut self.total_out,
                &mut |_, _, _, _| (),
            );
            if !ok {
                return Progress::new(OperationStatus::InvalidData, in_offset, out_offset);
            }

            let finished = !final_block || self.state.is_finished();
            if available_in == 0 && !self.state.has_more_output() && finished {
                return Progress::new(OperationStatus::Done, in_offset, out_offset);
            }

            if available_out == 0 {
                return Progress::new(OperationStatus::DestinationTooSmall, in_offset, out_offset);
            }
        }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Total compressed bytes produced so far.
    pub fn total_out(&self) -> usize {
        self.total_out.unwrap_or_default()
    }
}

impl fmt::Debug for BrotliEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrotliEncoder")
            .field("quality", &self.quality)
            .field("window", &self.window)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}
