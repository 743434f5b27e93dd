// src/constants.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Largest accepted target size (2 GiB)
/// Output is held in a single pre-sized buffer, so this bounds peak memory
pub const MAX_TARGET_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Smallest accepted target size
pub const MIN_TARGET_BYTES: u64 = 1;

/// Hard ceiling on a single chunk (50 MiB)
/// Bounds per-step allocation and the worst-case cancellation latency
pub const CHUNK_CEILING: usize = 50 * 1024 * 1024;

/// Smallest chunk size a config may request (1 KiB)
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Parallel sub-block size inside a chunk (4 MiB)
pub const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Emit a generating snapshot each time this many bytes have been produced (500 MiB)
pub const PROGRESS_INTERVAL: u64 = 500 * 1024 * 1024;

/// Yield to the scheduler after this many chunks
pub const YIELD_EVERY_CHUNKS: usize = 20;

/// Normalized patterns shorter than this get `FILLER_PHRASE` appended
pub const MIN_PATTERN_BYTES: usize = 10;

/// Appended to very short patterns so tiling stays efficient
pub const FILLER_PHRASE: &str = " lorem ipsum dolor sit amet";

/// Pad byte for the final trim/pad in the assembler
pub const FILLER_BYTE: u8 = b' ';

/// Characters of corpus text taken into a curated pattern
pub const EXCERPT_CHARS: usize = 160;

/// Length of a random-mode token
pub const TOKEN_LEN: usize = 24;

/// Length of the zero-mode run
pub const ZERO_RUN: usize = 64;
