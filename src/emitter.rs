// src/emitter.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern tiling into bounded chunks
//!
//! The emitter treats its output as one continuous tiling of the pattern that
//! starts at offset 0: the byte at absolute position `i` is always
//! `pattern[i % pattern.len()]`. Chunks can therefore be produced in any size,
//! on any thread, and still concatenate to the same bytes.

use rayon::prelude::*;

use crate::constants::{BLOCK_SIZE, FILLER_BYTE};

/// Fill `out` with `pattern` repeated, starting `phase` bytes into the pattern.
///
/// One period is written directly, then the filled prefix is doubled with
/// `copy_within`, so a chunk of `n` bytes costs O(log(n / pattern_len)) copies.
pub fn fill_tiled(out: &mut [u8], pattern: &[u8], phase: usize) {
    if out.is_empty() {
        return;
    }
    if pattern.is_empty() {
        out.fill(FILLER_BYTE);
        return;
    }

    let p = pattern.len();
    let phase = phase % p;

    // One period, rotated to the requested phase
    let head = (p - phase).min(out.len());
    out[..head].copy_from_slice(&pattern[phase..phase + head]);
    let tail = (p - head).min(out.len() - head);
    out[head..head + tail].copy_from_slice(&pattern[..tail]);

    // `filled` stays a multiple of the period until the final partial copy
    let mut filled = head + tail;
    while filled < out.len() {
        let n = filled.min(out.len() - filled);
        out.copy_within(0..n, filled);
        filled += n;
    }
}

/// Streaming tiler over a fixed total size
pub struct ChunkEmitter {
    pattern: Vec<u8>,
    total_size: usize,
    current_pos: usize,
    max_threads: usize,
    thread_pool: Option<rayon::ThreadPool>, // Created once, reused per chunk
    block_size: usize,
}

impl ChunkEmitter {
    /// Create an emitter that will produce exactly `total_size` bytes of `pattern`
    pub fn new(pattern: &[u8], total_size: usize, max_threads: Option<usize>) -> Self {
        let max_threads = max_threads.unwrap_or_else(num_cpus::get).max(1);
        let block_size = BLOCK_SIZE;

        // Only worth a pool if at least one chunk can span two blocks
        let thread_pool = if max_threads > 1 && total_size >= 2 * block_size {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build()
            {
                Ok(pool) => {
                    tracing::debug!(
                        "ChunkEmitter configured with {} threads (thread pool created)",
                        max_threads
                    );
                    Some(pool)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to create thread pool: {}, falling back to sequential",
                        e
                    );
                    None
                }
            }
        } else {
            tracing::debug!("ChunkEmitter configured for single-threaded operation");
            None
        };

        Self {
            pattern: pattern.to_vec(),
            total_size,
            current_pos: 0,
            max_threads,
            thread_pool,
            block_size,
        }
    }

    /// Fill the next chunk of output.
    ///
    /// Writes `min(buf.len(), remaining)` bytes and returns that count; 0 means
    /// generation is complete.
    pub fn fill_chunk(&mut self, buf: &mut [u8]) -> usize {
        if self.current_pos >= self.total_size {
            tracing::trace!("fill_chunk: already complete");
            return 0;
        }

        let to_write = buf.len().min(self.total_size - self.current_pos);
        let chunk = &mut buf[..to_write];
        let num_blocks = to_write.div_ceil(self.block_size);

        const PARALLEL_THRESHOLD: usize = 2;

        if num_blocks >= PARALLEL_THRESHOLD && self.thread_pool.is_some() {
            self.fill_chunk_parallel(chunk);
        } else {
            self.fill_chunk_sequential(chunk);
        }

        debug_assert!(chunk.is_ascii() || !self.pattern.is_ascii());
        self.current_pos += to_write;

        tracing::trace!(
            "fill_chunk: wrote {} bytes ({} blocks), pos={}/{}",
            to_write,
            num_blocks,
            self.current_pos,
            self.total_size
        );
        to_write
    }

    #[inline]
    fn fill_chunk_sequential(&self, chunk: &mut [u8]) {
        fill_tiled(chunk, &self.pattern, self.phase_at(self.current_pos));
    }

    fn fill_chunk_parallel(&self, chunk: &mut [u8]) {
        let Some(pool) = &self.thread_pool else {
            self.fill_chunk_sequential(chunk);
            return;
        };

        let pattern = &self.pattern;
        let block_size = self.block_size;
        let base = self.current_pos;

        pool.install(|| {
            chunk
                .par_chunks_mut(block_size)
                .enumerate()
                .for_each(|(i, block)| {
                    let phase = if pattern.is_empty() {
                        0
                    } else {
                        (base + i * block_size) % pattern.len()
                    };
                    fill_tiled(block, pattern, phase);
                });
        });
    }

    fn phase_at(&self, pos: usize) -> usize {
        if self.pattern.is_empty() {
            0
        } else {
            pos % self.pattern.len()
        }
    }

    /// Reset to the start of the output
    pub fn reset(&mut self) {
        self.current_pos = 0;
    }

    pub fn position(&self) -> usize {
        self.current_pos
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn remaining(&self) -> usize {
        self.total_size - self.current_pos
    }

    pub fn is_complete(&self) -> bool {
        self.current_pos >= self.total_size
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        use tracing_subscriber::{fmt, EnvFilter};
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    /// Reference tiling, one byte at a time
    fn naive(pattern: &[u8], phase: usize, len: usize) -> Vec<u8> {
        (0..len).map(|i| pattern[(phase + i) % pattern.len()]).collect()
    }

    #[test]
    fn test_fill_tiled_matches_naive() {
        let pattern = b"Token: abc123\n";
        for &len in &[0usize, 1, 13, 14, 15, 27, 28, 29, 1000, 4097] {
            for phase in [0usize, 1, 7, 13, 14, 30] {
                let mut out = vec![0u8; len];
                fill_tiled(&mut out, pattern, phase);
                assert_eq!(out, naive(pattern, phase, len), "len={} phase={}", len, phase);
            }
        }
    }

    #[test]
    fn test_fill_tiled_empty_pattern_uses_filler() {
        let mut out = vec![0u8; 5];
        fill_tiled(&mut out, b"", 3);
        assert_eq!(out, vec![FILLER_BYTE; 5]);
    }

    #[test]
    fn test_streaming_chunks_concatenate() {
        init_tracing();
        let pattern = b"0123456789abcdef-";
        let total = 10_000;

        let mut gen = ChunkEmitter::new(pattern, total, Some(1));
        let mut result = Vec::new();
        let mut chunk = vec![0u8; 333];

        while !gen.is_complete() {
            let written = gen.fill_chunk(&mut chunk);
            if written == 0 {
                break;
            }
            result.extend_from_slice(&chunk[..written]);
        }

        assert_eq!(result.len(), total);
        assert_eq!(result, naive(pattern, 0, total));
        assert_eq!(gen.fill_chunk(&mut chunk), 0);

        gen.reset();
        assert_eq!(gen.position(), 0);
        assert_eq!(gen.remaining(), total);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        init_tracing();
        let pattern = b"<token>q8ZrT1</token>\n";
        let total = 3 * BLOCK_SIZE + 12_345;

        let mut par = ChunkEmitter::new(pattern, total, Some(4));
        let mut seq = ChunkEmitter::new(pattern, total, Some(1));

        // Odd-sized chunks so block boundaries land mid-pattern
        let mut a = vec![0u8; 2 * BLOCK_SIZE + 7];
        let mut b = vec![0u8; 2 * BLOCK_SIZE + 7];
        while !par.is_complete() {
            let na = par.fill_chunk(&mut a);
            let nb = seq.fill_chunk(&mut b);
            assert_eq!(na, nb);
            assert_eq!(&a[..na], &b[..nb]);
        }
        assert!(seq.is_complete());
    }
}
