// src/assembler.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunk destinations
//!
//! [`Assembler`] writes chunks straight into one pre-sized output region at
//! their final offsets; [`WriterSink`] reuses a single chunk buffer and
//! streams to an `io::Write`.

use std::io::Write;

use anyhow::{Context, Result};

use crate::constants::FILLER_BYTE;

/// Where emitted chunks are placed
pub trait ChunkSink {
    /// Writable slot of exactly `len` bytes for the next chunk
    fn next_chunk(&mut self, len: usize) -> &mut [u8];

    /// Accept the first `len` bytes of the slot returned by `next_chunk`
    fn commit(&mut self, len: usize) -> Result<()>;
}

/// In-memory sink that owns the final buffer
pub struct Assembler {
    target: usize,
    buf: Vec<u8>,
    slot_start: usize,
}

impl Assembler {
    /// Reserve the whole output region up front
    pub fn with_target(target: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(target)
            .with_context(|| format!("reserving {} bytes for generated output", target))?;
        tracing::debug!("Allocated {} byte output region", target);
        Ok(Self {
            target,
            buf,
            slot_start: 0,
        })
    }

    /// Bytes committed so far
    pub fn len(&self) -> usize {
        self.slot_start
    }

    pub fn is_empty(&self) -> bool {
        self.slot_start == 0
    }

    /// Authoritative trim/pad to exactly the target length
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.truncate(self.slot_start);
        if self.buf.len() != self.target {
            tracing::warn!(
                "Assembled {} bytes for a {} byte target, adjusting",
                self.buf.len(),
                self.target
            );
            self.buf.resize(self.target, FILLER_BYTE);
        }
        self.buf
    }
}

impl ChunkSink for Assembler {
    fn next_chunk(&mut self, len: usize) -> &mut [u8] {
        self.buf.truncate(self.slot_start);
        self.buf.resize(self.slot_start + len, 0);
        &mut self.buf[self.slot_start..]
    }

    fn commit(&mut self, len: usize) -> Result<()> {
        self.slot_start = (self.slot_start + len).min(self.buf.len());
        Ok(())
    }
}

/// Streaming sink backed by one reusable chunk buffer
pub struct WriterSink<W: Write> {
    writer: W,
    buf: Vec<u8>,
    written: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, chunk_size: usize) -> Self {
        Self {
            writer,
            buf: vec![0u8; chunk_size],
            written: 0,
        }
    }

    /// Write bytes that bypass the chunk buffer (envelope prefix, padding, suffix)
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .with_context(|| format!("writing {} bytes at offset {}", bytes.len(), self.written))?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and hand the writer back
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush().context("flushing generated output")?;
        Ok(self.writer)
    }
}

impl<W: Write> ChunkSink for WriterSink<W> {
    fn next_chunk(&mut self, len: usize) -> &mut [u8] {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
        &mut self.buf[..len]
    }

    fn commit(&mut self, len: usize) -> Result<()> {
        self.writer
            .write_all(&self.buf[..len])
            .with_context(|| format!("writing {} byte chunk at offset {}", len, self.written))?;
        self.written += len as u64;
        Ok(())
    }
}
