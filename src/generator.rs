// src/generator.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exact-size content generation
//!
//! Pipeline per request: build and normalize a seed pattern, tile it into
//! bounded chunks written at their final offsets, enforce the exact length,
//! then apply the format envelope (or the skeleton fallback).

use std::io::Write;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context};
use bytes::Bytes;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::assembler::{Assembler, ChunkSink, WriterSink};
use crate::constants::*;
use crate::corpus::Corpus;
use crate::emitter::ChunkEmitter;
use crate::error::GenerateError;
use crate::finalize;
use crate::normalize::is_single_byte_safe;
use crate::pattern::{build_pattern, Pattern};
use crate::progress::{CancellationToken, ProgressSnapshot, ProgressTracker};
use crate::request::{validate_target, ContentMode, Format, GenerationRequest};

/// Tuning knobs for a generation call
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Chunk size ceiling (None = CHUNK_CEILING). Clamped to 1 KiB ..= 50 MiB.
    pub chunk_size: Option<usize>,
    /// Bytes between generating-phase progress reports
    pub progress_interval: u64,
    /// Yield to the scheduler after this many chunks
    pub yield_every: usize,
    /// Maximum number of threads for tiling large chunks (None = all cores)
    pub max_threads: Option<usize>,
    /// Seed for corpus entry and token selection (None = time + urandom).
    /// Zero mode is deterministic regardless.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,                     // CHUNK_CEILING (50 MiB)
            progress_interval: PROGRESS_INTERVAL, // 500 MiB
            yield_every: YIELD_EVERY_CHUNKS,
            max_threads: None, // Use all available cores
            seed: None,        // Use time + urandom
        }
    }
}

impl GeneratorConfig {
    /// Effective chunk ceiling after clamping
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size
            .map(|cs| cs.clamp(MIN_CHUNK_SIZE, CHUNK_CEILING))
            .unwrap_or(CHUNK_CEILING)
    }
}

/// Finished buffer plus its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    data: Bytes,
    mime_type: &'static str,
}

impl GenerationResult {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Simple API: builtin corpus, default config, no progress reporting
///
/// # Example
/// ```rust
/// use fillgen::{generate_simple, ContentMode, Format};
///
/// let result = generate_simple(1024, Format::Json, ContentMode::Zero).unwrap();
/// assert_eq!(result.len(), 1024);
/// assert_eq!(result.mime_type(), "application/json; charset=utf-8");
/// ```
pub fn generate_simple(
    target_bytes: u64,
    format: Format,
    mode: ContentMode,
) -> Result<GenerationResult, GenerateError> {
    let request = GenerationRequest::new(target_bytes, format, mode)?;
    generate(
        &request,
        &Corpus::builtin(),
        &GeneratorConfig::default(),
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
}

/// Generate exactly `request.target_bytes()` bytes in memory.
///
/// # Algorithm
/// 1. Build the seed pattern for the format/mode and normalize it to ASCII
/// 2. Tile it chunk by chunk straight into a pre-sized output region,
///    checking `cancel` before every chunk
/// 3. Trim/pad the region to the exact target
/// 4. Apply the format envelope in place; on an encoding-safety violation
///    substitute the skeleton for the format
///
/// `on_progress` sees preparing → generating → finalizing → complete, with
/// generating reports limited to progress-interval crossings and the last chunk.
pub fn generate<F>(
    request: &GenerationRequest,
    corpus: &Corpus,
    config: &GeneratorConfig,
    on_progress: F,
    cancel: &CancellationToken,
) -> Result<GenerationResult, GenerateError>
where
    F: FnMut(&ProgressSnapshot),
{
    let total = request.target_bytes();
    validate_target(total)?;
    let target = target_len(total)?;
    let chunk_size = config.effective_chunk_size();

    tracing::info!(
        "Starting generation: size={}, format={}, mode={}, chunk_size={}",
        total,
        request.format(),
        request.content_mode(),
        chunk_size
    );

    let mut tracker = ProgressTracker::new(total, config.progress_interval, on_progress);
    tracker.preparing();

    let mut rng = request_rng(config.seed);
    let pattern = build_pattern(request, corpus, &mut rng)?;

    let mut assembler = Assembler::with_target(target)?;
    let mut emitter = ChunkEmitter::new(pattern.as_bytes(), target, config.max_threads);
    emit_chunks(
        &mut emitter,
        &mut assembler,
        chunk_size,
        config.yield_every,
        0,
        total,
        &mut tracker,
        cancel,
    )?;

    tracker.finalizing();
    let data = finalize_or_skeleton(assembler.finish(), &pattern, target);

    if data.len() != target {
        return Err(anyhow!(
            "finalized {} bytes for a {} byte target",
            data.len(),
            target
        )
        .into());
    }

    tracker.complete();
    tracing::info!("Generation complete: {} bytes", data.len());

    Ok(GenerationResult {
        data: Bytes::from(data),
        mime_type: request.format().mime_type(),
    })
}

/// Stream the same bytes `generate` would produce into `writer`.
///
/// Memory use is bounded by one chunk. On cancellation or error the writer
/// may already hold a prefix of the output. Returns the number of bytes written.
pub fn generate_to_writer<W, F>(
    request: &GenerationRequest,
    corpus: &Corpus,
    config: &GeneratorConfig,
    writer: W,
    on_progress: F,
    cancel: &CancellationToken,
) -> Result<u64, GenerateError>
where
    W: Write,
    F: FnMut(&ProgressSnapshot),
{
    let total = request.target_bytes();
    validate_target(total)?;
    let target = target_len(total)?;
    let chunk_size = config.effective_chunk_size();

    tracing::info!(
        "Starting streaming generation: size={}, format={}, mode={}, chunk_size={}",
        total,
        request.format(),
        request.content_mode(),
        chunk_size
    );

    let mut tracker = ProgressTracker::new(total, config.progress_interval, on_progress);
    tracker.preparing();

    let mut rng = request_rng(config.seed);
    let mut pattern = build_pattern(request, corpus, &mut rng)?;
    if !is_single_byte_safe(pattern.as_bytes()) {
        tracing::warn!(
            "Pattern is not single-byte safe, substituting {} skeleton",
            request.format()
        );
        pattern = Pattern::skeleton(request.format());
    }

    let plan = finalize::plan(target, &pattern);
    let mut sink = WriterSink::new(writer, chunk_size.min(plan.keep.max(1)));
    sink.write_raw(plan.prefix)?;

    let mut emitter = ChunkEmitter::new(pattern.as_bytes(), plan.keep, config.max_threads);
    emit_chunks(
        &mut emitter,
        &mut sink,
        chunk_size,
        config.yield_every,
        plan.prefix.len() as u64,
        total,
        &mut tracker,
        cancel,
    )?;
    if plan.keep == 0 {
        // Envelope only, the empty body is complete
        tracker.generating(plan.prefix.len() as u64, true);
    }

    tracker.finalizing();
    sink.write_raw(&vec![plan.pad_byte; plan.pad])?;
    sink.write_raw(plan.suffix)?;

    let written = sink.written();
    sink.into_inner()?;

    if written != total {
        return Err(anyhow!("wrote {} bytes for a {} byte target", written, total).into());
    }

    tracker.complete();
    tracing::info!("Streaming generation complete: {} bytes", written);
    Ok(written)
}

/// Background generation with a pollable progress channel
pub struct GenerationHandle {
    progress: Receiver<ProgressSnapshot>,
    cancel: CancellationToken,
    handle: JoinHandle<Result<GenerationResult, GenerateError>>,
}

impl GenerationHandle {
    /// Progress snapshots, in order; disconnects when generation ends
    pub fn progress(&self) -> &Receiver<ProgressSnapshot> {
        &self.progress
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the generation thread and take its result
    pub fn join(self) -> Result<GenerationResult, GenerateError> {
        self.handle
            .join()
            .map_err(|_| GenerateError::Internal(anyhow!("generation thread panicked")))?
    }
}

/// Run [`generate`] on a dedicated thread
pub fn spawn_generate(
    request: GenerationRequest,
    corpus: Arc<Corpus>,
    config: GeneratorConfig,
) -> Result<GenerationHandle, GenerateError> {
    let (tx, rx) = mpsc::channel();
    let cancel = CancellationToken::new();
    let thread_cancel = cancel.clone();

    let handle = thread::Builder::new()
        .name("fillgen-generate".to_string())
        .spawn(move || {
            generate(
                &request,
                &corpus,
                &config,
                |snapshot: &ProgressSnapshot| {
                    // Receiver may have been dropped; generation carries on
                    let _ = tx.send(*snapshot);
                },
                &thread_cancel,
            )
        })
        .context("spawning generation thread")?;

    Ok(GenerationHandle {
        progress: rx,
        cancel,
        handle,
    })
}

/// Chunk loop shared by the in-memory and streaming paths.
///
/// `base` is the number of output bytes that precede the emitter's first byte
/// (the envelope prefix on the streaming path); progress is reported against
/// `total`.
#[allow(clippy::too_many_arguments)]
fn emit_chunks<S, F>(
    emitter: &mut ChunkEmitter,
    sink: &mut S,
    chunk_size: usize,
    yield_every: usize,
    base: u64,
    total: u64,
    tracker: &mut ProgressTracker<F>,
    cancel: &CancellationToken,
) -> Result<(), GenerateError>
where
    S: ChunkSink,
    F: FnMut(&ProgressSnapshot),
{
    let yield_every = yield_every.max(1);
    let mut chunks = 0usize;

    while !emitter.is_complete() {
        let chunk_len = chunk_size.min(emitter.remaining());

        if cancel.is_cancelled() {
            let produced = base + emitter.position() as u64;
            tracing::info!("Generation cancelled at {}/{} bytes", produced, total);
            return Err(GenerateError::Cancelled { produced, total });
        }

        let slot = sink.next_chunk(chunk_len);
        let written = emitter.fill_chunk(slot);
        if written == 0 {
            break;
        }
        sink.commit(written)
            .with_context(|| format!("committing chunk {}", chunks))?;
        chunks += 1;

        tracker.generating(base + emitter.position() as u64, emitter.is_complete());

        if chunks % yield_every == 0 {
            tracing::trace!("Yielding after {} chunks", chunks);
            thread::yield_now();
        }
    }

    tracing::debug!("Emitted {} chunks ({} bytes)", chunks, emitter.position());
    Ok(())
}

/// Apply the format envelope in place, or fall back to the format skeleton
/// when the tiled bytes are not single-byte safe.
fn finalize_or_skeleton(mut data: Vec<u8>, pattern: &Pattern, target: usize) -> Vec<u8> {
    if let Err(violation) = finalize::apply(&mut data, pattern) {
        tracing::warn!(
            "Encoding safety violation ({}), substituting {} skeleton",
            violation,
            pattern.format()
        );
        return finalize::skeleton(pattern.format(), target);
    }
    data
}

fn target_len(total: u64) -> Result<usize, GenerateError> {
    usize::try_from(total)
        .with_context(|| format!("target of {} bytes does not fit in memory on this platform", total))
        .map_err(GenerateError::from)
}

fn request_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed.unwrap_or_else(generate_call_entropy))
}

/// Generate per-call entropy from time + urandom
fn generate_call_entropy() -> u64 {
    let time_entropy = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let urandom_entropy: u64 = {
        let mut rng = rand::rng();
        rng.next_u64()
    };

    time_entropy.wrapping_add(urandom_entropy)
}
