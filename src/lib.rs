// src/lib.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exact-size synthetic content generation
//!
//! This library provides:
//! - Byte-exact buffers from 1 byte up to 2 GiB in txt, json, xml or csv
//! - Curated corpus text, random tokens or deterministic zero fill
//! - ASCII-only output, so any truncation point is safe
//! - Bounded chunking with progress reporting and cooperative cancellation
//! - In-memory, streaming (`io::Write`) and background-thread entry points

// Core modules
pub mod assembler;
pub mod constants;
pub mod corpus;
pub mod emitter;
pub mod error;
pub mod finalize;
pub mod generator;
pub mod normalize;
pub mod pattern;
pub mod progress;
pub mod request;

// Re-export main API
pub use corpus::{Corpus, CorpusEntry};
pub use error::{GenerateError, ValidationError};
pub use generator::{
    generate, generate_simple, generate_to_writer, spawn_generate, GenerationHandle,
    GenerationResult, GeneratorConfig,
};
pub use progress::{CancellationToken, Phase, ProgressSnapshot};
pub use request::{ContentMode, Format, GenerationRequest};
