// src/error.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for content generation

use thiserror::Error;

/// Request rejected before any chunk work starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target size {requested} bytes is below the minimum of {min} bytes")]
    TooSmall { requested: u64, min: u64 },

    #[error("target size {requested} bytes exceeds the maximum of {max} bytes")]
    TooLarge { requested: u64, max: u64 },

    #[error("curated content requested but the corpus is empty")]
    EmptyCorpus,

    #[error("corpus selection matched no entries: {ids:?}")]
    UnknownSelection { ids: Vec<String> },
}

/// Failure surfaced to callers of the generation API
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("generation cancelled after {produced} of {total} bytes")]
    Cancelled { produced: u64, total: u64 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GenerateError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerateError::Cancelled { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GenerateError::Validation(_))
    }
}

/// Assembled content contains a byte that is not single-byte safe.
///
/// Only used inside the finalizer fallback chain; callers never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("non-ASCII byte {byte:#04x} at offset {offset}")]
pub(crate) struct EncodingSafetyViolation {
    pub offset: usize,
    pub byte: u8,
}
