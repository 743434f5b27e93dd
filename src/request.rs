// src/request.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request data model: output format, content strategy and target size

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_TARGET_BYTES, MIN_TARGET_BYTES};
use crate::error::ValidationError;

/// Logical output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Txt,
    Json,
    Xml,
    Csv,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Txt, Format::Json, Format::Xml, Format::Csv];

    /// MIME type label attached to the generated buffer
    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Txt => "text/plain; charset=utf-8",
            Format::Json => "application/json; charset=utf-8",
            Format::Xml => "application/xml; charset=utf-8",
            Format::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Txt => "txt",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Csv => "csv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Format::Txt),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "csv" => Ok(Format::Csv),
            other => Err(format!("unknown format '{}' (expected txt|json|xml|csv)", other)),
        }
    }
}

/// Content strategy used to build the repeating pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Title and excerpt from a corpus entry
    Curated,
    /// Pseudo-random alphanumeric token
    Random,
    /// Fixed run of '0' characters (deterministic)
    Zero,
}

impl ContentMode {
    pub const ALL: [ContentMode; 3] = [ContentMode::Curated, ContentMode::Random, ContentMode::Zero];
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentMode::Curated => "curated",
            ContentMode::Random => "random",
            ContentMode::Zero => "zero",
        })
    }
}

impl FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "curated" => Ok(ContentMode::Curated),
            "random" => Ok(ContentMode::Random),
            "zero" => Ok(ContentMode::Zero),
            other => Err(format!(
                "unknown content mode '{}' (expected curated|random|zero)",
                other
            )),
        }
    }
}

/// A single generation request
///
/// Construction validates the target size, so a `GenerationRequest` in hand
/// always describes an acceptable amount of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    target_bytes: u64,
    format: Format,
    content_mode: ContentMode,
    corpus_selection: BTreeSet<String>,
}

impl GenerationRequest {
    /// Create a request, rejecting sizes outside `[MIN_TARGET_BYTES, MAX_TARGET_BYTES]`
    pub fn new(
        target_bytes: u64,
        format: Format,
        content_mode: ContentMode,
    ) -> Result<Self, ValidationError> {
        validate_target(target_bytes)?;
        Ok(Self {
            target_bytes,
            format,
            content_mode,
            corpus_selection: BTreeSet::new(),
        })
    }

    /// Restrict curated content to the given corpus entry ids (empty = whole corpus)
    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.corpus_selection = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }

    pub fn corpus_selection(&self) -> &BTreeSet<String> {
        &self.corpus_selection
    }
}

/// Size check shared by request construction and the generation entry points
pub fn validate_target(target_bytes: u64) -> Result<(), ValidationError> {
    if target_bytes < MIN_TARGET_BYTES {
        return Err(ValidationError::TooSmall {
            requested: target_bytes,
            min: MIN_TARGET_BYTES,
        });
    }
    if target_bytes > MAX_TARGET_BYTES {
        return Err(ValidationError::TooLarge {
            requested: target_bytes,
            max: MAX_TARGET_BYTES,
        });
    }
    Ok(())
}
