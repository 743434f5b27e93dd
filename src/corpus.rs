// src/corpus.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only corpus of curated text entries
//!
//! The corpus is owned by the caller; generation only borrows it to pick one
//! entry per request.

use std::collections::BTreeSet;
use std::io::Read;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ValidationError;

/// One curated text entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl CorpusEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Collection of corpus entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Small multilingual sample set shipped with the crate
    pub fn builtin() -> Self {
        Self::new(vec![
            CorpusEntry::new(
                "pride-and-prejudice",
                "Pride and Prejudice",
                "It is a truth universally acknowledged, that a single man in possession \
                 of a good fortune, must be in want of a wife.",
            ),
            CorpusEntry::new(
                "moby-dick",
                "Moby-Dick",
                "Call me Ishmael. Some years ago, never mind how long precisely, having \
                 little or no money in my purse, and nothing particular to interest me on \
                 shore, I thought I would sail about a little and see the watery part of \
                 the world.",
            ),
            CorpusEntry::new(
                "anna-karenina",
                "Анна Каренина",
                "Все счастливые семьи похожи друг на друга, каждая несчастливая семья \
                 несчастлива по-своему.",
            ),
            CorpusEntry::new(
                "les-miserables",
                "Les Misérables",
                "En 1815, M. Charles-François-Bienvenu Myriel était évêque de Digne. \
                 C'était un vieillard d'environ soixante-quinze ans.",
            ),
            CorpusEntry::new(
                "hojoki",
                "方丈記",
                "ゆく河の流れは絶えずして、しかももとの水にあらず。よどみに浮かぶうたかたは、\
                 かつ消えかつ結びて、久しくとどまりたるためしなし。",
            ),
            CorpusEntry::new(
                "tale-of-two-cities",
                "A Tale of Two Cities",
                "It was the best of times, it was the worst of times, it was the age of \
                 wisdom, it was the age of foolishness, it was the epoch of belief.",
            ),
        ])
    }

    /// Parse a JSON array of `{"id", "title", "text"}` objects
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CorpusEntry> =
            serde_json::from_str(json).context("parsing corpus JSON")?;
        Ok(Self::new(entries))
    }

    /// Read a JSON corpus from any reader (file, socket, ...)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let entries: Vec<CorpusEntry> =
            serde_json::from_reader(reader).context("reading corpus JSON")?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries eligible for a request: all of them for an empty selection,
    /// otherwise those whose id is selected.
    pub fn select(&self, selection: &BTreeSet<String>) -> Result<Vec<&CorpusEntry>, ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::EmptyCorpus);
        }
        if selection.is_empty() {
            return Ok(self.entries.iter().collect());
        }

        let allowed: Vec<&CorpusEntry> = self
            .entries
            .iter()
            .filter(|e| selection.contains(&e.id))
            .collect();

        if allowed.is_empty() {
            return Err(ValidationError::UnknownSelection {
                ids: selection.iter().cloned().collect(),
            });
        }

        tracing::debug!(
            "Corpus selection: {} of {} entries allowed",
            allowed.len(),
            self.entries.len()
        );
        Ok(allowed)
    }
}
