// src/pattern.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seed pattern construction
//!
//! A pattern is one short, repeatable unit of content (one record for the
//! structured formats). It is built fresh for every request and always passes
//! through [`normalize`](crate::normalize::normalize), so its bytes are ASCII.

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::constants::{EXCERPT_CHARS, TOKEN_LEN, ZERO_RUN};
use crate::corpus::{Corpus, CorpusEntry};
use crate::error::ValidationError;
use crate::normalize::normalize;
use crate::request::{ContentMode, Format, GenerationRequest};

/// Normalized seed unit plus what the finalizer needs to know about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    format: Format,
    mode: ContentMode,
    record_aligned: bool,
}

impl Pattern {
    fn new(seed: String, format: Format, mode: ContentMode, record_aligned: bool) -> Self {
        Self {
            text: normalize(&seed),
            format,
            mode,
            record_aligned,
        }
    }

    /// Fixed, always-valid unit used when tiled content has to be discarded
    pub fn skeleton(format: Format) -> Self {
        let seed = match format {
            Format::Txt => "lorem ipsum dolor sit amet\n",
            Format::Json => "{\"value\":0},",
            Format::Xml => "<value>0</value>\n",
            Format::Csv => "0\n0\n0\n0\n0\n0\n",
        };
        Self::new(seed.to_string(), format, ContentMode::Zero, true)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    /// Every tile is one complete record; the finalizer may cut back to a tile boundary
    pub fn is_record_aligned(&self) -> bool {
        self.record_aligned
    }
}

/// Build the seed pattern for `request`, drawing any randomness from `rng`.
pub fn build_pattern<R: Rng>(
    request: &GenerationRequest,
    corpus: &Corpus,
    rng: &mut R,
) -> Result<Pattern, ValidationError> {
    let format = request.format();
    let mode = request.content_mode();

    let pattern = match mode {
        ContentMode::Curated => {
            let allowed = corpus.select(request.corpus_selection())?;
            let entry = allowed[rng.random_range(0..allowed.len())];
            tracing::debug!("Curated pattern from corpus entry '{}'", entry.id);
            Pattern::new(curated_seed(entry, format), format, mode, format != Format::Txt)
        }
        ContentMode::Random => {
            let token: String = (0..TOKEN_LEN)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect();
            Pattern::new(random_seed(&token, format), format, mode, format != Format::Txt)
        }
        ContentMode::Zero => Pattern::new(zero_seed(format), format, mode, format == Format::Json),
    };

    tracing::debug!(
        "Built {} {} pattern: {} bytes, record_aligned={}",
        format,
        mode,
        pattern.len(),
        pattern.is_record_aligned()
    );
    Ok(pattern)
}

fn curated_seed(entry: &CorpusEntry, format: Format) -> String {
    let title = flatten(&entry.title);
    let excerpt: String = flatten(&entry.text).chars().take(EXCERPT_CHARS).collect();
    // Short excerpts take the filler inside the content field, never after the record
    let excerpt = normalize(excerpt.trim_end());
    let excerpt = excerpt.trim();

    match format {
        Format::Txt => format!("Title: {}\nContent: {}\n---\n", title, excerpt),
        Format::Json => format!(
            "{{\"id\":\"{}\",\"title\":\"{}\",\"content\":\"{}\"}},",
            escape_json(&flatten(&entry.id)),
            escape_json(&title),
            escape_json(excerpt)
        ),
        Format::Xml => format!(
            "<entry id=\"{}\"><title>{}</title><content>{}</content></entry>\n",
            escape_xml(&flatten(&entry.id)),
            escape_xml(&title),
            escape_xml(excerpt)
        ),
        Format::Csv => format!("\"{}\",\"{}\"\n", escape_csv(&title), escape_csv(excerpt)),
    }
}

fn random_seed(token: &str, format: Format) -> String {
    match format {
        Format::Txt => format!("Token: {}\n", token),
        Format::Json => format!("{{\"token\":\"{}\"}},", token),
        Format::Xml => format!("<token>{}</token>\n", token),
        Format::Csv => format!("\"{}\"\n", token),
    }
}

fn zero_seed(format: Format) -> String {
    match format {
        Format::Txt => format!("{}\n", "0".repeat(ZERO_RUN)),
        Format::Json => "0,".repeat(ZERO_RUN / 2),
        Format::Xml | Format::Csv => "0".repeat(ZERO_RUN),
    }
}

/// Collapse all whitespace and control characters so a field stays on one line
fn flatten(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
