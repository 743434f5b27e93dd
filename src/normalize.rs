// src/normalize.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-byte-safe pattern normalization
//!
//! After normalization every character is printable ASCII (or `\n`), so the
//! character count equals the byte count and a tiled buffer can be cut at any
//! offset without splitting a multi-byte sequence.

use crate::constants::{FILLER_PHRASE, MIN_PATTERN_BYTES};

/// Placeholder for accented and extended Latin letters
const LATIN_PLACEHOLDER: char = 'a';
/// Placeholder for other alphabetic scripts (Greek, Cyrillic, Hebrew, Arabic ...)
const ALPHABET_PLACEHOLDER: char = 'z';
/// Placeholder for CJK ideographs, kana and Hangul
const CJK_PLACEHOLDER: char = 'x';
/// Everything else: symbols, emoji, private use
const OTHER_PLACEHOLDER: char = '?';

/// Broad script family of a non-ASCII character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptClass {
    Latin,
    Alphabet,
    Cjk,
    Other,
}

impl ScriptClass {
    fn of(c: char) -> Self {
        match c as u32 {
            0x00C0..=0x024F | 0x0250..=0x02AF | 0x1E00..=0x1EFF if c.is_alphabetic() => {
                ScriptClass::Latin
            }
            0x0370..=0x03FF | 0x0400..=0x052F | 0x0530..=0x058F | 0x0590..=0x05FF
            | 0x0600..=0x06FF => ScriptClass::Alphabet,
            0x3000..=0x303F
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xAC00..=0xD7AF
            | 0xFF00..=0xFFEF => ScriptClass::Cjk,
            _ => ScriptClass::Other,
        }
    }

    fn placeholder(self) -> char {
        match self {
            ScriptClass::Latin => LATIN_PLACEHOLDER,
            ScriptClass::Alphabet => ALPHABET_PLACEHOLDER,
            ScriptClass::Cjk => CJK_PLACEHOLDER,
            ScriptClass::Other => OTHER_PLACEHOLDER,
        }
    }
}

fn is_space_like(c: char) -> bool {
    c.is_whitespace() || c.is_control()
}

/// Rewrite `seed` so every character encodes to exactly one byte.
///
/// Whitespace and control runs collapse to a single `\n` when the run held a
/// line break, otherwise to a single space.
pub fn normalize(seed: &str) -> String {
    let mut out = String::with_capacity(seed.len() + FILLER_PHRASE.len());
    // Some(true) = pending run contains a newline
    let mut pending_space: Option<bool> = None;

    for c in seed.chars() {
        if is_space_like(c) {
            let newline = c == '\n' || c == '\r';
            pending_space = Some(pending_space.unwrap_or(false) || newline);
            continue;
        }

        if let Some(newline) = pending_space.take() {
            out.push(if newline { '\n' } else { ' ' });
        }

        if c.is_ascii() {
            out.push(c);
        } else {
            out.push(ScriptClass::of(c).placeholder());
        }
    }

    if let Some(newline) = pending_space {
        out.push(if newline { '\n' } else { ' ' });
    }

    if out.len() < MIN_PATTERN_BYTES {
        tracing::debug!(
            "Normalized pattern is {} bytes, appending filler phrase",
            out.len()
        );
        out.push_str(FILLER_PHRASE);
    }

    debug_assert!(is_single_byte_safe(out.as_bytes()));
    out
}

/// True when every byte is ASCII, i.e. no multi-byte sequence can be split
pub fn is_single_byte_safe(bytes: &[u8]) -> bool {
    bytes.is_ascii()
}
