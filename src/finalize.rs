// src/finalize.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Length-preserving format finishing
//!
//! The tiled body is shifted right to make room for the format envelope and
//! cut back from the end by the same amount, so the output length never
//! changes. For record-aligned patterns the cut lands on a tile boundary and
//! the leftover slot is filled with whitespace the format ignores.
//!
//! Targets smaller than an envelope are returned unwrapped: exact length
//! always wins over structure.

use crate::emitter::fill_tiled;
use crate::error::EncodingSafetyViolation;
use crate::pattern::Pattern;
use crate::request::{ContentMode, Format};

/// Structural wrapper for one format/content-mode pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub prefix: &'static str,
    pub suffix: &'static str,
    /// Whitespace used to fill the slot between the kept body and the suffix
    pub pad: u8,
    /// Record separator that must not precede the suffix
    pub trailing_separator: Option<u8>,
}

impl Envelope {
    pub const NONE: Envelope = Envelope {
        prefix: "",
        suffix: "",
        pad: b' ',
        trailing_separator: None,
    };

    pub fn for_output(format: Format, mode: ContentMode) -> Self {
        match format {
            Format::Txt => Envelope::NONE,
            Format::Json => Envelope {
                prefix: "[",
                suffix: "]",
                pad: b' ',
                trailing_separator: Some(b','),
            },
            Format::Xml => {
                let (prefix, suffix) = match mode {
                    ContentMode::Curated => (
                        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<entries>\n",
                        "</entries>\n",
                    ),
                    ContentMode::Random => (
                        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tokens>\n",
                        "</tokens>\n",
                    ),
                    ContentMode::Zero => (
                        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<values>\n",
                        "\n</values>\n",
                    ),
                };
                Envelope {
                    prefix,
                    suffix,
                    pad: b'\n',
                    trailing_separator: None,
                }
            }
            Format::Csv => Envelope {
                prefix: match mode {
                    ContentMode::Curated => "title,content\n",
                    ContentMode::Random => "token\n",
                    ContentMode::Zero => "value\n",
                },
                suffix: "",
                pad: b'\n',
                trailing_separator: None,
            },
        }
    }

    pub fn overhead(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }
}

/// Smallest target that still receives the full envelope
pub fn minimum_wrapped_size(format: Format, mode: ContentMode) -> usize {
    Envelope::for_output(format, mode).overhead()
}

/// Byte layout of a finished buffer: `prefix | body[..keep] | pad | suffix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub prefix: &'static [u8],
    pub keep: usize,
    pub pad: usize,
    pub pad_byte: u8,
    pub suffix: &'static [u8],
}

impl Plan {
    fn identity(target: usize) -> Self {
        Plan {
            prefix: b"",
            keep: target,
            pad: 0,
            pad_byte: b' ',
            suffix: b"",
        }
    }

    pub fn is_identity(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty() && self.pad == 0
    }

    pub fn len(&self) -> usize {
        self.prefix.len() + self.keep + self.pad + self.suffix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the layout of a `target`-byte buffer tiled with `pattern`.
pub fn plan(target: usize, pattern: &Pattern) -> Plan {
    let env = Envelope::for_output(pattern.format(), pattern.mode());
    let overhead = env.overhead();

    if overhead == 0 {
        return Plan::identity(target);
    }
    if target < overhead {
        tracing::debug!(
            "Target {} is below the {} byte {} envelope, leaving content unwrapped",
            target,
            overhead,
            pattern.format()
        );
        return Plan::identity(target);
    }

    let slot = target - overhead;
    let p = pattern.len();
    let mut keep = if pattern.is_record_aligned() && p > 0 {
        slot / p * p
    } else {
        slot
    };

    if let Some(sep) = env.trailing_separator {
        if keep > 0 && p > 0 && pattern.as_bytes()[(keep - 1) % p] == sep {
            keep -= 1;
        }
    }

    let plan = Plan {
        prefix: env.prefix.as_bytes(),
        keep,
        pad: slot - keep,
        pad_byte: env.pad,
        suffix: env.suffix.as_bytes(),
    };
    tracing::debug!(
        "Finalize plan for {} bytes: prefix={}, keep={}, pad={}, suffix={}",
        target,
        plan.prefix.len(),
        plan.keep,
        plan.pad,
        plan.suffix.len()
    );
    plan
}

/// Wrap the tiled buffer in place without changing its length.
///
/// Fails only when the buffer is not single-byte safe; the caller then
/// substitutes [`skeleton`].
pub(crate) fn apply(buf: &mut [u8], pattern: &Pattern) -> Result<(), EncodingSafetyViolation> {
    if let Some(offset) = buf.iter().position(|b| !b.is_ascii()) {
        return Err(EncodingSafetyViolation {
            offset,
            byte: buf[offset],
        });
    }

    let plan = plan(buf.len(), pattern);
    if plan.is_identity() {
        return Ok(());
    }
    if buf.starts_with(plan.prefix) && buf.ends_with(plan.suffix) {
        tracing::debug!("Content already wrapped, leaving as is");
        return Ok(());
    }

    apply_plan(buf, &plan);
    Ok(())
}

fn apply_plan(buf: &mut [u8], plan: &Plan) {
    debug_assert_eq!(plan.len(), buf.len());
    let prefix_len = plan.prefix.len();
    let body_end = prefix_len + plan.keep;
    let pad_end = body_end + plan.pad;

    buf.copy_within(0..plan.keep, prefix_len);
    buf[..prefix_len].copy_from_slice(plan.prefix);
    buf[body_end..pad_end].fill(plan.pad_byte);
    buf[pad_end..].copy_from_slice(plan.suffix);
}

/// Minimal, always-valid `target`-byte buffer for `format`
pub fn skeleton(format: Format, target: usize) -> Vec<u8> {
    let pattern = Pattern::skeleton(format);
    let mut buf = vec![0u8; target];
    fill_tiled(&mut buf, pattern.as_bytes(), 0);
    let plan = plan(target, &pattern);
    if !plan.is_identity() {
        apply_plan(&mut buf, &plan);
    }
    buf
}
