// src/progress.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress reporting and cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle phase of a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Preparing,
    Generating,
    Finalizing,
    Complete,
}

/// Point-in-time view of a running request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Bytes produced so far
    pub current: u64,
    /// Target size of the request
    pub total: u64,
    pub percentage: f64,
    pub throughput_bytes_per_second: f64,
    pub estimated_seconds_remaining: f64,
    pub phase: Phase,
}

/// Caller-owned cancellation flag, checked once per chunk
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Turns produced-byte counts into rate-limited snapshots.
///
/// `current` never decreases and phases only move forward.
pub(crate) struct ProgressTracker<F: FnMut(&ProgressSnapshot)> {
    total: u64,
    interval: u64,
    next_report: u64,
    last_current: u64,
    last_phase: Option<Phase>,
    started: Instant,
    on_progress: F,
}

impl<F: FnMut(&ProgressSnapshot)> ProgressTracker<F> {
    pub fn new(total: u64, interval: u64, on_progress: F) -> Self {
        let interval = interval.max(1);
        Self {
            total,
            interval,
            next_report: interval,
            last_current: 0,
            last_phase: None,
            started: Instant::now(),
            on_progress,
        }
    }

    pub fn preparing(&mut self) {
        self.emit(0, Phase::Preparing);
    }

    /// Record `produced` bytes; reports only when an interval boundary is
    /// crossed or the final chunk has landed.
    pub fn generating(&mut self, produced: u64, is_final: bool) {
        if !is_final && produced < self.next_report {
            return;
        }
        while self.next_report <= produced {
            self.next_report = self.next_report.saturating_add(self.interval);
        }
        self.emit(produced, Phase::Generating);
    }

    pub fn finalizing(&mut self) {
        self.emit(self.total, Phase::Finalizing);
    }

    pub fn complete(&mut self) {
        self.emit(self.total, Phase::Complete);
    }

    fn emit(&mut self, produced: u64, phase: Phase) {
        if let Some(last) = self.last_phase {
            if phase < last {
                tracing::debug!("Dropping out-of-order {:?} snapshot after {:?}", phase, last);
                return;
            }
        }

        let current = produced.max(self.last_current).min(self.total);
        let elapsed = self.started.elapsed().as_secs_f64();
        let throughput = if elapsed > 0.0 {
            current as f64 / elapsed
        } else {
            0.0
        };
        let remaining = self.total - current;
        let eta = if throughput > 0.0 {
            remaining as f64 / throughput
        } else {
            0.0
        };
        let percentage = if self.total > 0 {
            current as f64 / self.total as f64 * 100.0
        } else {
            100.0
        };

        let snapshot = ProgressSnapshot {
            current,
            total: self.total,
            percentage,
            throughput_bytes_per_second: throughput,
            estimated_seconds_remaining: eta,
            phase,
        };

        tracing::trace!(
            "Progress {:?}: {}/{} ({:.1}%)",
            phase,
            current,
            self.total,
            percentage
        );

        self.last_current = current;
        self.last_phase = Some(phase);
        (self.on_progress)(&snapshot);
    }
}
