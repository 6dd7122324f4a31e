/*!
 * Gap detection between consecutive subtitle entries.
 *
 * A gap is the silence between the end of one entry and the start of the
 * next, kept when it lasts at least the configured minimum. Entries are
 * sorted by start time first, since source order is not trusted.
 */

use std::time::Duration;

use serde::Serialize;

use crate::errors::GapError;
use crate::subtitle_processor::SubtitleEntry;

/// A silence between two subtitle entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    /// End of the preceding entry, in ms
    pub start_time_ms: u64,

    /// Start of the following entry, in ms
    pub end_time_ms: u64,

    /// end - start, in ms
    pub duration_ms: u64,

    /// Text of the preceding entry
    pub previous_text: String,

    /// Text of the following entry
    pub next_text: String,
}

/// Aggregate statistics over a list of gaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GapStatistics {
    pub total_gaps: usize,
    pub total_duration_ms: u64,
    /// Truncated integer mean
    pub average_duration_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
}

impl GapStatistics {
    /// Compute statistics; an empty list gives all zeros
    pub fn from_gaps(gaps: &[Gap]) -> Self {
        if gaps.is_empty() {
            return Self::default();
        }

        let total_duration_ms: u64 = gaps.iter().map(|gap| gap.duration_ms).sum();
        let durations = gaps.iter().map(|gap| gap.duration_ms);

        Self {
            total_gaps: gaps.len(),
            total_duration_ms,
            average_duration_ms: total_duration_ms / gaps.len() as u64,
            min_duration_ms: durations.clone().min().unwrap_or_default(),
            max_duration_ms: durations.max().unwrap_or_default(),
        }
    }
}

/// Detects gaps of at least `min_gap` between subtitle entries
#[derive(Debug, Clone)]
pub struct GapDetector {
    min_gap: Duration,
}

impl GapDetector {
    /// `min_gap` must be positive; use `from_secs` to have that checked
    pub fn new(min_gap: Duration) -> Self {
        Self { min_gap }
    }

    /// Build a detector from a threshold in seconds, rejecting non-positive values
    pub fn from_secs(min_gap_secs: f64) -> Result<Self, GapError> {
        if !min_gap_secs.is_finite() || min_gap_secs <= 0.0 {
            return Err(GapError::Configuration(format!(
                "minimum gap duration must be greater than 0 seconds, got {}",
                min_gap_secs
            )));
        }

        // Subtitle timing has millisecond resolution
        let min_gap_ms = (min_gap_secs * 1000.0).round();
        if min_gap_ms < 1.0 {
            return Err(GapError::Configuration(format!(
                "minimum gap duration must be at least 1 millisecond, got {} seconds",
                min_gap_secs
            )));
        }

        Ok(Self::new(Duration::from_millis(min_gap_ms as u64)))
    }

    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Find all gaps and their statistics. Never fails and keeps no state.
    pub fn detect(&self, entries: &[SubtitleEntry]) -> (Vec<Gap>, GapStatistics) {
        let mut sorted: Vec<&SubtitleEntry> = entries.iter().collect();
        // Stable: entries starting together keep their source order
        sorted.sort_by_key(|entry| entry.start_time_ms);

        let gaps: Vec<Gap> = sorted
            .windows(2)
            .filter_map(|pair| self.gap_between(pair[0], pair[1]))
            .collect();

        let stats = GapStatistics::from_gaps(&gaps);
        (gaps, stats)
    }

    fn gap_between(&self, current: &SubtitleEntry, next: &SubtitleEntry) -> Option<Gap> {
        // Overlapping entries have no gap
        let duration_ms = next.start_time_ms.checked_sub(current.end_time_ms)?;

        if Duration::from_millis(duration_ms) < self.min_gap {
            return None;
        }

        Some(Gap {
            start_time_ms: current.end_time_ms,
            end_time_ms: next.start_time_ms,
            duration_ms,
            previous_text: current.text.clone(),
            next_text: next.text.clone(),
        })
    }
}

/// Convenience wrapper around `GapDetector::detect`
pub fn detect_gaps(entries: &[SubtitleEntry], min_gap: Duration) -> (Vec<Gap>, GapStatistics) {
    GapDetector::new(min_gap).detect(entries)
}
