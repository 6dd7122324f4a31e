/*!
 * Report generation for detected gaps.
 *
 * Produces the gap marker track (one synthetic subtitle per gap) and the
 * textual summaries in three formats:
 * - `Plain`: fixed-width text
 * - `Markdown`: tables and per-gap sections
 * - `Json`: structured output for tooling
 *
 * All outputs are deterministic for a given gap list and statistics.
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::encoding::TextEncoding;
use crate::errors::GapError;
use crate::file_utils::FileManager;
use crate::gap_detector::{Gap, GapStatistics};
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};

/// Marker text used when none is configured
pub const DEFAULT_MARKER_TEXT: &str = "[Silence]";

/// Width of the label column in plain-text summaries
const PLAIN_LABEL_WIDTH: usize = 18;

/// Summary output format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    Plain,
    #[default]
    Markdown,
    Json,
}

impl SummaryFormat {
    /// File extension for a summary written in this format
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Plain => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

/// Format milliseconds as HH:MM:SS.mmm
pub fn format_duration_ms(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Last line of the entry preceding a gap
fn trailing_line(text: &str) -> &str {
    text.lines().last().unwrap_or("")
}

/// First line of the entry following a gap
fn leading_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Builds marker tracks and summaries from detected gaps
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    marker_text: String,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_TEXT)
    }
}

impl ReportBuilder {
    pub fn new(marker_text: impl Into<String>) -> Self {
        Self { marker_text: marker_text.into() }
    }

    pub fn marker_text(&self) -> &str {
        &self.marker_text
    }

    /// One synthetic entry per gap, numbered from 1, carrying the marker text
    pub fn build_marker_track(&self, gaps: &[Gap]) -> SubtitleCollection {
        let mut track = SubtitleCollection::new(PathBuf::new());
        track.encoding = TextEncoding::Utf8Bom.name().into_owned();
        track.entries = gaps
            .iter()
            .enumerate()
            .map(|(i, gap)| {
                SubtitleEntry::new(i + 1, gap.start_time_ms, gap.end_time_ms, self.marker_text.clone())
            })
            .collect();
        track
    }

    /// Statistics-only summary
    pub fn build_summary(&self, stats: &GapStatistics, format: SummaryFormat) -> String {
        match format {
            SummaryFormat::Plain => Self::plain_summary(stats),
            SummaryFormat::Markdown => Self::markdown_summary(stats),
            SummaryFormat::Json => format!("{:#}", json!({ "statistics": Self::json_statistics(stats) })),
        }
    }

    /// Summary followed by per-gap details and context lines
    pub fn build_detailed_summary(&self, gaps: &[Gap], stats: &GapStatistics, format: SummaryFormat) -> String {
        match format {
            SummaryFormat::Plain => Self::plain_details(gaps, stats),
            SummaryFormat::Markdown => Self::markdown_details(gaps, stats),
            SummaryFormat::Json => {
                let gaps: Vec<_> = gaps
                    .iter()
                    .enumerate()
                    .map(|(i, gap)| {
                        let mut value = serde_json::to_value(gap).unwrap_or_default();
                        value["index"] = json!(i + 1);
                        value["start"] = json!(format_duration_ms(gap.start_time_ms));
                        value["end"] = json!(format_duration_ms(gap.end_time_ms));
                        value["duration"] = json!(format_duration_ms(gap.duration_ms));
                        value["previous_line"] = json!(trailing_line(&gap.previous_text));
                        value["next_line"] = json!(leading_line(&gap.next_text));
                        value
                    })
                    .collect();

                format!("{:#}", json!({
                    "statistics": Self::json_statistics(stats),
                    "gaps": gaps,
                }))
            }
        }
    }

    /// Write report text as UTF-8, creating parent directories
    pub fn persist<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<(), GapError> {
        FileManager::write_to_file(path, text)
    }

    fn plain_summary(stats: &GapStatistics) -> String {
        let rows = [
            ("Total gaps", stats.total_gaps.to_string()),
            ("Total duration", format_duration_ms(stats.total_duration_ms)),
            ("Average duration", format_duration_ms(stats.average_duration_ms)),
            ("Minimum duration", format_duration_ms(stats.min_duration_ms)),
            ("Maximum duration", format_duration_ms(stats.max_duration_ms)),
        ];

        let mut lines = vec!["Gap Detection Summary".to_string(), "=====================".to_string()];
        lines.extend(
            rows.iter()
                .map(|(label, value)| format!("{:<width$}: {}", label, value, width = PLAIN_LABEL_WIDTH)),
        );
        lines.join("\n")
    }

    fn plain_details(gaps: &[Gap], stats: &GapStatistics) -> String {
        let mut lines = vec![
            Self::plain_summary(stats),
            String::new(),
            "Gap Details".to_string(),
            "===========".to_string(),
        ];

        if gaps.is_empty() {
            lines.push("No gaps detected.".to_string());
        }

        for (i, gap) in gaps.iter().enumerate() {
            lines.push(format!(
                "#{:<4} {} -> {}  ({})",
                i + 1,
                format_duration_ms(gap.start_time_ms),
                format_duration_ms(gap.end_time_ms),
                format_duration_ms(gap.duration_ms)
            ));
            lines.push(format!("      before: {}", trailing_line(&gap.previous_text)));
            lines.push(format!("      after:  {}", leading_line(&gap.next_text)));
        }

        lines.join("\n")
    }

    fn markdown_summary(stats: &GapStatistics) -> String {
        [
            "# Gap Detection Summary\n".to_string(),
            "| Metric | Value |".to_string(),
            "|--------|--------|".to_string(),
            format!("| Total Gaps | {} |", stats.total_gaps),
            format!("| Total Duration | `{}` |", format_duration_ms(stats.total_duration_ms)),
            format!("| Average Duration | `{}` |", format_duration_ms(stats.average_duration_ms)),
            format!("| Minimum Duration | `{}` |", format_duration_ms(stats.min_duration_ms)),
            format!("| Maximum Duration | `{}` |", format_duration_ms(stats.max_duration_ms)),
        ]
        .join("\n")
    }

    fn markdown_details(gaps: &[Gap], stats: &GapStatistics) -> String {
        let mut lines = vec![
            Self::markdown_summary(stats),
            "\n## Detailed Gap Information\n".to_string(),
        ];

        if gaps.is_empty() {
            lines.push("_No gaps detected._".to_string());
        }

        for (i, gap) in gaps.iter().enumerate() {
            lines.extend([
                format!("### Gap #{}", i + 1),
                format!("**Start Time:** `{}`", format_duration_ms(gap.start_time_ms)),
                format!("**End Time:** `{}`", format_duration_ms(gap.end_time_ms)),
                format!("**Duration:** `{}`", format_duration_ms(gap.duration_ms)),
                "\n**Context:**".to_string(),
                format!("- Previous subtitle: _{}_", trailing_line(&gap.previous_text)),
                format!("- Next subtitle: _{}_\n", leading_line(&gap.next_text)),
            ]);
        }

        lines.join("\n")
    }

    // Serialized fields plus their HH:MM:SS.mmm renderings
    fn json_statistics(stats: &GapStatistics) -> serde_json::Value {
        let mut value = serde_json::to_value(stats).unwrap_or_default();
        value["total_duration"] = json!(format_duration_ms(stats.total_duration_ms));
        value["average_duration"] = json!(format_duration_ms(stats.average_duration_ms));
        value["min_duration"] = json!(format_duration_ms(stats.min_duration_ms));
        value["max_duration"] = json!(format_duration_ms(stats.max_duration_ms));
        value
    }
}
