use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::GapError;
use crate::gap_detector::GapDetector;
use crate::report::{ReportBuilder, SummaryFormat, DEFAULT_MARKER_TEXT};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Minimum silence, in seconds, reported as a gap
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: f64,

    /// Text placed in every entry of the marker track
    #[serde(default = "default_marker_text")]
    pub marker_text: String,

    /// Directory receiving the `gaps/` and `summaries/` folders
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Which artifacts to generate
    #[serde(default)]
    pub outputs: OutputSelection,

    /// Summary file format
    #[serde(default)]
    pub summary_format: SummaryFormat,

    /// Include per-gap details in the summary
    #[serde(default = "default_true")]
    pub detailed_summary: bool,

    /// Maximum number of files processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Artifacts generated per input file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputSelection {
    /// Companion SRT file with one marker entry per gap
    #[serde(default = "default_true")]
    pub marker_track: bool,

    /// Summary report
    #[serde(default = "default_true")]
    pub summary: bool,
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self {
            marker_track: true,
            summary: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_min_gap_secs() -> f64 {
    1.0
}

fn default_marker_text() -> String {
    DEFAULT_MARKER_TEXT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), GapError> {
        // Same check the detector applies
        GapDetector::from_secs(self.min_gap_secs)?;

        if self.marker_text.trim().is_empty() {
            return Err(GapError::Configuration("marker text must not be empty".to_string()));
        }

        // A blank line would end the marker entry early in the written track
        if self.marker_text.lines().any(|line| line.trim().is_empty()) {
            return Err(GapError::Configuration("marker text must not contain blank lines".to_string()));
        }

        if self.concurrency == 0 {
            return Err(GapError::Configuration("concurrency must be at least 1".to_string()));
        }

        if !self.outputs.marker_track && !self.outputs.summary {
            return Err(GapError::Configuration(
                "no output selected: enable the marker track, the summary, or both".to_string(),
            ));
        }

        Ok(())
    }

    /// Gap detector for the configured threshold
    pub fn gap_detector(&self) -> Result<GapDetector, GapError> {
        GapDetector::from_secs(self.min_gap_secs)
    }

    /// Report builder using the configured marker text
    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(self.marker_text.clone())
    }

    /// Load a configuration file, or write and return the defaults when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            min_gap_secs: default_min_gap_secs(),
            marker_text: default_marker_text(),
            output_dir: default_output_dir(),
            outputs: OutputSelection::default(),
            summary_format: SummaryFormat::default(),
            detailed_summary: true,
            concurrency: default_concurrency(),
            log_level: LogLevel::default(),
        }
    }
}
