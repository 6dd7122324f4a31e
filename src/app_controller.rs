use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app_config::Config;
use crate::errors::GapError;
use crate::file_utils::{ExpandedInput, FileManager};
use crate::report::format_duration_ms;
use crate::subtitle_processor::{SubtitleCollection, ACCEPTED_EXTENSIONS};

// @module: Application controller for gap detection over many files

// @const: Subfolder of the output directory holding marker tracks
pub const GAPS_DIR: &str = "gaps";

// @const: Subfolder of the output directory holding summaries
pub const SUMMARIES_DIR: &str = "summaries";

/// What was produced for one successfully processed file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Number of gaps found
    pub gap_count: usize,

    /// Sum of all gap durations in ms
    pub total_gap_ms: u64,

    /// Encoding the source was decoded with
    pub encoding: String,

    /// Path of the generated marker track, if requested
    pub marker_track: Option<PathBuf>,

    /// Path of the generated summary, if requested
    pub summary: Option<PathBuf>,

    /// Non-fatal notes from parsing
    pub notes: Vec<String>,
}

/// Result of processing a single input file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<FileReport, GapError>,
}

impl FileOutcome {
    fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Outcomes of a batch, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Total gaps over all successful files
    pub fn total_gaps(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.gap_count)
            .sum()
    }

    /// Failure counts keyed by error category
    pub fn failures_by_category(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            if let Err(e) = &outcome.result {
                *counts.entry(e.category()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Progress messages emitted while a batch runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Number of files about to be processed
    Queued { total: usize },
    /// A file has started processing
    Started(PathBuf),
    /// A file has finished, successfully or not
    Finished(FileOutcome),
}

/// Main application controller for gap detection
#[derive(Debug, Clone)]
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given, validated, configuration
    pub fn with_config(config: Config) -> Result<Self, GapError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Artifact paths `process_file` writes for `input`, as selected in the config
    pub fn output_paths(&self, input: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
        let marker_track = self.config.outputs.marker_track.then(|| {
            FileManager::generate_output_path(input, self.config.output_dir.join(GAPS_DIR), "gaps", "srt")
        });

        let summary = self.config.outputs.summary.then(|| {
            FileManager::generate_output_path(
                input,
                self.config.output_dir.join(SUMMARIES_DIR),
                "summary",
                self.config.summary_format.file_extension(),
            )
        });

        (marker_track, summary)
    }

    /// Run the load → detect → report pipeline for one file and write its artifacts
    pub fn process_file(&self, input: &Path) -> Result<FileReport, GapError> {
        let detector = self.config.gap_detector()?;
        let builder = self.config.report_builder();

        let track = SubtitleCollection::load(input)?;
        let (gaps, stats) = detector.detect(&track.entries);
        let (marker_track, summary) = self.output_paths(input);

        if let Some(path) = &marker_track {
            builder.build_marker_track(&gaps).write_to_srt(path, true)?;
        }

        if let Some(path) = &summary {
            let format = self.config.summary_format;
            let text = if self.config.detailed_summary {
                builder.build_detailed_summary(&gaps, &stats, format)
            } else {
                builder.build_summary(&stats, format)
            };
            builder.persist(&text, path)?;
        }

        Ok(FileReport {
            gap_count: stats.total_gaps,
            total_gap_ms: stats.total_duration_ms,
            encoding: track.encoding,
            marker_track,
            summary,
            notes: track.notes,
        })
    }

    /// Reserve the artifact paths of `input`, failing if an earlier input already holds one
    fn claim_outputs(&self, input: &Path, claimed: &mut HashMap<PathBuf, PathBuf>) -> Result<(), GapError> {
        let (marker_track, summary) = self.output_paths(input);
        let outputs: Vec<PathBuf> = marker_track.into_iter().chain(summary).collect();

        if let Some((output, owner)) = outputs
            .iter()
            .find_map(|output| claimed.get(output).map(|owner| (output, owner)))
        {
            return Err(GapError::invalid_input(format!(
                "output {} is already written for {}",
                output.display(),
                owner.display()
            )));
        }

        for output in outputs {
            claimed.insert(output, input.to_path_buf());
        }
        Ok(())
    }

    /// Process every input (directories are searched for subtitle files).
    ///
    /// Files run as independent blocking tasks, at most `config.concurrency` at
    /// once. A failing file never aborts the batch; its error is kept in the
    /// returned report. Unreadable directory entries and inputs whose artifacts
    /// would overwrite those of an earlier input fail without being processed.
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> BatchReport {
        let mut claimed = HashMap::new();
        let files: Vec<ExpandedInput> = FileManager::expand_inputs(inputs, &ACCEPTED_EXTENSIONS)
            .into_iter()
            .map(|mut file| {
                if file.error.is_none() {
                    file.error = self.claim_outputs(&file.path, &mut claimed).err();
                }
                file
            })
            .collect();

        if let Some(tx) = &progress {
            let _ = tx.send(ProgressEvent::Queued { total: files.len() });
        }

        let mut indexed: Vec<(usize, FileOutcome)> = stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| {
                let controller = self.clone();
                let progress = progress.clone();

                async move {
                    if let Some(tx) = &progress {
                        let _ = tx.send(ProgressEvent::Started(file.path.clone()));
                    }

                    let result = match file.error {
                        Some(e) => Err(e),
                        None => {
                            let task_input = file.path.clone();
                            tokio::task::spawn_blocking(move || controller.process_file(&task_input))
                                .await
                                .unwrap_or_else(|e| {
                                    Err(GapError::IoFailure(format!("processing task failed: {}", e)))
                                })
                        }
                    };

                    let outcome = FileOutcome { input: file.path, result };
                    if let Some(tx) = &progress {
                        let _ = tx.send(ProgressEvent::Finished(outcome.clone()));
                    }

                    (index, outcome)
                }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);

        BatchReport {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }

    /// Run the batch with a progress bar and log every outcome
    pub async fn run_with_progress(&self, inputs: &[PathBuf]) -> BatchReport {
        // Start timing the process
        let start_time = Instant::now();

        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let pb = progress_bar.clone();
        let consumer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    ProgressEvent::Queued { total } => pb.set_length(total as u64),
                    ProgressEvent::Started(path) => {
                        let name = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
                        pb.set_message(format!("Processing: {}", name));
                    }
                    ProgressEvent::Finished(outcome) => {
                        pb.suspend(|| Self::log_outcome(&outcome));
                        pb.inc(1);
                    }
                }
            }
            pb.finish_and_clear();
        });

        let report = self.run(inputs, Some(tx)).await;
        if let Err(e) = consumer.await {
            warn!("Progress reporting stopped early: {}", e);
        }

        if report.outcomes.is_empty() {
            warn!("No subtitle files found in the given inputs");
            return report;
        }

        info!(
            "Processing completed: {} succeeded, {} failed, {} gaps found in {}",
            report.succeeded(),
            report.failed(),
            report.total_gaps(),
            Self::format_duration(start_time.elapsed())
        );

        for (category, count) in report.failures_by_category() {
            warn!("{} file(s) failed with {}", count, category);
        }

        report
    }

    fn log_outcome(outcome: &FileOutcome) {
        let file_name = outcome.file_name();
        match &outcome.result {
            Ok(report) => {
                for note in &report.notes {
                    warn!("{}: {}", file_name, note);
                }
                info!(
                    "{}: found {} gaps with total duration {}",
                    file_name,
                    report.gap_count,
                    format_duration_ms(report.total_gap_ms)
                );
                debug!("{}: decoded as {}", file_name, report.encoding);
                if let Some(path) = &report.marker_track {
                    debug!("Generated gap track: {}", path.display());
                }
                if let Some(path) = &report.summary {
                    debug!("Generated summary: {}", path.display());
                }
            }
            Err(e) => error!("Error processing {}: {}", file_name, e),
        }
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
