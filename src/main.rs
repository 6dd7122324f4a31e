// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use srtgap::app_config::{self, Config};
use srtgap::app_controller::Controller;
use srtgap::report::SummaryFormat;

/// CLI Wrapper for SummaryFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryFormat {
    Plain,
    Markdown,
    Json,
}

impl From<CliSummaryFormat> for SummaryFormat {
    fn from(cli_format: CliSummaryFormat) -> Self {
        match cli_format {
            CliSummaryFormat::Plain => SummaryFormat::Plain,
            CliSummaryFormat::Markdown => SummaryFormat::Markdown,
            CliSummaryFormat::Json => SummaryFormat::Json,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for srtgap
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Subtitle files or directories to scan
    #[arg(value_name = "INPUT_PATH")]
    input_paths: Vec<PathBuf>,

    /// Minimum silence in seconds reported as a gap
    #[arg(short, long, value_name = "SECONDS")]
    min_gap: Option<f64>,

    /// Directory receiving the gaps/ and summaries/ folders
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Text of the marker entries in the gap track
    #[arg(long)]
    marker_text: Option<String>,

    /// Summary format
    #[arg(short, long, value_enum)]
    format: Option<CliSummaryFormat>,

    /// Write statistics only, without per-gap details
    #[arg(long)]
    brief: bool,

    /// Do not write the gap marker track
    #[arg(long)]
    no_marker_track: bool,

    /// Do not write the summary
    #[arg(long)]
    no_summary: bool,

    /// Maximum number of files processed in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// srtgap - find the silences in subtitle tracks
///
/// Scans SRT files for gaps between consecutive subtitles and writes a
/// marker track plus a summary report for each file.
#[derive(Parser, Debug)]
#[command(name = "srtgap")]
#[command(version)]
#[command(about = "Detect gaps between subtitle entries")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "srtgap finds silences between consecutive subtitle entries and reports them.

EXAMPLES:
    srtgap movie.srt                          # Gaps of at least 1 second (default config)
    srtgap -m 2.5 movie.srt                   # Only report gaps of 2.5 seconds or more
    srtgap -o reports/ /subtitles/            # Scan a whole directory
    srtgap -f plain --brief movie.srt         # Short fixed-width summary
    srtgap --no-marker-track -f json *.srt    # JSON summaries only
    srtgap completions bash > srtgap.bash     # Generate bash completions

OUTPUT:
    <output-dir>/gaps/<name>_gaps.srt             one '[Silence]' entry per gap
    <output-dir>/summaries/<name>_summary.<ext>   statistics and gap details

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Command line options override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    detect: DetectArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "srtgap", &mut std::io::stdout());
            Ok(())
        }
        None => run_detect(cli.detect).await,
    }
}

async fn run_detect(options: DetectArgs) -> Result<()> {
    if options.input_paths.is_empty() {
        return Err(anyhow!("At least one INPUT_PATH is required"));
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&level).into());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    log::set_max_level((&config.log_level).into());

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    info!(
        "Scanning for gaps of at least {}s, writing to {}",
        controller.config().min_gap_secs,
        controller.config().output_dir.display()
    );

    let report = controller.run_with_progress(&options.input_paths).await;

    if report.failed() > 0 {
        return Err(anyhow!(
            "{} of {} files failed",
            report.failed(),
            report.outcomes.len()
        ));
    }

    Ok(())
}

// Override config values with CLI options if provided
fn apply_overrides(config: &mut Config, options: &DetectArgs) {
    if let Some(min_gap) = options.min_gap {
        config.min_gap_secs = min_gap;
    }

    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    if let Some(marker_text) = &options.marker_text {
        config.marker_text = marker_text.clone();
    }

    if let Some(format) = &options.format {
        config.summary_format = format.clone().into();
    }

    if let Some(jobs) = options.jobs {
        config.concurrency = jobs;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if options.brief {
        config.detailed_summary = false;
    }

    if options.no_marker_track {
        config.outputs.marker_track = false;
    }

    if options.no_summary {
        config.outputs.summary = false;
    }
}
