use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;

use crate::encoding::{EncodingDetector, TextEncoding, UTF8_BOM};
use crate::errors::GapError;

// @module: Subtitle track loading, validation and serialization

// @const: File extensions accepted as subtitle tracks
pub const ACCEPTED_EXTENSIONS: [&str; 1] = ["srt"];

// @const: Encodings retried, in order, when the detected one does not work out
const FALLBACK_ENCODINGS: [TextEncoding; 2] = [TextEncoding::Windows1252, TextEncoding::Latin1];

// @const: SRT time range line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d+:\d{2}:\d{2}[,.]\d{3})")
        .expect("timestamp pattern is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @validates: Time range and non-empty text
    pub fn validate(&self) -> Result<(), GapError> {
        if self.end_time_ms <= self.start_time_ms {
            return Err(GapError::invalid_input(format!(
                "entry {} has end time {} not after start time {}",
                self.seq_num, self.format_end_time(), self.format_start_time()
            )));
        }

        if self.text.trim().is_empty() {
            return Err(GapError::invalid_input(format!("entry {} has no text", self.seq_num)));
        }

        Ok(())
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm, '.' also accepted) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, GapError> {
        let invalid = || GapError::invalid_input(format!("invalid timestamp: {}", timestamp));

        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut values = [0u64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse().map_err(|_| invalid())?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(invalid)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Entries recovered from SRT text, plus notes about lines that were skipped
#[derive(Debug, Default)]
pub struct ParsedSrt {
    pub entries: Vec<SubtitleEntry>,
    pub notes: Vec<String>,
}

/// Collection of subtitle entries with metadata
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    /// Name of the encoding the source was decoded with
    pub encoding: String,

    /// Non-fatal parse notes (skipped lines), for the caller to log
    pub notes: Vec<String>,
}

impl SubtitleCollection {
    /// Create an empty in-memory collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            encoding: TextEncoding::Utf8.name().into_owned(),
            notes: Vec::new(),
        }
    }

    /// Load, decode, parse and validate a subtitle track.
    ///
    /// The detected encoding is tried first, then the fallback chain. The first
    /// encoding that both decodes and parses wins; if none does, the error of the
    /// first attempt is returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GapError> {
        let path = path.as_ref();
        Self::check_source_path(path)?;

        let raw = fs::read(path).map_err(|e| {
            GapError::IoFailure(format!("failed to read {}: {}", path.display(), e))
        })?;

        let guess = EncodingDetector::detect(&raw);
        let mut first_error: Option<GapError> = None;

        for encoding in Self::decode_candidates(guess.encoding) {
            let attempt = encoding
                .decode(&raw)
                .and_then(|content| Self::parse_srt_string(&content));

            match attempt {
                Ok(parsed) => {
                    Self::validate_entries(&parsed.entries)?;
                    return Ok(SubtitleCollection {
                        source_file: path.to_path_buf(),
                        entries: parsed.entries,
                        encoding: encoding.name().into_owned(),
                        notes: parsed.notes,
                    });
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| {
            GapError::invalid_input(format!("could not decode {}", path.display()))
        }))
    }

    // @checks: Existence, file type and extension
    fn check_source_path(path: &Path) -> Result<(), GapError> {
        if !path.is_file() {
            return Err(GapError::invalid_input(format!(
                "subtitle file does not exist: {}", path.display()
            )));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(GapError::invalid_input(format!(
                "unsupported file extension '{}' for {} (expected one of: {})",
                extension, path.display(), ACCEPTED_EXTENSIONS.join(", ")
            )));
        }

        Ok(())
    }

    // @returns: Detected encoding followed by the unique fallbacks
    fn decode_candidates(detected: TextEncoding) -> Vec<TextEncoding> {
        let mut candidates = vec![detected];
        for fallback in FALLBACK_ENCODINGS {
            if !candidates.contains(&fallback) {
                candidates.push(fallback);
            }
        }
        candidates
    }

    /// Structural validation: non-empty track, every entry timed and with text
    pub fn validate_entries(entries: &[SubtitleEntry]) -> Result<(), GapError> {
        if entries.is_empty() {
            return Err(GapError::invalid_input("subtitle track contains no entries"));
        }
        entries.iter().try_for_each(SubtitleEntry::validate)
    }

    /// Parse SRT format string into subtitle entries.
    ///
    /// Blocks are runs of non-blank lines. A block whose first line is an index
    /// and second a time range becomes an entry; anything else is skipped and
    /// noted. A block with a malformed time range is an error.
    pub fn parse_srt_string(content: &str) -> Result<ParsedSrt, GapError> {
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
        let mut parsed = ParsedSrt::default();

        for (first_line, block) in Self::split_blocks(content) {
            let seq_num = block[0].parse::<usize>().ok();
            let timing = block.get(1).map(|line| line.trim());

            match (seq_num, timing) {
                (Some(seq_num), Some(timing)) if timing.contains("-->") => {
                    let (start_ms, end_ms) = Self::parse_time_range(timing).ok_or_else(|| {
                        GapError::invalid_input(format!(
                            "malformed time range at line {}: {}", first_line + 1, timing
                        ))
                    })??;

                    parsed.entries.push(SubtitleEntry::new(
                        seq_num,
                        start_ms,
                        end_ms,
                        block[2..].join("\n"),
                    ));
                }
                _ => parsed.notes.push(format!(
                    "skipped unrecognized block at line {}: {}", first_line + 1, block[0]
                )),
            }
        }

        if parsed.entries.is_empty() {
            return Err(GapError::invalid_input("no subtitle entries found"));
        }

        Ok(parsed)
    }

    // @returns: (zero-based line of the block start, trimmed lines) per block
    fn split_blocks(content: &str) -> Vec<(usize, Vec<&str>)> {
        let mut blocks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_start = 0;

        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if !current.is_empty() {
                    blocks.push((current_start, std::mem::take(&mut current)));
                }
                continue;
            }
            if current.is_empty() {
                current_start = line_no;
            }
            current.push(trimmed);
        }

        if !current.is_empty() {
            blocks.push((current_start, current));
        }

        blocks
    }

    // @returns: None if the line is not a time range, Some(Err) if the times are invalid
    fn parse_time_range(line: &str) -> Option<Result<(u64, u64), GapError>> {
        let caps = TIMESTAMP_REGEX.captures(line)?;
        let parse = |idx: usize| SubtitleEntry::parse_timestamp(&caps[idx]);
        Some(parse(1).and_then(|start| parse(2).map(|end| (start, end))))
    }

    /// Render the collection in SRT format
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file, optionally prefixed with a UTF-8 BOM
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P, with_bom: bool) -> Result<(), GapError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GapError::IoFailure(format!("failed to create directory {}: {}", parent.display(), e))
            })?;
        }

        let mut bytes = Vec::new();
        if with_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(self.to_srt_string().as_bytes());

        fs::write(path, bytes).map_err(|e| {
            GapError::IoFailure(format!("failed to write subtitle file {}: {}", path.display(), e))
        })
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Encoding: {}", self.encoding)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
