/*!
 * Tests for subtitle loading and parsing
 */

use anyhow::Result;
use srtgap::errors::GapError;
use srtgap::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test timestamp parsing rejects out-of-range components
#[test]
fn test_timestamp_parsing_withInvalidComponents_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("00:60:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:00:61,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:00:01").is_err());
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    assert_eq!(entry.to_string(), "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

/// Test parsing SRT string content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let parsed = SubtitleCollection::parse_srt_string(srt_content)?;
    let entries = parsed.entries;

    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "Hello world");

    assert_eq!(entries[1].seq_num, 2);
    assert_eq!(entries[1].start_time_ms, 5000);
    assert_eq!(entries[1].end_time_ms, 8000);
    assert_eq!(entries[1].text, "Test subtitle\nSecond line");

    Ok(())
}

/// Source order is kept by the loader; sorting is the detector's job
#[test]
fn test_parse_srt_string_withOutOfOrderBlocks_shouldKeepSourceOrder() -> Result<()> {
    let srt_content = "2\n00:00:05,000 --> 00:00:06,000\nLater\n\n1\n00:00:01,000 --> 00:00:02,000\nEarlier\n";
    let parsed = SubtitleCollection::parse_srt_string(srt_content)?;

    assert_eq!(parsed.entries[0].text, "Later");
    assert_eq!(parsed.entries[1].text, "Earlier");
    Ok(())
}

/// Test loading a valid UTF-8 file
#[test]
fn test_load_withUtf8File_shouldReturnEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie.srt", common::FRENCH_SRT)?;

    let collection = SubtitleCollection::load(&path)?;

    assert_eq!(collection.entries.len(), 4);
    assert_eq!(collection.encoding, "utf-8");
    assert_eq!(collection.source_file, path);
    assert_eq!(collection.entries[0].text, "Où est passé le garçon ?");
    Ok(())
}

/// Upper-case extensions are accepted
#[test]
fn test_load_withUppercaseExtension_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "MOVIE.SRT", common::TWO_ENTRY_SRT)?;

    assert_eq!(SubtitleCollection::load(&path)?.entries.len(), 2);
    Ok(())
}

/// Test loading a Windows-1252 file through the fallback chain
#[test]
fn test_load_withWindows1252File_shouldDecodeAccents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_windows_1252_subtitle(temp_dir.path(), "legacy.srt")?;

    let collection = SubtitleCollection::load(&path)?;

    assert_eq!(collection.entries.len(), 4);
    assert_ne!(collection.encoding, "utf-8");
    assert!(collection.entries.iter().all(|e| !e.text.contains('\u{FFFD}')));
    Ok(())
}

/// A missing file is invalid input
#[test]
fn test_load_withMissingFile_shouldFailWithInvalidInput() {
    let result = SubtitleCollection::load("does/not/exist.srt");
    assert!(matches!(result, Err(GapError::InvalidInput(_))));
}

/// An unsupported extension is rejected before reading
#[test]
fn test_load_withWrongExtension_shouldFailWithInvalidInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie.txt", common::TWO_ENTRY_SRT)?;

    let error = SubtitleCollection::load(&path).unwrap_err();
    assert!(matches!(error, GapError::InvalidInput(_)));
    assert!(error.to_string().contains("unsupported file extension"));
    Ok(())
}

/// An empty track fails with InvalidInput, not a generic error
#[test]
fn test_load_withEmptyFile_shouldFailWithInvalidInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    assert!(matches!(SubtitleCollection::load(&path), Err(GapError::InvalidInput(_))));
    Ok(())
}

/// An entry without text fails structural validation
#[test]
fn test_load_withEntryMissingText_shouldFailWithInvalidInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:01,000 --> 00:00:02,000\nText\n\n2\n00:00:03,000 --> 00:00:04,000\n\n";
    let path = common::create_test_file(temp_dir.path(), "missing.srt", content)?;

    let error = SubtitleCollection::load(&path).unwrap_err();
    assert!(error.to_string().contains("entry 2 has no text"));
    Ok(())
}

/// Writing with a BOM and loading again gives the same entries
#[test]
fn test_write_to_srt_withBom_shouldReloadIdentically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "source.srt", common::FRENCH_SRT)?;
    let original = SubtitleCollection::load(&source)?;

    let copy_path = temp_dir.path().join("nested").join("copy.srt");
    original.write_to_srt(&copy_path, true)?;

    let bytes = std::fs::read(&copy_path)?;
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));

    let reloaded = SubtitleCollection::load(&copy_path)?;
    assert_eq!(reloaded.encoding, "utf-8-sig");
    assert_eq!(reloaded.entries, original.entries);
    Ok(())
}
