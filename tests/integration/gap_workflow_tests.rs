/*!
 * End-to-end tests: load a track, detect gaps, build reports
 */

use anyhow::Result;
use srtgap::app_config::Config;
use srtgap::gap_detector::GapDetector;
use srtgap::report::{ReportBuilder, SummaryFormat};
use srtgap::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// A three second silence is reported at a one second threshold
#[test]
fn test_workflow_withTwoEntryTrack_shouldReportOneGap() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "two.srt", common::TWO_ENTRY_SRT)?;

    let track = SubtitleCollection::load(&path)?;
    let (gaps, stats) = GapDetector::from_secs(1.0)?.detect(&track.entries);

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].duration_ms, 3000);
    assert_eq!(gaps[0].previous_text, "First line");
    assert_eq!(gaps[0].next_text, "Second line");
    assert_eq!(stats.total_duration_ms, 3000);
    Ok(())
}

/// Raising the threshold above the silence reports nothing
#[test]
fn test_workflow_withHighThreshold_shouldReportNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "two.srt", common::TWO_ENTRY_SRT)?;

    let track = SubtitleCollection::load(&path)?;
    let (gaps, stats) = GapDetector::from_secs(5.0)?.detect(&track.entries);

    assert!(gaps.is_empty());
    assert_eq!(stats.total_gaps, 0);
    Ok(())
}

/// Overlapping entries loaded from disk never produce a gap
#[test]
fn test_workflow_withOverlappingEntries_shouldReportNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:01,000 --> 00:00:03,000\nA\n\n2\n00:00:02,000 --> 00:00:04,000\nB\n";
    let path = common::create_test_file(temp_dir.path(), "overlap.srt", content)?;

    let track = SubtitleCollection::load(&path)?;
    let (gaps, _) = GapDetector::from_secs(0.001)?.detect(&track.entries);

    assert!(gaps.is_empty());
    Ok(())
}

/// The same track in Windows-1252 and UTF-8 yields the same gaps
#[test]
fn test_workflow_withLegacyEncoding_shouldMatchUtf8Result() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let utf8_path = common::create_test_file(temp_dir.path(), "utf8.srt", common::FRENCH_SRT)?;
    let legacy_path = common::create_windows_1252_subtitle(temp_dir.path(), "legacy.srt")?;

    let utf8 = SubtitleCollection::load(&utf8_path)?;
    let legacy = SubtitleCollection::load(&legacy_path)?;
    let detector = GapDetector::from_secs(1.0)?;

    assert_eq!(utf8.encoding, "utf-8");
    assert_ne!(legacy.encoding, "utf-8");
    assert!(legacy.entries.iter().all(|e| !e.text.contains('\u{FFFD}')));

    let (utf8_gaps, utf8_stats) = detector.detect(&utf8.entries);
    let (legacy_gaps, legacy_stats) = detector.detect(&legacy.entries);

    let bounds = |gaps: &[srtgap::Gap]| -> Vec<(u64, u64)> {
        gaps.iter().map(|g| (g.start_time_ms, g.end_time_ms)).collect()
    };
    assert_eq!(bounds(&utf8_gaps), vec![(6000, 9250), (11_000, 15_000)]);
    assert_eq!(bounds(&legacy_gaps), bounds(&utf8_gaps));
    assert_eq!(legacy_gaps, utf8_gaps);
    assert_eq!(legacy_gaps[0].next_text, "Déjà parti... à Noël, évidemment.");
    assert_eq!(legacy_stats, utf8_stats);
    Ok(())
}

/// An empty file is rejected as invalid input
#[test]
fn test_workflow_withEmptyFile_shouldFailWithInvalidInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    let result = SubtitleCollection::load(&path);

    assert!(matches!(result, Err(srtgap::GapError::InvalidInput(_))));
    Ok(())
}

/// A written marker track reloads with the same timings
#[test]
fn test_marker_track_withReload_shouldKeepTimings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "french.srt", common::FRENCH_SRT)?;

    let track = SubtitleCollection::load(&path)?;
    let (gaps, _) = GapDetector::from_secs(1.0)?.detect(&track.entries);
    let marker_track = ReportBuilder::default().build_marker_track(&gaps);

    let out = temp_dir.path().join("out").join("french_gaps.srt");
    marker_track.write_to_srt(&out, true)?;
    assert!(std::fs::read(&out)?.starts_with(&[0xEF, 0xBB, 0xBF]));

    let reloaded = SubtitleCollection::load(&out)?;
    assert_eq!(reloaded.encoding, "utf-8-sig");
    assert_eq!(reloaded.entries.len(), gaps.len());
    for (entry, gap) in reloaded.entries.iter().zip(&gaps) {
        assert_eq!(entry.start_time_ms, gap.start_time_ms);
        assert_eq!(entry.end_time_ms, gap.end_time_ms);
        assert_eq!(entry.text, "[Silence]");
    }
    Ok(())
}

/// Unsorted input is analysed in start-time order
#[test]
fn test_workflow_withUnsortedTrack_shouldSortBeforeDetecting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "2\n00:00:05,000 --> 00:00:06,000\nLater\n\n1\n00:00:01,000 --> 00:00:02,000\nEarlier\n";
    let path = common::create_test_file(temp_dir.path(), "unsorted.srt", content)?;

    let track = SubtitleCollection::load(&path)?;
    assert_eq!(track.entries[0].text, "Later");

    let (gaps, _) = GapDetector::from_secs(1.0)?.detect(&track.entries);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].previous_text, "Earlier");
    assert_eq!(SubtitleEntry::format_timestamp(gaps[0].start_time_ms), "00:00:02,000");
    Ok(())
}

/// Config-driven reports use the configured marker text and format
#[test]
fn test_workflow_withConfiguredBuilder_shouldUseMarkerText() -> Result<()> {
    let config = Config { marker_text: "[pause]".to_string(), ..Config::default() };
    let entries = vec![
        SubtitleEntry::new(1, 0, 1000, "a".to_string()),
        SubtitleEntry::new(2, 2500, 3000, "b".to_string()),
    ];

    let (gaps, stats) = config.gap_detector()?.detect(&entries);
    let builder = config.report_builder();

    assert_eq!(builder.build_marker_track(&gaps).entries[0].text, "[pause]");
    let summary = builder.build_summary(&stats, SummaryFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&summary)?;
    assert_eq!(value["statistics"]["total_duration_ms"], 1500);
    Ok(())
}

/// A valid multi-line marker survives the write and reload
#[test]
fn test_marker_track_withMultiLineMarker_shouldReloadSameEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config { marker_text: "[Silence]\n(music)".to_string(), ..Config::default() };
    config.validate()?;
    let entries = vec![
        SubtitleEntry::new(1, 0, 1000, "a".to_string()),
        SubtitleEntry::new(2, 3000, 4000, "b".to_string()),
        SubtitleEntry::new(3, 6000, 7000, "c".to_string()),
    ];

    let (gaps, _) = config.gap_detector()?.detect(&entries);
    let out = temp_dir.path().join("multi_gaps.srt");
    config.report_builder().build_marker_track(&gaps).write_to_srt(&out, true)?;

    let reloaded = SubtitleCollection::load(&out)?;
    assert_eq!(reloaded.entries.len(), 2);
    assert!(reloaded.entries.iter().all(|e| e.text == "[Silence]\n(music)"));
    Ok(())
}
