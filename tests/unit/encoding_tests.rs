/*!
 * Tests for encoding detection
 */

use srtgap::encoding::{EncodingDetector, TextEncoding, UTF8_BOM};
use crate::common;

/// A BOM-prefixed UTF-8 file is recognised with full confidence
#[test]
fn test_detect_withUtf8Bom_shouldReturnUtf8SigWithFullConfidence() {
    let mut raw = UTF8_BOM.to_vec();
    raw.extend_from_slice(common::FRENCH_SRT.as_bytes());

    let guess = EncodingDetector::detect(&raw);

    assert_eq!(guess.encoding, TextEncoding::Utf8Bom);
    assert_eq!(guess.encoding.name(), "utf-8-sig");
    assert_eq!(guess.confidence, 1.0);
}

/// Plain UTF-8 content decodes back to the original text
#[test]
fn test_detect_withUtf8Accents_shouldDecodeToOriginal() {
    let guess = EncodingDetector::detect(common::FRENCH_SRT.as_bytes());

    assert_eq!(guess.encoding, TextEncoding::Utf8);
    assert_eq!(guess.encoding.decode(common::FRENCH_SRT.as_bytes()).unwrap(), common::FRENCH_SRT);
}

/// Windows-1252 bytes are never mistaken for UTF-8 and decode to the accented text
#[test]
fn test_detect_withWindows1252Bytes_shouldPickLegacyEncoding() {
    let (raw, _, _) = encoding_rs::WINDOWS_1252.encode(common::FRENCH_SRT);

    let guess = EncodingDetector::detect(&raw);
    let decoded = guess.encoding.decode(&raw).unwrap();

    assert_ne!(guess.encoding, TextEncoding::Utf8);
    assert!(decoded.contains("00:00:09,250 --> 00:00:11,000"));
    assert!(guess.confidence > 0.0 && guess.confidence <= 1.0);
}

/// Detection always returns something usable, even for empty input
#[test]
fn test_detect_withEmptyInput_shouldStillReturnGuess() {
    let guess = EncodingDetector::detect(&[]);
    assert!(guess.encoding.decode(&[]).is_ok());
}
