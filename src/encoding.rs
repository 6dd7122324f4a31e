/*!
 * Text encoding detection for subtitle files.
 *
 * Subtitle files in the wild come in UTF-8 (with or without BOM) and in a
 * variety of legacy single-byte encodings. Detection tries, in order:
 * - an explicit UTF-8 byte-order mark
 * - the statistical guess from `chardetng`, when it is confident enough
 * - a fixed probe list of common encodings
 * - Windows-1252, which accepts any byte sequence
 */

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::errors::GapError;

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Minimum confidence for the statistical guess to be taken as-is
pub const MIN_STATISTICAL_CONFIDENCE: f32 = 0.8;

/// Encodings probed when the statistical guess is not trusted
const PROBE_ORDER: [TextEncoding; 4] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Bom,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

/// A text encoding the loader knows how to decode strictly
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    /// UTF-8 without BOM handling
    Utf8,
    /// UTF-8, leading byte-order mark stripped if present
    Utf8Bom,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// Windows-1252 (WHATWG mapping)
    Windows1252,
    /// Any other encoding proposed by the statistical detector
    Detected(&'static Encoding),
}

impl TextEncoding {
    /// Normalize an `encoding_rs` encoding into a known variant where possible
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        if encoding == UTF_8 {
            Self::Utf8
        } else if encoding == WINDOWS_1252 {
            Self::Windows1252
        } else {
            Self::Detected(encoding)
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::Utf8 => Cow::Borrowed("utf-8"),
            Self::Utf8Bom => Cow::Borrowed("utf-8-sig"),
            Self::Latin1 => Cow::Borrowed("iso-8859-1"),
            Self::Windows1252 => Cow::Borrowed("windows-1252"),
            Self::Detected(encoding) => Cow::Owned(encoding.name().to_lowercase()),
        }
    }

    /// Decode bytes without substituting replacement characters
    pub fn decode(&self, raw: &[u8]) -> Result<String, GapError> {
        let decoded = match self {
            Self::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(raw),
            Self::Utf8Bom => {
                let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(raw)),
            Self::Windows1252 => WINDOWS_1252.decode_without_bom_handling_and_without_replacement(raw),
            Self::Detected(encoding) => encoding.decode_without_bom_handling_and_without_replacement(raw),
        };

        decoded.map(Cow::into_owned).ok_or_else(|| {
            GapError::invalid_input(format!("bytes are not valid {}", self.name()))
        })
    }
}

/// Result of encoding detection
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingGuess {
    /// Most likely encoding
    pub encoding: TextEncoding,

    /// Certainty of the guess in [0, 1]
    pub confidence: f32,
}

impl EncodingGuess {
    fn new(encoding: TextEncoding, confidence: f32) -> Self {
        Self { encoding, confidence }
    }
}

/// Encoding detector for raw subtitle bytes
pub struct EncodingDetector;

impl EncodingDetector {
    /// Determine the most likely encoding of `raw`. Never fails.
    pub fn detect(raw: &[u8]) -> EncodingGuess {
        if raw.starts_with(UTF8_BOM) && TextEncoding::Utf8Bom.decode(raw).is_ok() {
            return EncodingGuess::new(TextEncoding::Utf8Bom, 1.0);
        }

        let statistical = Self::statistical_guess(raw);
        if statistical.confidence >= MIN_STATISTICAL_CONFIDENCE {
            return statistical;
        }

        PROBE_ORDER
            .iter()
            .find(|encoding| encoding.decode(raw).is_ok())
            .map(|encoding| EncodingGuess::new(*encoding, 1.0))
            .unwrap_or_else(|| EncodingGuess::new(TextEncoding::Windows1252, 0.5))
    }

    /// Guess with chardetng and score the guess against the input
    fn statistical_guess(raw: &[u8]) -> EncodingGuess {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(raw, true);
        let encoding = TextEncoding::from_encoding(detector.guess(None, true));

        let confidence = if encoding.decode(raw).is_err() {
            0.0
        } else if raw.is_ascii() {
            // No non-ASCII byte means there was nothing to learn from
            0.5
        } else if encoding == TextEncoding::Utf8 {
            0.99
        } else if TextEncoding::Utf8.decode(raw).is_ok() {
            // Non-ASCII input that is valid UTF-8 contradicts a legacy guess
            0.5
        } else {
            0.85
        };

        EncodingGuess::new(encoding, confidence)
    }
}
