/*!
 * Error types for the srtgap application.
 *
 * Every failure of the gap pipeline falls into one of three categories,
 * defined here with the thiserror crate. Shell code (CLI, config loading)
 * wraps these in `anyhow` where it needs extra context.
 */

use thiserror::Error;

/// Errors raised while loading, analysing or reporting on a subtitle track
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GapError {
    /// Bad path, unsupported extension, undecodable bytes or a structurally invalid track
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unable to read the source file or write an output artifact
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// Invalid configuration supplied by the caller
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GapError {
    /// Short label used when failures are aggregated per category
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid input",
            Self::IoFailure(_) => "i/o failure",
            Self::Configuration(_) => "configuration",
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

impl From<std::io::Error> for GapError {
    fn from(error: std::io::Error) -> Self {
        Self::IoFailure(error.to_string())
    }
}
