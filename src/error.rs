// ⛔ Error taxonomy - the only conditions that abort a whole batch
//
// Everything else (bad cell values, business-rule violations, unmatched
// records) degrades to a per-record issue or verdict.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// None of the configured encodings could decode the input.
    #[error("unable to decode input with any supported encoding (tried: {})", tried.join(", "))]
    UnreadableInput { tried: Vec<String> },

    /// Required columns absent after header resolution.
    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Structurally broken tabular data.
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    /// Target batch acquisition (scrape or API fetch) failed upstream.
    #[error("target batch unavailable: {0}")]
    TargetUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    /// Writing an exported report failed.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    /// True for the three conditions raised by the loader itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ReconError::UnreadableInput { .. }
                | ReconError::MissingColumns { .. }
                | ReconError::MalformedInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
