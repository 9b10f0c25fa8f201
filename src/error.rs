//! Error types for descramble

use thiserror::Error;

/// Main error type for descramble operations
#[derive(Debug, Error)]
pub enum DescrambleError {
    /// The snippet did not match the supported grammar. Almost always means
    /// the platform changed its obfuscation shape and the recognizer needs
    /// updating; not retryable without a code change.
    #[error("extraction failed at {stage}: {detail}")]
    Extraction { stage: &'static str, detail: String },

    /// Evaluation exceeded its safety ceiling or hit an unsupported runtime
    /// value. Treated as a bug signal, not a transient condition.
    #[error("interpreter fault: {0}")]
    InterpreterFault(String),

    /// Malformed URL or token handed to a facade.
    #[error("invalid caller input: {0}")]
    CallerInput(String),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl DescrambleError {
    pub(crate) fn extraction(stage: &'static str, detail: impl Into<String>) -> Self {
        DescrambleError::Extraction {
            stage,
            detail: detail.into(),
        }
    }

    /// Check if the error signals a platform-side format change
    pub fn is_format_change(&self) -> bool {
        matches!(self, DescrambleError::Extraction { .. })
    }

    /// Check if the error is attributable to the caller
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            DescrambleError::CallerInput(_) | DescrambleError::Url(_)
        )
    }
}
