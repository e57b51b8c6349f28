//! Aggregation error types
//!
//! Error codes:
//! - BOOKDB_PIPELINE_INVALID (REJECT)

use std::fmt;

/// Severity levels for aggregation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Aggregation-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateErrorCode {
    /// Malformed pipeline or stage
    PipelineInvalid,
}

impl AggregateErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            AggregateErrorCode::PipelineInvalid => "BOOKDB_PIPELINE_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for AggregateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Aggregation error with the offending stage position
#[derive(Debug, Clone)]
pub struct AggregateError {
    code: AggregateErrorCode,
    message: String,
    stage: Option<usize>,
}

impl AggregateError {
    /// Create a pipeline invalid error for the stage at `stage`
    pub fn invalid_stage(stage: usize, reason: impl Into<String>) -> Self {
        Self {
            code: AggregateErrorCode::PipelineInvalid,
            message: format!("Stage {}: {}", stage, reason.into()),
            stage: Some(stage),
        }
    }

    /// Create a pipeline invalid error not tied to a stage
    pub fn pipeline_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: AggregateErrorCode::PipelineInvalid,
            message: reason.into(),
            stage: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> AggregateErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the zero-based stage position if applicable
    pub fn stage(&self) -> Option<usize> {
        self.stage
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for AggregateError {}

/// Result type for aggregation operations
pub type AggregateResult<T> = Result<T, AggregateError>;
