use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GambitError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error at ply {ply}: {reason}")]
    Parse { ply: usize, reason: String },

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Item timed out after {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    #[error("Batch of {actual} items exceeds the limit of {limit}")]
    Capacity { limit: usize, actual: usize },

    #[error("Cancelled before processing started")]
    Cancelled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GambitError {
    pub fn parse(ply: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            ply,
            reason: reason.into(),
        }
    }

    /// Machine-readable classification used on the wire.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::Json(_) => ErrorCode::ValidationError,
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::Classification(_) => ErrorCode::ClassificationError,
            Self::Evaluation(_) => ErrorCode::EvaluationError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Capacity { .. } => ErrorCode::CapacityExceeded,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Io(_) | Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the caller can fix the failure by changing the request.
    pub fn is_caller_fixable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::ValidationError | ErrorCode::ParseError | ErrorCode::CapacityExceeded
        )
    }
}

/// Machine-readable error code included in every error entry.
///
/// Serialized as a snake_case string (e.g. `"parse_error"`). Each variant maps
/// to the status the transport layer reports via [`ErrorCode::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Bad input shape, size or type. HTTP 400.
    ValidationError,
    /// Malformed move notation; the message names the offending ply. HTTP 400.
    ParseError,
    /// Internal invariant violation such as a NaN evaluation. HTTP 500.
    ClassificationError,
    /// The evaluation oracle failed. HTTP 502.
    EvaluationError,
    /// The per-item time limit elapsed. HTTP 504.
    Timeout,
    /// The batch is larger than the configured cap. HTTP 413.
    CapacityExceeded,
    /// The batch was cancelled before the item started. HTTP 499.
    Cancelled,
    /// Anything else. Details are not leaked. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> u16 {
        match self {
            Self::ValidationError | Self::ParseError => 400,
            Self::ClassificationError | Self::InternalError => 500,
            Self::EvaluationError => 502,
            Self::Timeout => 504,
            Self::CapacityExceeded => 413,
            Self::Cancelled => 499,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError => write!(f, "validation_error"),
            Self::ParseError => write!(f, "parse_error"),
            Self::ClassificationError => write!(f, "classification_error"),
            Self::EvaluationError => write!(f, "evaluation_error"),
            Self::Timeout => write!(f, "timeout"),
            Self::CapacityExceeded => write!(f, "capacity_exceeded"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

pub type Result<T> = std::result::Result<T, GambitError>;
