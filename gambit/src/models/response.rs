//! # Response envelopes
//!
//! Wire format handed to the transport layer for single and batch analyses:
//!
//! ```json
//! { "success": true, "result": { ... }, "processingTimeMs": 12, "timestamp": "2024-05-01T12:00:00Z" }
//! ```
//!
//! ```json
//! {
//!   "success": true,
//!   "results": [ { ...AnalysisResult }, { "index": 4, "error": { "code": "parse_error", "message": "..." } } ],
//!   "totalProcessed": 10,
//!   "processingTime": 87,
//!   "timestamp": "2024-05-01T12:00:00Z"
//! }
//! ```
//!
//! Field names serialize as camelCase. Failed batch items keep their slot so
//! `results[i]` always belongs to input item `i`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisResult, BatchEntry, BatchResult};
use crate::error::{ErrorCode, GambitError};

/// Structured error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to end users; internal failures use a generic message.
    pub message: String,
}

impl From<&GambitError> for ApiError {
    fn from(err: &GambitError) -> Self {
        let code = err.code();
        let message = match code {
            ErrorCode::InternalError => "Internal error while analyzing content".to_string(),
            _ => err.to_string(),
        };
        Self { code, message }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    pub result: AnalysisResult,
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResponse {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            success: true,
            processing_time_ms: result.processing_time_ms,
            result,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub index: usize,
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success(Box<AnalysisResult>),
    Failure(ErrorEntry),
}

impl From<&BatchEntry> for BatchItem {
    fn from(entry: &BatchEntry) -> Self {
        match &entry.outcome {
            Ok(result) => Self::Success(Box::new(result.clone())),
            Err(err) => Self::Failure(ErrorEntry {
                index: entry.index,
                error: ApiError::from(err),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// True when the batch itself ran; individual items may still have failed.
    pub success: bool,
    pub results: Vec<BatchItem>,
    pub total_processed: usize,
    pub processing_time: u64,
    pub timestamp: DateTime<Utc>,
}

impl From<&BatchResult> for BatchResponse {
    fn from(batch: &BatchResult) -> Self {
        Self {
            success: true,
            results: batch.entries.iter().map(BatchItem::from).collect(),
            total_processed: batch.len(),
            processing_time: batch.processing_time_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Envelope for a request that failed as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}

impl From<&GambitError> for ErrorResponse {
    fn from(err: &GambitError) -> Self {
        let error = ApiError::from(err);
        Self {
            success: false,
            status: error.code.status(),
            error,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    fn empty_result() -> AnalysisResult {
        AnalysisResult {
            analysis_id: "abc".to_string(),
            content_type: ContentType::Article,
            content_digest: "00".to_string(),
            game: None,
            heatmap: None,
            key_moments: None,
            narrative_adaptations: None,
            social_snippets: None,
            processing_time_ms: 4,
        }
    }

    #[test]
    fn test_analysis_response_wire_shape() {
        let response = AnalysisResponse::new(empty_result());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["processingTimeMs"], 4);
        assert!(value["timestamp"].is_string());
        assert_eq!(value["result"]["contentType"], "article");
        assert!(value["result"]["heatmap"].is_null());
    }

    #[test]
    fn test_batch_response_keeps_failed_slots() {
        let batch = BatchResult {
            entries: vec![
                BatchEntry {
                    index: 0,
                    outcome: Ok(empty_result()),
                },
                BatchEntry {
                    index: 1,
                    outcome: Err(GambitError::parse(3, "illegal move 'Ke9'")),
                },
            ],
            processing_time_ms: 9,
        };
        let response = BatchResponse::from(&batch);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["totalProcessed"], 2);
        assert_eq!(value["processingTime"], 9);
        assert_eq!(value["results"][0]["analysisId"], "abc");
        assert_eq!(value["results"][1]["index"], 1);
        assert_eq!(value["results"][1]["error"]["code"], "parse_error");
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let err = GambitError::Internal("join handle panicked at src/x.rs".to_string());
        let api = ApiError::from(&err);
        assert_eq!(api.code, ErrorCode::InternalError);
        assert!(!api.message.contains("src/x.rs"));
    }
}
