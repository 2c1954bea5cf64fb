//! Request/response DTOs for the depot Web API.
//!
//! Field names mirror the JSON the browser client expects (camelCase
//! where the wire format has it).

use serde::{Deserialize, Serialize};

/// One entry of the POST /upload response array.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedFileResponse {
    /// Status message.
    pub message: String,
    /// Stored name the file was persisted under.
    pub filename: String,
    /// Repaired client-supplied display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Query parameters for GET /file-info.
#[derive(Debug, Deserialize)]
pub struct FileInfoQuery {
    /// Stored name to stat.
    pub name: String,
}

/// GET /file-info response.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileInfoResponse {
    /// Size in bytes.
    pub size: u64,
    /// Modification time as Unix milliseconds.
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
}

/// Simple message response (single delete, full-success batch delete).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

/// 207 partial-success response for DELETE /delete-selected.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    /// Status message.
    pub message: String,
    /// Number of files actually removed.
    #[serde(rename = "deletedCount")]
    pub deleted_count: usize,
    /// Number of per-item failures.
    #[serde(rename = "errorCount")]
    pub error_count: usize,
    /// Per-item failures, in input order.
    pub errors: Vec<BatchDeleteError>,
}

/// One failed entry of a batch delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchDeleteError {
    /// The stored name that could not be deleted.
    pub file: String,
    /// Failure reason.
    pub error: String,
}
