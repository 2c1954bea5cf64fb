//! File endpoints for the depot Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::store::{write_zip, IncomingFile};
use crate::web::dto::{
    BatchDeleteError, BatchDeleteResponse, FileInfoQuery, FileInfoResponse, MessageResponse,
    UploadedFileResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are stripped (header injection), quotes and
/// backslashes escaped, and non-ASCII names carried in an RFC 5987
/// `filename*` parameter.
fn attachment_disposition(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Content type for inline viewing, derived from the stored name's
/// extension. Only the formats the browser client previews get a real
/// type; everything else is served opaque.
fn view_content_type(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("txt") => "text/plain",
        Some("html") => "text/html",
        _ => "application/octet-stream",
    }
}

/// Extract the `files` array from a batch-selection body.
///
/// A body without a `files` array (or with non-string entries) is a 400,
/// never a framework rejection.
fn parse_file_selection(body: &serde_json::Value) -> Result<Vec<String>, ApiError> {
    let files = body
        .get("files")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ApiError::bad_request("Invalid request format"))?;

    files
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| ApiError::bad_request("Invalid request format"))
        })
        .collect()
}

/// POST /upload - Store a multipart batch of files.
///
/// Request body: multipart/form-data with 0..N `files` fields. An empty
/// batch is a 400.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadedFileResponse>>, ApiError> {
    let mut incoming = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("files") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })?;

        incoming.push(IncomingFile {
            original_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if incoming.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }

    let count = incoming.len();
    let saved = state.store.save(incoming).map_err(|e| {
        tracing::error!("Failed to save upload batch: {}", e);
        ApiError::from(e)
    })?;
    tracing::info!(count, "stored upload batch");

    let response = saved
        .into_iter()
        .map(|f| UploadedFileResponse {
            message: "File uploaded".to_string(),
            filename: f.stored_name,
            display_name: f.display_name,
        })
        .collect();

    Ok(Json(response))
}

/// GET /files - List all stored names.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = state.store.list().map_err(|e| {
        tracing::error!("Failed to list files: {}", e);
        ApiError::internal("Failed to list files")
    })?;
    Ok(Json(names))
}

/// GET /file-info?name= - Size and mtime of a stored file.
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileInfoQuery>,
) -> Result<Json<FileInfoResponse>, ApiError> {
    let info = state.store.info(&query.name)?;
    Ok(Json(FileInfoResponse {
        size: info.size,
        last_modified: info.modified_ms,
    }))
}

/// GET /download/:filename - Download a stored file as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.store.open(&filename)?;
    let size = file.metadata().map_err(|e| {
        tracing::error!("Failed to stat file: {}", e);
        ApiError::internal("Failed to read file")
    })?.len();

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, attachment_disposition(&filename))
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// GET /view/:filename - Serve a stored file inline for browser preview.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.store.open(&filename)?;

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let response = Response::builder()
        .header(header::CONTENT_TYPE, view_content_type(&filename))
        .header(header::CONTENT_DISPOSITION, "inline")
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// DELETE /delete/:filename - Delete one stored file.
///
/// A missing file is a 404, not a 500; a name with path segments is a 400.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete(&filename)?;
    tracing::info!(filename = %filename, "deleted file");
    Ok(Json(MessageResponse {
        message: "File deleted".to_string(),
    }))
}

/// DELETE /delete-selected - Best-effort batch delete.
///
/// Every requested name is attempted; 200 when all succeeded, 207 with a
/// per-item error report otherwise.
pub async fn delete_selected(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let files = parse_file_selection(&body)?;
    let outcome = state.store.delete_batch(&files);
    tracing::info!(
        deleted = outcome.deleted,
        failed = outcome.failures.len(),
        "batch delete finished"
    );

    if outcome.failures.is_empty() {
        let body = MessageResponse {
            message: format!("{} files deleted successfully", outcome.deleted),
        };
        return Ok(Json(body).into_response());
    }

    let body = BatchDeleteResponse {
        message: "Some files couldn't be deleted".to_string(),
        deleted_count: outcome.deleted,
        error_count: outcome.failures.len(),
        errors: outcome
            .failures
            .into_iter()
            .map(|f| BatchDeleteError {
                file: f.name,
                error: f.reason,
            })
            .collect(),
    };
    Ok((StatusCode::MULTI_STATUS, Json(body)).into_response())
}

/// POST /download-selected - Stream a zip bundle of the selected files.
///
/// The archive is assembled on a blocking task into an unnamed temp file
/// and streamed from there, so memory stays bounded regardless of how
/// many files are selected. Missing names are skipped silently.
pub async fn download_selected(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let files = parse_file_selection(&body)?;

    let store = state.store.clone();
    let spool = tokio::task::spawn_blocking(move || -> crate::Result<std::fs::File> {
        use std::io::Seek;

        let mut spool = tempfile::tempfile()?;
        write_zip(&store, &files, &mut spool)?;
        spool.rewind()?;
        Ok(spool)
    })
    .await
    .map_err(|e| {
        tracing::error!("Zip task panicked: {}", e);
        ApiError::internal("Failed to build archive")
    })?
    .map_err(|e| {
        tracing::error!("Failed to build archive: {}", e);
        ApiError::internal("Failed to build archive")
    })?;

    let size = spool.metadata().map_err(|e| {
        tracing::error!("Failed to stat archive spool: {}", e);
        ApiError::internal("Failed to build archive")
    })?.len();

    let stream = ReaderStream::new(tokio::fs::File::from_std(spool));
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition("downloads.zip"),
        )
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attachment_disposition_simple_ascii() {
        let result = attachment_disposition("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_attachment_disposition_non_ascii() {
        let result = attachment_disposition("ödeme.pdf");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_attachment_disposition_header_injection() {
        let result = attachment_disposition("x\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_attachment_disposition_quotes() {
        let result = attachment_disposition("te\"st.txt");
        assert!(result.contains("filename=\"te_st.txt\""));
    }

    #[test]
    fn test_view_content_type_known_extensions() {
        assert_eq!(view_content_type("a.pdf"), "application/pdf");
        assert_eq!(view_content_type("a.jpg"), "image/jpeg");
        assert_eq!(view_content_type("a.JPEG"), "image/jpeg");
        assert_eq!(view_content_type("a.png"), "image/png");
        assert_eq!(view_content_type("a.gif"), "image/gif");
        assert_eq!(view_content_type("a.mp4"), "video/mp4");
        assert_eq!(view_content_type("a.webm"), "video/webm");
        assert_eq!(view_content_type("a.mp3"), "audio/mpeg");
        assert_eq!(view_content_type("a.txt"), "text/plain");
        assert_eq!(view_content_type("a.html"), "text/html");
    }

    #[test]
    fn test_view_content_type_unknown_extension() {
        assert_eq!(view_content_type("a.xyz"), "application/octet-stream");
        assert_eq!(view_content_type("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_parse_file_selection_valid() {
        let body = json!({ "files": ["a.txt", "b.txt"] });
        let files = parse_file_selection(&body).unwrap();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_parse_file_selection_empty_array() {
        let body = json!({ "files": [] });
        assert!(parse_file_selection(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_file_selection_not_an_array() {
        assert!(parse_file_selection(&json!({ "files": "a.txt" })).is_err());
        assert!(parse_file_selection(&json!({})).is_err());
        assert!(parse_file_selection(&json!({ "files": 42 })).is_err());
    }

    #[test]
    fn test_parse_file_selection_non_string_entry() {
        let body = json!({ "files": ["a.txt", 7] });
        assert!(parse_file_selection(&body).is_err());
    }
}
