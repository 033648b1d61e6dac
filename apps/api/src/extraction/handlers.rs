use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::pdf::{extract_pdf_text, is_pdf_filename};
use crate::session::SessionId;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub resume_id: Uuid,
    pub filename: String,
    /// First 500 characters of the extracted text.
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TextUploadRequest {
    pub filename: String,
    pub text: String,
}

/// POST /api/v1/resumes
/// Multipart upload with a single `file` field holding a PDF.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if !is_pdf_filename(&filename) {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }

    let text = extract_pdf_text(&filename, data).await?;
    store_resume(&state, &session_id, filename, text).await
}

/// POST /api/v1/resumes/text
pub async fn handle_upload_text(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Json(req): Json<TextUploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    if req.filename.trim().is_empty() {
        return Err(AppError::Validation("filename must not be empty".to_string()));
    }
    store_resume(&state, &session_id, req.filename, req.text).await
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.session(&session_id).await;
    if !session.lock().await.store.delete(resume_id) {
        return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
    }
    info!("Deleted resume {resume_id} from session {session_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/resumes
pub async fn handle_clear_resumes(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> StatusCode {
    let session = state.sessions.session(&session_id).await;
    session.lock().await.store.clear_all();
    info!("Cleared all resumes from session {session_id}");
    StatusCode::NO_CONTENT
}

async fn store_resume(
    state: &AppState,
    session_id: &str,
    filename: String,
    text: String,
) -> Result<Json<UploadResponse>, AppError> {
    let session = state.sessions.session(session_id).await;
    let mut session = session.lock().await;
    let resume_id = session.store.add(filename.clone(), text.clone());
    info!(
        "Stored resume {resume_id} ({filename}) in session {session_id}, {} total",
        session.store.len()
    );

    Ok(Json(UploadResponse {
        resume_id,
        filename,
        text: preview(&text),
    }))
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "a".repeat(600);
        let p = preview(&long);
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let text = "é".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&text), text);
    }
}
