//! HTTP handlers for the analysis API. Transport only: multipart parsing,
//! input validation, and extraction-error mapping. All analysis happens in
//! the engine.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::errors::AppError;
use crate::extract::pdf_to_text;
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Multipart form: `file` (PDF, required), `target_role` (optional),
/// `job_description` (optional).
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut target_role: Option<String> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_lowercase();
                if !filename.ends_with(".pdf") {
                    return Err(AppError::Validation(
                        "Please upload a PDF resume.".to_string(),
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            "target_role" => {
                target_role = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid target_role field: {e}"))
                })?);
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job_description field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let file_bytes = file_bytes
        .ok_or_else(|| AppError::Validation("Missing required field 'file'".to_string()))?;

    let resume_text = pdf_to_text(&file_bytes)
        .map_err(|e| AppError::Extraction(format!("Failed to parse PDF: {e}")))?;
    info!(
        bytes = file_bytes.len(),
        chars = resume_text.len(),
        "extracted resume text"
    );

    let request = AnalysisRequest {
        resume_text,
        target_role,
        job_description,
    };
    Ok(Json(state.analyzer.analyze(&request)))
}

/// POST /api/v1/analyze/text
///
/// The engine contract exposed directly for already-extracted text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    Ok(Json(state.analyzer.analyze(&request)))
}
