//! Scan upload and report download.

use super::auth::CurrentSession;
use super::{ApiError, AppState};
use crate::classifier::ProbabilityVector;
use crate::diagnosis::{Gauge, Verdict, REPORT_FILE_NAME};
use crate::image::UploadedImage;
use crate::pipeline;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct DiagnoseResponse {
    pub verdict: Verdict,
    pub label: &'static str,
    pub banner: &'static str,
    pub confidence: f64,
    pub confidence_text: String,
    pub probabilities: ProbabilityVector,
    pub gauge: Gauge,
    pub report: String,
    pub report_file_name: &'static str,
    pub preview: String,
}

/// `POST /api/diagnose` with a multipart `file` field.
pub async fn diagnose(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    mut multipart: Multipart,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Malformed upload", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read file data", e))?;
        upload = Some(UploadedImage::new(file_name, bytes.to_vec())?);
    }

    let upload = upload.ok_or_else(|| {
        ApiError::BadRequest("Please upload an MRI scan image to start the prediction.".into())
    })?;

    let diagnosis = pipeline::analyze(state.classifier.as_ref(), &upload)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to analyze {}: {}", upload.file_name, e);
            ApiError::Processing(e.to_string())
        })?;

    let report = diagnosis.report();
    let response = DiagnoseResponse {
        verdict: diagnosis.verdict,
        label: diagnosis.verdict.label(),
        banner: diagnosis.verdict.banner(),
        confidence: diagnosis.confidence,
        confidence_text: diagnosis.confidence_text(),
        probabilities: diagnosis.probabilities,
        gauge: diagnosis.gauge(),
        report: report.to_string(),
        report_file_name: REPORT_FILE_NAME,
        preview: upload.preview_data_url(),
    };

    session.context.lock().await.last_diagnosis = Some(diagnosis);

    Ok(Json(response))
}

/// Oversized bodies keep their 413; anything else is a bad request.
fn upload_error(context: &str, err: MultipartError) -> ApiError {
    let message = format!("{}: {}", context, err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

/// `GET /api/report` downloads the latest report of this session.
pub async fn report(Extension(session): Extension<CurrentSession>) -> Result<Response, ApiError> {
    let report = session
        .context
        .lock()
        .await
        .last_diagnosis
        .as_ref()
        .map(|diagnosis| diagnosis.report())
        .ok_or_else(|| {
            ApiError::NotFound("No report available yet. Upload an MRI scan first.".into())
        })?;

    let headers = [
        (header::CONTENT_TYPE, format!("{}; charset=utf-8", report.mime())),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.file_name()),
        ),
    ];

    Ok((headers, report.to_string()).into_response())
}
