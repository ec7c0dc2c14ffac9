//! Document upload handler
//!
//! Unlike every other endpoint, failures here are reported inside a 200
//! payload (`success: false`) instead of as an error status.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::{extract::State, Json};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::application::documents::{DocumentProcessor, UploadReport};

const FILE_FIELD: &str = "file";

/// Multipart body accepted by the upload endpoint (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/v1/documents/process",
    tag = "Documents",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis result, or `success: false` with an error", body = UploadReport)
    )
)]
pub async fn process_document(
    State(processor): State<DocumentProcessor>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<UploadReport> {
    let report = match multipart {
        Ok(multipart) => match analyze(&processor, multipart).await {
            Ok(report) => report,
            Err(message) => UploadReport::failed(message),
        },
        Err(rejection) => UploadReport::failed(rejection.body_text()),
    };

    if report.success {
        info!(
            filename = ?report.filename,
            size_bytes = ?report.size_bytes,
            "Document processed"
        );
    } else {
        warn!(error = ?report.error, "Document processing failed");
    }
    Json(report)
}

async fn analyze(processor: &DocumentProcessor, mut multipart: Multipart) -> Result<UploadReport, String> {
    while let Some(field) = multipart.next_field().await.map_err(describe)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(describe)?;

        return Ok(processor.analyze_upload(filename, content_type, &bytes));
    }

    Err(format!("Missing multipart field '{}'", FILE_FIELD))
}

fn describe(e: MultipartError) -> String {
    e.body_text()
}
