//! Plain-text document analysis

use std::path::Path;

use serde::Serialize;
use utoipa::ToSchema;

/// Basic counts over a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TextStats {
    /// Whitespace-separated tokens
    pub word_count: usize,
    /// Pieces produced by splitting on `.`
    pub sentence_count: usize,
    /// Unicode scalar values
    pub character_count: usize,
}

/// Outcome of analysing a file on disk
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub stats: Option<TextStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of analysing an uploaded file. Failures are reported in the
/// payload rather than as an error status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Present when the upload is valid UTF-8 text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TextStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            size_bytes: None,
            content_type: None,
            analysis: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process_text(&self, text: &str) -> TextStats {
        TextStats {
            word_count: text.split_whitespace().count(),
            sentence_count: text.split('.').count(),
            character_count: text.chars().count(),
        }
    }

    /// Read `path` as UTF-8 and analyse it. Read failures end up in the report.
    pub async fn process_file(&self, path: &Path) -> DocumentReport {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => DocumentReport {
                success: true,
                file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
                stats: Some(self.process_text(&text)),
                error: None,
            },
            Err(e) => DocumentReport {
                success: false,
                file_name: None,
                stats: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn analyze_upload(
        &self,
        filename: Option<String>,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> UploadReport {
        let analysis = std::str::from_utf8(bytes)
            .ok()
            .map(|text| self.process_text(text));

        UploadReport {
            success: true,
            filename,
            size_bytes: Some(bytes.len() as u64),
            content_type,
            analysis,
            error: None,
        }
    }
}
