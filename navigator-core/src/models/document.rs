use serde::{Deserialize, Serialize};

/// A knowledge-base source document held in the documents bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

impl Document {
    /// Upper-cased extension, e.g. `PDF`.
    pub fn file_type(&self) -> String {
        match self.key.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
            _ => "-".to_string(),
        }
    }

    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

pub fn format_size(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return "--".to_string();
    };
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb < 1.0 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", mb)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub files: Vec<Document>,
}

/// Body of `POST files`; `content` is base64.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

/// Downloaded file bytes plus the content type the API reported.
#[derive(Debug, Clone)]
pub struct DocumentContent {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrlRequest {
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    #[serde(alias = "uploadUrl", alias = "presigned_url", alias = "presignedUrl")]
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Guess a MIME type from a file name for uploads.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}
