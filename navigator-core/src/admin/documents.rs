use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Method;
use serde_json::Value;
use std::path::Path;
use tracing::info;

use super::AdminClient;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{
    content_type_for, Document, DocumentContent, DocumentList, DocumentUpload, PresignedUpload,
    PresignedUrlRequest,
};

impl AdminClient {
    pub async fn list_documents(&self) -> NavigatorResult<Vec<Document>> {
        let list: DocumentList = self.get_json(self.url("files", None)?, &[]).await?;
        Ok(list.files)
    }

    pub async fn upload_document(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> NavigatorResult<()> {
        if filename.trim().is_empty() {
            return Err(NavigatorError::validation("File name cannot be empty"));
        }

        let upload = DocumentUpload {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            content: BASE64.encode(bytes),
        };
        let _: Value = self
            .send_json(Method::POST, self.url("files", None)?, &upload)
            .await?;
        info!(filename, size = bytes.len(), "Document uploaded");
        Ok(())
    }

    /// Reads a local file and uploads it under its file name.
    pub async fn upload_path(&self, path: &Path) -> NavigatorResult<String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                NavigatorError::validation(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        self.upload_document(&filename, content_type_for(&filename), &bytes)
            .await?;
        Ok(filename)
    }

    /// The body is the file's bytes as base64 text.
    pub async fn download_document(&self, key: &str) -> NavigatorResult<DocumentContent> {
        let response = self
            .send_empty(Method::GET, self.url("files", Some(key))?)
            .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let text = response.text().await?;
        let bytes = BASE64.decode(text.trim())?;

        Ok(DocumentContent {
            key: key.to_string(),
            content_type,
            bytes,
        })
    }

    pub async fn delete_document(&self, key: &str) -> NavigatorResult<()> {
        self.send_empty(Method::DELETE, self.url("files", Some(key))?)
            .await?;
        info!(key, "Document deleted");
        Ok(())
    }

    /// Starts a knowledge-base ingestion run over the current documents.
    pub async fn sync_knowledge_base(&self) -> NavigatorResult<Value> {
        let result = self
            .send_json(Method::POST, self.url("sync", None)?, &serde_json::json!({}))
            .await?;
        info!("Knowledge base sync requested");
        Ok(result)
    }

    pub async fn presigned_upload_url(
        &self,
        filename: &str,
        content_type: &str,
    ) -> NavigatorResult<PresignedUpload> {
        let request = PresignedUrlRequest {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        };
        self.send_json(Method::POST, self.url("presigned-url", None)?, &request)
            .await
    }
}
