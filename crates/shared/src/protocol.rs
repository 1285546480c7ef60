use serde::{Deserialize, Serialize};

use crate::domain::SyllabusId;

/// Multipart field name the ingestion endpoint reads the document from.
pub const UPLOAD_FIELD_NAME: &str = "file";

pub const UPLOAD_PATH: &str = "/upload";
pub const CHAT_PATH: &str = "/chat";
pub const HEALTH_PATH: &str = "/health";
pub const DOCS_PATH: &str = "/docs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub syllabus_id: SyllabusId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub syllabus_id: SyllabusId,
    pub heading: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(default)]
    pub syllabi_loaded: u64,
    #[serde(default)]
    pub ollama_model: Option<String>,
}

/// Error body returned by the backend on non-2xx responses. `detail` is usually a string but
/// request validation failures report a list of issues instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.is_empty() => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
