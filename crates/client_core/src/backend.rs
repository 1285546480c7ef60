//! HTTP access to the study coach backend.

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{PdfFile, PDF_MIME_TYPE},
    error::WorkflowError,
    protocol::{
        ChatRequest, ChatResponse, ErrorBody, HealthResponse, UploadResponse, CHAT_PATH,
        DOCS_PATH, HEALTH_PATH, UPLOAD_FIELD_NAME, UPLOAD_PATH,
    },
};
use tracing::debug;

use crate::config::{ClientSettings, SettingsError};

#[async_trait]
pub trait CoachBackend: Send + Sync {
    async fn upload_pdf(&self, file: &PdfFile) -> Result<UploadResponse, WorkflowError>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, WorkflowError>;
    async fn health(&self) -> Result<HealthResponse, WorkflowError>;
}

pub struct HttpCoachBackend {
    http: Client,
    api_base: String,
}

impl HttpCoachBackend {
    /// `api_base` must already be normalized (no trailing slash).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| SettingsError::HttpClient(err.to_string()))?;
        Ok(Self::with_client(http, settings.api_base.clone()))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn docs_url(&self) -> String {
        self.endpoint(DOCS_PATH)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

#[async_trait]
impl CoachBackend for HttpCoachBackend {
    async fn upload_pdf(&self, file: &PdfFile) -> Result<UploadResponse, WorkflowError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(PDF_MIME_TYPE)
            .map_err(transport_error)?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!(url = %self.endpoint(UPLOAD_PATH), "POST upload");
        let response = self
            .http
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, WorkflowError> {
        debug!(url = %self.endpoint(CHAT_PATH), "POST chat");
        let response = self
            .http
            .post(self.endpoint(CHAT_PATH))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn health(&self) -> Result<HealthResponse, WorkflowError> {
        let response = self
            .http
            .get(self.endpoint(HEALTH_PATH))
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, WorkflowError> {
    let status = response.status();
    if !status.is_success() {
        // An unreadable or non-JSON error body just means there is no detail to show.
        let detail = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.detail_message()),
            Err(_) => None,
        };
        return Err(WorkflowError::server(status.as_u16(), detail));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| WorkflowError::transport(format!("invalid response body: {err}")))
}

fn transport_error(err: reqwest::Error) -> WorkflowError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    WorkflowError::transport(message)
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
