use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::domain::SyllabusId;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedUpload {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    chats: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn handle_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> axum::response::Response {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let received = ReceivedUpload {
            field_name: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.expect("field bytes").to_vec(),
        };
        let file_name = received.file_name.clone().unwrap_or_default();
        state.uploads.lock().await.push(received);

        if file_name == "huge.pdf" {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(serde_json::json!({"detail": "file too large"})),
            )
                .into_response();
        }
        if file_name == "crash.pdf" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        if file_name == "garbled.pdf" {
            return Json(serde_json::json!({"unexpected": true})).into_response();
        }
    }
    Json(serde_json::json!({"syllabus_id": "abc123"})).into_response()
}

async fn handle_chat(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> axum::response::Response {
    state.chats.lock().await.push(payload.clone());
    if payload["syllabus_id"] == "unknown" {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Unknown syllabus_id. Upload first."})),
        )
            .into_response();
    }
    let answer = format!(
        "Plan for {} in {} minutes",
        payload["heading"].as_str().unwrap_or_default(),
        payload["minutes"]
    );
    Json(serde_json::json!({"answer": answer})).into_response()
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true, "syllabi_loaded": 2, "ollama_model": "llama3.1:8b"}))
}

async fn spawn_coach_server() -> std::io::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/upload", post(handle_upload))
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn sample_pdf(name: &str) -> PdfFile {
    PdfFile::new(name, b"%PDF-1.7 syllabus".to_vec())
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let (server_url, state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let response = backend
        .upload_pdf(&sample_pdf("syllabus.pdf"))
        .await
        .expect("upload");
    assert_eq!(response.syllabus_id, SyllabusId::new("abc123"));

    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0],
        ReceivedUpload {
            field_name: "file".into(),
            file_name: Some("syllabus.pdf".into()),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF-1.7 syllabus".to_vec(),
        }
    );
}

#[tokio::test]
async fn upload_error_carries_server_detail() {
    let (server_url, _state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let err = backend
        .upload_pdf(&sample_pdf("huge.pdf"))
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        WorkflowError::server(413, Some("file too large".into()))
    );
    assert_eq!(err.display_message("Upload failed"), "file too large");
}

#[tokio::test]
async fn upload_error_without_json_body_has_no_detail() {
    let (server_url, _state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let err = backend
        .upload_pdf(&sample_pdf("crash.pdf"))
        .await
        .expect_err("must fail");
    assert_eq!(err, WorkflowError::server(500, None));
}

#[tokio::test]
async fn malformed_success_body_is_a_transport_error() {
    let (server_url, _state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let err = backend
        .upload_pdf(&sample_pdf("garbled.pdf"))
        .await
        .expect_err("must fail");
    let WorkflowError::Transport(message) = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(
        message.contains("invalid response body"),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn chat_posts_json_with_numeric_minutes() {
    let (server_url, state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let response = backend
        .chat(&ChatRequest {
            syllabus_id: SyllabusId::new("abc123"),
            heading: "Arrays".into(),
            minutes: 45,
        })
        .await
        .expect("chat");
    assert_eq!(response.answer, "Plan for Arrays in 45 minutes");

    let chats = state.chats.lock().await;
    assert_eq!(
        chats[0],
        serde_json::json!({"syllabus_id": "abc123", "heading": "Arrays", "minutes": 45})
    );
    assert!(chats[0]["minutes"].is_number());
}

#[tokio::test]
async fn chat_error_carries_server_detail() {
    let (server_url, _state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let err = backend
        .chat(&ChatRequest {
            syllabus_id: SyllabusId::new("unknown"),
            heading: "Arrays".into(),
            minutes: 60,
        })
        .await
        .expect_err("must fail");
    assert_eq!(
        err.display_message("Chat failed"),
        "Unknown syllabus_id. Upload first."
    );
}

#[tokio::test]
async fn health_reports_backend_status() {
    let (server_url, _state) = spawn_coach_server().await.expect("spawn server");
    let backend = HttpCoachBackend::new(server_url);

    let health = backend.health().await.expect("health");
    assert!(health.ok);
    assert_eq!(health.syllabi_loaded, 2);
    assert_eq!(health.ollama_model.as_deref(), Some("llama3.1:8b"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend = HttpCoachBackend::new(format!("http://{addr}"));
    let err = backend
        .upload_pdf(&sample_pdf("syllabus.pdf"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, WorkflowError::Transport(_)), "{err:?}");
    let message = err.display_message("Upload failed");
    assert!(!message.is_empty());
    assert_ne!(message, "Upload failed");
}

#[test]
fn docs_url_hangs_off_api_base() {
    let backend = HttpCoachBackend::new("http://127.0.0.1:8000");
    assert_eq!(backend.docs_url(), "http://127.0.0.1:8000/docs");
    assert_eq!(backend.api_base(), "http://127.0.0.1:8000");
}
