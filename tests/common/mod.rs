//! In-process stand-ins for the job-matching backend and the identity
//! provider, served on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use job_match::core::config_manager::{IdentityConfig, ServiceConfig};
use job_match::{ServiceClient, Session, SessionContext, SessionUser};

pub const VALID_TOKEN: &str = "test-token";
pub const ANON_KEY: &str = "anon-key";

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    pub resumes: Arc<Mutex<Vec<Value>>>,
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
    next_id: Arc<Mutex<u32>>,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(SeenRequest {
            method,
            path,
            authorization,
            body,
        });
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", VALID_TOKEN))
            .unwrap_or(false)
    }

    fn next_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("resume-{}", *next)
    }
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid authentication token"})),
    )
        .into_response()
}

async fn upload_resume(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> axum::response::Response {
    backend.record("POST", "/api/resumes".into(), &headers, None);
    if !MockBackend::authorized(&headers) {
        return unauthorized();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();

        if !filename.ends_with(".pdf") || content_type != "application/pdf" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "Only PDF files are allowed"})),
            )
                .into_response();
        }

        let record = json!({
            "id": backend.next_id(),
            "filename": filename,
            "file_size": bytes.len(),
            "created_at": "2024-01-05T10:30:00.000000+00:00",
            "parsed_text": String::from_utf8_lossy(&bytes),
            "updated_at": "2024-01-05T10:30:00.000000+00:00",
        });
        // Newest first, as the backend orders by created_at desc.
        backend.resumes.lock().unwrap().insert(0, record.clone());

        let mut summary = record;
        if let Some(obj) = summary.as_object_mut() {
            obj.remove("parsed_text");
            obj.remove("updated_at");
        }
        return (StatusCode::CREATED, Json(summary)).into_response();
    }

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [{"loc": ["body", "file"], "msg": "field required"}]})),
    )
        .into_response()
}

async fn list_resumes(State(backend): State<MockBackend>, headers: HeaderMap) -> axum::response::Response {
    backend.record("GET", "/api/resumes".into(), &headers, None);
    if !MockBackend::authorized(&headers) {
        return unauthorized();
    }
    let items: Vec<Value> = backend
        .resumes
        .lock()
        .unwrap()
        .iter()
        .map(|r| {
            json!({
                "id": r["id"],
                "filename": r["filename"],
                "file_size": r["file_size"],
                "created_at": r["created_at"],
            })
        })
        .collect();
    Json(items).into_response()
}

async fn get_resume(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    backend.record("GET", format!("/api/resumes/{}", id), &headers, None);
    if !MockBackend::authorized(&headers) {
        return unauthorized();
    }
    let found = backend
        .resumes
        .lock()
        .unwrap()
        .iter()
        .find(|r| r["id"] == id.as_str())
        .cloned();
    match found {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Resume not found"}))).into_response(),
    }
}

async fn delete_resume(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    backend.record("DELETE", format!("/api/resumes/{}", id), &headers, None);
    if !MockBackend::authorized(&headers) {
        return unauthorized();
    }
    let mut resumes = backend.resumes.lock().unwrap();
    let before = resumes.len();
    resumes.retain(|r| r["id"] != id.as_str());
    if resumes.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Resume not found"}))).into_response();
    }
    Json(json!({"success": true, "message": "Resume deleted successfully"})).into_response()
}

async fn search_jobs(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    backend.record("POST", "/api/jobs/search".into(), &headers, Some(body.clone()));
    if !MockBackend::authorized(&headers) {
        return unauthorized();
    }
    if body["title"] == "Unavailable" {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "Job provider is unavailable"})),
        )
            .into_response();
    }

    let with_resume = body.get("resume_id").is_some();
    Json(json!({
        "success": true,
        "message": format!("Found 2 jobs for {}", body["title"].as_str().unwrap_or_default()),
        "data": {
            "jobs": [
                {
                    "title": "Senior React Native Developer",
                    "company": "TechCorp Inc.",
                    "location": body["location"],
                    "description": "Build our flagship app",
                    "match_score": if with_resume { 92 } else { 55 },
                    "qualifies": with_resume,
                    "met_qualifications": ["React Native", "TypeScript"],
                    "missing_qualifications": ["GraphQL"],
                    "guidance": {
                        "GraphQL": {
                            "description": "Learn GraphQL",
                            "link": "https://graphql.org/learn",
                            "steps": "Build a small API"
                        }
                    },
                    "apply_link": "https://example.com/apply/1"
                },
                {
                    "title": "Mobile Engineer",
                    "company": "StartupXYZ",
                    "location": body["location"],
                    "description": "Ship features fast",
                    "match_score": 64.5,
                    "qualifies": false,
                    "met_qualifications": ["React Native"],
                    "missing_qualifications": ["Kotlin", "Swift"],
                    "guidance": {},
                    "apply_link": ""
                }
            ],
            "total_searched": 25,
            "analyzed": 2
        }
    }))
    .into_response()
}

async fn sign_up(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "No API key found in request"})))
            .into_response();
    }
    match body["email"].as_str().unwrap_or_default() {
        "taken@example.com" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": 422, "error_code": "user_already_exists", "msg": "User already registered"})),
        )
            .into_response(),
        "shouty@example.com" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": 422, "msg": "User ALREADY REGISTERED"})),
        )
            .into_response(),
        "instant@example.com" => Json(session_body("instant@example.com")).into_response(),
        email => Json(json!({"id": "new-user", "email": email, "confirmation_sent_at": "2024-01-05T10:30:00Z"}))
            .into_response(),
    }
}

async fn token(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY)
        || params.get("grant_type").map(String::as_str) != Some("password")
    {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "unsupported_grant_type"}))).into_response();
    }
    if body["password"] == "correct-horse" {
        Json(session_body(body["email"].as_str().unwrap_or_default())).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
        )
            .into_response()
    }
}

fn session_body(email: &str) -> Value {
    json!({
        "access_token": VALID_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-token",
        "user": {"id": "user-1", "email": email}
    })
}

/// Start the mock on 127.0.0.1 and return its base URL and state.
pub async fn spawn_backend() -> (String, MockBackend) {
    let backend = MockBackend::default();
    let app = Router::new()
        .route("/api/resumes", post(upload_resume).get(list_resumes))
        .route("/api/resumes/:id", get(get_resume).delete(delete_resume))
        .route("/api/jobs/search", post(search_jobs))
        .route("/auth/v1/signup", post(sign_up))
        .route("/auth/v1/token", post(token))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

pub fn service_client(base_url: &str) -> ServiceClient {
    ServiceClient::new(&ServiceConfig {
        api_url: base_url.to_string(),
        timeout_seconds: Some(10),
    })
    .unwrap()
}

pub fn identity_config(base_url: &str) -> IdentityConfig {
    IdentityConfig {
        auth_url: Some(base_url.to_string()),
        anon_key: Some(ANON_KEY.to_string()),
    }
}

pub fn signed_in(token: &str) -> SessionContext {
    SessionContext::with_session(Session {
        access_token: token.to_string(),
        refresh_token: None,
        user: SessionUser {
            id: "user-1".to_string(),
            email: Some("alex.johnson@email.com".to_string()),
        },
        expires_at: None,
    })
}
