use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use dms_core::extract::DefaultExtractor;
use dms_core::persist::{init_data_dir, DataPaths};
use dms_core::store::SledDocumentStore;
use dms_core::users::{NewUser, Role, SledUserStore, User, UserStore};
use dms_core::{AnalysisConfig, Analyzer, AuthError, Document, DocumentId, DocumentService, SearchQuery, SearchResult, ServiceError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SESSION_HEADER: &str = "X-SESSION-TOKEN";
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

type ApiError = (StatusCode, String);

pub struct ServerConfig {
    pub data_dir: String,
    pub analysis: AnalysisConfig,
    /// Upper bound on background processing of one document.
    pub process_timeout: Duration,
}

impl ServerConfig {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self { data_dir: data_dir.into(), analysis: AnalysisConfig::default(), process_timeout: Duration::from_secs(120) }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
}

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub process_timeout: Duration,
}

#[derive(Serialize)]
pub struct UserView {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self { id: u.id, username: u.username, email: u.email, first_name: u.first_name, last_name: u.last_name, role: u.role }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub title: String,
    pub file_name: String,
}

#[derive(Deserialize)]
pub struct UpdateDocument {
    pub title: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let paths = DataPaths::new(&config.data_dir);
    init_data_dir(&paths)?;
    let db = sled::open(paths.db()).with_context(|| format!("cannot open database in {}", config.data_dir))?;
    let store = SledDocumentStore::with_db(db.clone())?;
    let users = SledUserStore::with_db(db)?;
    let documents = DocumentService::new(
        Arc::new(store),
        Arc::new(DefaultExtractor),
        Analyzer::new(config.analysis),
        paths,
    );
    let state = AppState {
        documents,
        users: Arc::new(users),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        process_timeout: config.process_timeout,
    };
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/password", post(change_password_handler))
        .route("/documents", get(list_handler).post(upload_handler))
        .route("/documents/:id", get(document_handler).put(update_handler).delete(delete_handler))
        .route("/documents/:id/reprocess", post(reprocess_handler))
        .route("/search", get(search_handler))
        .route("/analyze/summary", post(summary_handler))
        .route("/analyze/keywords", post(keywords_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn service_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        _ => {
            tracing::error!(error = %e, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

fn auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::UsernameTaken(_) | AuthError::EmailTaken(_) => (StatusCode::CONFLICT, e.to_string()),
        other => {
            tracing::error!(error = %other, "auth failure");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let provided = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");
    state
        .sessions
        .read()
        .get(provided)
        .cloned()
        .ok_or((StatusCode::UNAUTHORIZED, "login required".into()))
}

/// Run document processing off the async runtime, bounded by the configured timeout.
fn spawn_processing(state: &AppState, id: DocumentId) {
    let svc = state.documents.clone();
    let timeout = state.process_timeout;
    tokio::spawn(async move {
        let mut task = tokio::task::spawn_blocking({
            let svc = svc.clone();
            move || svc.process(id)
        });
        let failed = match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(Ok(_))) => false,
            Ok(Ok(Err(e))) => {
                tracing::error!(id, error = %e, "processing error");
                true
            }
            Ok(Err(e)) => {
                tracing::error!(id, error = %e, "processing task aborted");
                true
            }
            Err(_) => {
                tracing::warn!(id, ?timeout, "processing timed out");
                if let Err(e) = svc.mark_failed(id) {
                    tracing::error!(id, error = %e, "could not mark document as failed");
                }
                // blocking work cannot be cancelled; its result is dropped by `process`
                match task.await {
                    Ok(Ok(saved)) => tracing::info!(id, saved, "timed out processing finished"),
                    Ok(Err(e)) => tracing::error!(id, error = %e, "timed out processing failed"),
                    Err(e) => tracing::error!(id, error = %e, "timed out processing task aborted"),
                }
                return;
            }
        };
        if failed {
            if let Err(e) = svc.mark_failed(id) {
                tracing::error!(id, error = %e, "could not mark document as failed");
            }
        }
    });
}

// --- Auth ---

async fn register_handler(State(state): State<AppState>, Json(req): Json<NewUser>) -> Result<(StatusCode, Json<UserView>), ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() || !req.email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "username, email and password are required".into()));
    }
    let user = state.users.register(req).map_err(auth_error)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login_handler(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&req.username, &req.password)
        .map_err(auth_error)?
        .ok_or((StatusCode::UNAUTHORIZED, "invalid username or password".into()))?;
    let token = uuid::Uuid::new_v4().to_string();
    state
        .sessions
        .write()
        .insert(token.clone(), Session { user_id: user.id, username: user.username.clone() });
    tracing::info!(user = %user.username, "login");
    Ok(Json(LoginResponse { token, user: user.into() }))
}

async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        state.sessions.write().remove(token);
    }
    StatusCode::NO_CONTENT
}

async fn change_password_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<ChangePasswordRequest>) -> Result<StatusCode, ApiError> {
    let session = authorize(&state, &headers)?;
    if req.new_password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "new password is required".into()));
    }
    let changed = state
        .users
        .change_password(session.user_id, &req.current_password, &req.new_password)
        .map_err(auth_error)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::BAD_REQUEST, "current password is incorrect".into()))
    }
}

// --- Documents ---

async fn list_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<Document>>, ApiError> {
    authorize(&state, &headers)?;
    state.documents.list().map(Json).map_err(service_error)
}

async fn upload_handler(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<UploadParams>, body: Bytes) -> Result<(StatusCode, Json<Document>), ApiError> {
    let session = authorize(&state, &headers)?;
    let doc = state
        .documents
        .upload(&params.title, &params.file_name, &body, &session.username)
        .map_err(service_error)?;
    spawn_processing(&state, doc.id);
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn document_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<DocumentId>) -> Result<Json<Document>, ApiError> {
    authorize(&state, &headers)?;
    match state.documents.get(id).map_err(service_error)? {
        Some(doc) => Ok(Json(doc)),
        None => Err((StatusCode::NOT_FOUND, format!("document not found: {id}"))),
    }
}

async fn update_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<DocumentId>, Json(req): Json<UpdateDocument>) -> Result<Json<Document>, ApiError> {
    let session = authorize(&state, &headers)?;
    state
        .documents
        .update_title(id, &req.title, &session.username)
        .map(Json)
        .map_err(service_error)
}

async fn delete_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<DocumentId>) -> Result<StatusCode, ApiError> {
    let session = authorize(&state, &headers)?;
    if state.documents.delete(id, &session.username).map_err(service_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("document not found: {id}")))
    }
}

async fn reprocess_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<DocumentId>) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    if state.documents.get(id).map_err(service_error)?.is_none() {
        return Err((StatusCode::NOT_FOUND, format!("document not found: {id}")));
    }
    spawn_processing(&state, id);
    Ok(StatusCode::ACCEPTED)
}

pub async fn search_handler(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<SearchQuery>) -> Result<Json<SearchResponse>, ApiError> {
    authorize(&state, &headers)?;
    let start = std::time::Instant::now();
    let results = state.documents.search(&params).map_err(service_error)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results }))
}

// --- Analysis ---

async fn summary_handler(State(state): State<AppState>, body: String) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "summary": state.documents.analyzer().summarize(&body) }))
}

async fn keywords_handler(State(state): State<AppState>, body: String) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "keywords": state.documents.analyzer().extract_keywords(&body) }))
}
