//! HTTP transport for the resource router.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /api/:collection` - list.
//! - `POST /api/:collection` - create; body is the record.
//! - `PUT /api/:collection/:id` - update; body is the field set.
//! - `PUT /api/:collection/` - update without an id (gallery only).
//! - `DELETE /api/:collection/:id` - delete.
//! - `POST /api/login` - `{ "username", "password" }`.
//! - `POST /api/enroll` - enrollment request.
//! - `POST /api/fix-gallery-ids` - assign ids to gallery rows without one.
//! - `GET /api/health` - liveness and store status.
//!
//! Errors are `{ "error": "<message>" }` with the status from
//! [`ResourceError::status_code`].

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use super::{ResourceError, ResourceRouter};
use crate::enroll::{EnrollmentNotifier, EnrollmentRequest};
use crate::record::Record;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<ResourceRouter>,
    pub notifier: Arc<dyn EnrollmentNotifier>,
    pub started: Instant,
}

impl AppState {
    pub fn new(resources: Arc<ResourceRouter>, notifier: Arc<dyn EnrollmentNotifier>) -> Self {
        Self {
            resources,
            notifier,
            started: Instant::now(),
        }
    }
}

/// Build an axum `Router` serving the resource API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/login", post(login_handler))
        .route("/api/enroll", post(enroll_handler))
        .route("/api/fix-gallery-ids", post(fix_gallery_ids_handler))
        .route("/api/:collection", get(list_handler).post(create_handler))
        .route("/api/:collection/", put(update_without_id_handler))
        .route(
            "/api/:collection/:id",
            put(update_handler).delete(delete_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the resource API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "serving resource api");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

fn error_response(err: ResourceError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, ResourceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Decode a body into a record, rejecting shapes outside the value model.
fn record_body(body: Result<Json<Value>, JsonRejection>) -> Result<Record, ResourceError> {
    let Json(value) = body.map_err(|e| ResourceError::InvalidRequest(e.body_text()))?;
    Record::try_from(value).map_err(|e| ResourceError::InvalidRequest(format!("invalid record: {e}")))
}

async fn list_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Response {
    respond(state.resources.list(&collection))
}

async fn create_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    respond(record_body(body).and_then(|fields| state.resources.create(&collection, fields)))
}

async fn update_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    respond(record_body(body).and_then(|fields| state.resources.update(&collection, &id, fields)))
}

async fn update_without_id_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    respond(record_body(body).and_then(|fields| state.resources.update(&collection, "", fields)))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    respond(
        state
            .resources
            .delete(&collection, &id)
            .map(|()| json!({ "message": "Item deleted successfully" })),
    )
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let result = body
        .map_err(|e| ResourceError::InvalidRequest(e.body_text()))
        .and_then(|Json(c)| state.resources.login(&c.username, &c.password))
        .map(|()| json!({ "message": "Login successful" }));
    respond(result)
}

async fn enroll_handler(
    State(state): State<AppState>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => return error_response(ResourceError::InvalidRequest(e.body_text())),
    };

    match state.notifier.notify(&request.notification()).await {
        Ok(()) => Json(json!({ "message": "Enrollment request sent successfully" })).into_response(),
        Err(e) => {
            error!(error = %e, course = %request.course, "enrollment delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send enrollment request" })),
            )
                .into_response()
        }
    }
}

async fn fix_gallery_ids_handler(State(state): State<AppState>) -> Response {
    respond(
        state
            .resources
            .repair_gallery_ids()
            .map(|n| json!({ "message": format!("Fixed {n} gallery items with empty IDs") })),
    )
}

/// `GET /api/health` - 200 when the store answers, 503 otherwise.
async fn health_handler(State(state): State<AppState>) -> Response {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match state.resources.store().tables() {
        Ok(tables) => Json(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "server": {
                "status": "running",
                "uptime_secs": state.started.elapsed().as_secs(),
            },
            "database": {
                "status": "healthy",
                "tables": tables.len(),
            },
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                    "timestamp": timestamp,
                })),
            )
                .into_response()
        }
    }
}
