//! HTTP surface: the chat page plus a small JSON API.

use crate::app::{App, AppStatus, TurnOutcome};
use crate::deck::PPTX_MIME;
use crate::models::ChatEntry;
use crate::session::Session;
use crate::{Error, Result};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../data/web/index.html");

type SharedApp = Arc<App>;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub messages: Vec<ChatEntry>,
    pub has_outline: bool,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            has_outline: session.has_outline(),
            id: session.id,
            messages: session.messages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    #[serde(default)]
    pub theme_color: Option<String>,
}

/// JSON error body with a status derived from the error kind.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::SessionNotFound(_) | Error::FileNotFound(_) => StatusCode::NOT_FOUND,
            Error::MissingConfig(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(app: SharedApp) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(status))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/messages", post(post_message))
        .route("/api/files/{id}", get(download_file))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Bind `addr` and serve until Ctrl-C, ending sessions idle for `session_ttl`.
pub async fn serve(app: SharedApp, addr: &str, session_ttl: Duration) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let reaper = App::spawn_session_reaper(app.clone(), session_ttl);
    let served = axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    reaper.abort();
    served?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn status(State(app): State<SharedApp>) -> Json<AppStatus> {
    Json(app.status())
}

async fn create_session(State(app): State<SharedApp>) -> (StatusCode, Json<SessionView>) {
    let session = app.create_session().await;
    (StatusCode::CREATED, Json(session.into()))
}

async fn get_session(
    State(app): State<SharedApp>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(app.session(id).await?.into()))
}

async fn delete_session(
    State(app): State<SharedApp>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    app.delete_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_message(
    State(app): State<SharedApp>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<Json<TurnOutcome>> {
    let outcome = app
        .handle_message(id, &request.text, request.theme_color.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn download_file(
    State(app): State<SharedApp>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let file = app.file(id).await?;
    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound(id).into())
        }
        Err(e) => return Err(Error::Io(e).into()),
    };

    let headers = [
        (header::CONTENT_TYPE, PPTX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}
