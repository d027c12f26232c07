use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderMap, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::client::client_router;
use super::files::files_router;
use super::functions::functions_router;
use crate::config::ServerConfig;
use crate::notify::{NotificationData, NotificationKind, Notifier};
use crate::realtime::MessageHub;
use crate::storage::{FileStorage, public_url};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub storage: FileStorage,
    pub hub: MessageHub,
    pub notifier: Arc<Notifier>,
    pub config: ServerConfig,
}

impl AppState {
    /// Base URL for links handed to clients. Falls back to the request's Host header.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.config.public_base_url {
            return url.trim_end_matches('/').to_string();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("http");
        format!("{scheme}://{host}")
    }

    pub fn public_url(&self, headers: &HeaderMap, object_path: &str) -> String {
        public_url(&self.base_url(headers), object_path)
    }

    /// Fire-and-forget client email, sent after the caller's write has committed.
    pub fn notify(&self, kind: NotificationKind, client_id: &str, data: NotificationData) {
        self.notifier.dispatch(kind, client_id, data);
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", client_router())
        .nest("/functions", functions_router())
        .nest("/files", files_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
