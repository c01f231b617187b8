//! Router assembly.

use crate::handlers;
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .patch(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/themes", get(handlers::list_themes))
        .route(
            "/api/theme",
            get(handlers::get_theme).put(handlers::update_theme),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let code = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if code.is_server_error() {
        warn!(
            "event=http_request module=server status=error method={method} path={path} code={} duration_ms={duration_ms}",
            code.as_u16()
        );
    } else {
        info!(
            "event=http_request module=server status=ok method={method} path={path} code={} duration_ms={duration_ms}",
            code.as_u16()
        );
    }
    response
}
