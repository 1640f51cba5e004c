// src/routes/mod.rs
pub mod chat;

use std::{any::Any, path::Path};

use crate::{error::AppError, message::ResponseKind, state::SharedState};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chat::{chat_handler, get_usage_handler};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub const CHAT_PATH: &str = "/api/chat";

pub fn create_router(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat_handler))
        .route("/api/usage", get(get_usage_handler))
        .route("/health", get(|| async { "OK" }))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(handle_panic))
        // outside the panic layer so converted panics are counted too
        .layer(middleware::from_fn_with_state(state.clone(), record_chat_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn record_chat_response(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let is_chat = req.uri().path() == CHAT_PATH;
    let response = next.run(req).await;
    if is_chat {
        let kind = response
            .extensions()
            .get::<ResponseKind>()
            .copied()
            .unwrap_or(ResponseKind::Error);
        state.usage.record_response(kind);
    }
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(detail).into_response()
}
