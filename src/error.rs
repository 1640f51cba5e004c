//! Errors surfaced to chat clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ChatResponse;

pub const API_KEY_MISSING: &str = "API key not configured";
pub const NO_MESSAGE: &str = "No message provided";
pub const INVALID_BODY: &str = "Invalid request body";
pub const PRODUCTS_UNAVAILABLE: &str = "Unable to fetch product data at the moment.";
pub const CONTENT_BLOCKED: &str =
    "I apologize, but I cannot provide a response to that query. Please try rephrasing your question.";
pub const GENERATION_FAILED: &str =
    "I'm having trouble generating a response. Please try again in a moment.";
pub const SOMETHING_WENT_WRONG: &str = "Sorry, something went wrong. Please try again later.";

pub type AppResult<T> = Result<T, AppError>;

/// Every variant renders as `{"type": "error", "message": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("content blocked: {0}")]
    Blocked(String),

    #[error("product lookup failed: {0}")]
    Catalog(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Blocked(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Catalog(_)
            | AppError::Generation(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the user. Upstream details stay in the logs.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Config(_) => API_KEY_MISSING,
            AppError::BadRequest(m) => m.as_str(),
            AppError::Blocked(_) => CONTENT_BLOCKED,
            AppError::Catalog(_) => PRODUCTS_UNAVAILABLE,
            AppError::Generation(_) => GENERATION_FAILED,
            AppError::Internal(_) => SOMETHING_WENT_WRONG,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "chat request failed");
        } else {
            tracing::warn!(error = %self, "chat request rejected");
        }
        let body = ChatResponse::Error {
            message: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
