use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, INVALID_BODY, NO_MESSAGE},
    message::{ChatRequest, ChatResponse, ResponseKind},
    services::{
        chatbot::{detect_intent, generate_reply},
        usage::UsageSnapshot,
    },
    state::SharedState,
};

/// Successful replies carry their [`ResponseKind`] as a response extension
/// so the usage layer can count them; anything without one is an error.
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<(Extension<ResponseKind>, Json<ChatResponse>)> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id, intent = tracing::field::Empty);

    let reply = handle_chat(&state, payload).instrument(span).await?;
    Ok((Extension(reply.kind()), Json(reply)))
}

async fn handle_chat(
    state: &SharedState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<ChatResponse> {
    // Checked before anything else: without a model key the service is not usable.
    let Some(llm) = state.llm.clone() else {
        return Err(AppError::Config("GEMINI_API_KEY is not set".into()));
    };

    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "rejected chat body");
        AppError::BadRequest(INVALID_BODY.into())
    })?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest(NO_MESSAGE.into()))?;

    let intent = detect_intent(message);
    tracing::Span::current().record("intent", intent.as_str());
    tracing::info!(history = request.history.len(), "dispatching chat message");
    state.usage.record_intent(intent);

    generate_reply(
        intent,
        message,
        &request.history,
        state.catalog.as_ref(),
        llm.as_ref(),
    )
    .await
}

pub async fn get_usage_handler(State(state): State<SharedState>) -> Json<UsageSnapshot> {
    Json(state.usage.snapshot())
}
