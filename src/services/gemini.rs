//! Prompt construction and the Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::message::{ChatMessage, MessageRole};

pub const PERSONA: &str = "You are a helpful e-commerce customer service assistant. Be friendly, concise, and professional. If you're not sure about something, ask for clarification. Focus on helping customers with their shopping experience.\n\n";

/// How many past turns are replayed to the model.
pub const HISTORY_WINDOW: usize = 5;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 1.0;
const TOP_K: u32 = 1;
const MAX_OUTPUT_TOKENS: u32 = 2048;

const BLOCKED_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Ordered text parts sent to the model as a single user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    parts: Vec<String>,
}

impl Prompt {
    pub fn build(history: &[ChatMessage], message: &str) -> Self {
        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        let mut parts = Vec::with_capacity(recent.len() + 2);
        parts.push(PERSONA.to_string());
        for turn in recent {
            let speaker = match turn.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            parts.push(format!("{speaker}: {}\n", turn.message));
        }
        parts.push(format!("User: {message}\nAssistant: "));

        Self { parts }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn text(&self) -> String {
        self.parts.concat()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    /// The provider refused the prompt; carries its block reason.
    Blocked(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gemini returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response had no text (finish reason: {0})")]
    EmptyResponse(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_completion(self) -> Result<Completion, LlmError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Ok(Completion::Blocked(reason));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(LlmError::EmptyResponse("no candidates".into()));
        };
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(LlmError::EmptyResponse(reason));
        }
        Ok(Completion::Text(text))
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: Client, config: &GeminiConfig, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError> {
        let body = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: prompt.parts().iter().map(|p| RequestPart { text: p }).collect(),
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
            safety_settings: BLOCKED_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: BLOCK_THRESHOLD,
                })
                .collect(),
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed.into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Path, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    fn turns(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { MessageRole::User } else { MessageRole::Assistant };
                ChatMessage::new(role, format!("turn {i}"))
            })
            .collect()
    }

    #[test]
    fn prompt_keeps_only_last_five_turns() {
        let prompt = Prompt::build(&turns(8), "where is it?");
        let parts = prompt.parts();

        assert_eq!(parts.len(), 1 + HISTORY_WINDOW + 1);
        assert_eq!(parts[0], PERSONA);
        assert_eq!(parts[1], "Assistant: turn 3\n");
        assert_eq!(parts[5], "Assistant: turn 7\n");
        assert_eq!(parts[6], "User: where is it?\nAssistant: ");
        assert!(!prompt.text().contains("turn 2"));
    }

    #[test]
    fn prompt_with_short_history() {
        let prompt = Prompt::build(&turns(2), "hello");
        assert_eq!(
            prompt.parts(),
            &[
                PERSONA.to_string(),
                "User: turn 0\n".to_string(),
                "Assistant: turn 1\n".to_string(),
                "User: hello\nAssistant: ".to_string(),
            ]
        );
    }

    #[test]
    fn block_reason_wins_over_candidates() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"},
            "candidates": []
        }))
        .unwrap();
        assert_eq!(resp.into_completion().unwrap(), Completion::Blocked("SAFETY".into()));
    }

    #[test]
    fn candidate_without_text_is_an_error() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(matches!(resp.into_completion(), Err(LlmError::EmptyResponse(r)) if r == "SAFETY"));
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base: String) -> GeminiClient {
        let config = GeminiConfig {
            api_key: Some("test-key".into()),
            model: "test-model".into(),
            api_base: base,
        };
        GeminiClient::new(Client::new(), &config, "test-key")
    }

    #[tokio::test]
    async fn sends_fixed_generation_settings_and_returns_text() {
        let seen: Arc<Mutex<Option<(String, String, Value)>>> = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/v1beta/models/{call}",
            post(move |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *captured.lock().unwrap() = Some((call, key, body));
                    Json(json!({
                        "candidates": [{
                            "content": {"role": "model", "parts": [{"text": "Happy "}, {"text": "to help!"}]},
                            "finishReason": "STOP"
                        }]
                    }))
                }
            }),
        );
        let client = client_for(serve(app).await);

        let completion = client.generate(&Prompt::build(&[], "hi")).await.unwrap();
        assert_eq!(completion, Completion::Text("Happy to help!".into()));

        let (call, key, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(call, "test-model:generateContent");
        assert_eq!(key, "test-key");
        assert_eq!(body["generationConfig"]["temperature"].as_f64().map(|t| (t * 10.0).round()), Some(7.0));
        assert_eq!(body["generationConfig"]["topK"], 1);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "User: hi\nAssistant: ");
    }

    #[tokio::test]
    async fn upstream_error_status_is_reported() {
        let app = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let client = client_for(serve(app).await);

        match client.generate(&Prompt::build(&[], "hi")).await {
            Err(LlmError::Status { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_an_error() {
        let app = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async { (StatusCode::OK, "<html>gateway page</html>") }),
        );
        let client = client_for(serve(app).await);

        match client.generate(&Prompt::build(&[], "hi")).await {
            Err(LlmError::Transport(e)) => assert!(e.is_decode()),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
