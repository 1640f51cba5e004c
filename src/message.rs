// src/message.rs
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    // the web widget records its own turns as "bot"
    #[serde(alias = "bot")]
    Assistant,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub message: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, message: impl Into<String>) -> Self {
        Self { role, message: message.into() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<ChatMessage>,
}

// `"history": null` means the same as leaving the field out.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChatMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<ChatMessage>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Product {
    pub title: String,
    pub price: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Chat,
    Product,
    OrderRequest,
    Error,
}

/// Body of every `/api/chat` answer, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatResponse {
    Chat { message: String },
    Product { message: String, products: Vec<Product> },
    OrderRequest { message: String },
    Error { message: String },
}

impl ChatResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            ChatResponse::Chat { .. } => ResponseKind::Chat,
            ChatResponse::Product { .. } => ResponseKind::Product,
            ChatResponse::OrderRequest { .. } => ResponseKind::OrderRequest,
            ChatResponse::Error { .. } => ResponseKind::Error,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChatResponse::Chat { message }
            | ChatResponse::Product { message, .. }
            | ChatResponse::OrderRequest { message }
            | ChatResponse::Error { message } => message,
        }
    }
}
