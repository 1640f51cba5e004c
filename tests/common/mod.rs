#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use storefront_chat::message::Product;
use storefront_chat::services::catalog::{CatalogError, ProductCatalog};
use storefront_chat::services::gemini::{Completion, CompletionClient, LlmError, Prompt};
use storefront_chat::state::{AppState, SharedState};

pub enum MockCatalog {
    Products(Vec<Product>),
    Fails,
    Panics,
}

#[async_trait]
impl ProductCatalog for MockCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        match self {
            MockCatalog::Products(p) => Ok(p.clone()),
            MockCatalog::Fails => Err(CatalogError::Status {
                status: 503,
                body: "upstream down".into(),
            }),
            MockCatalog::Panics => panic!("catalog exploded"),
        }
    }
}

#[derive(Clone)]
pub enum MockReply {
    Text(&'static str),
    Blocked(&'static str),
    Fails,
}

/// Records every prompt it receives.
pub struct MockLlm {
    reply: MockReply,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl MockLlm {
    pub fn new(reply: MockReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockLlm {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.reply {
            MockReply::Text(t) => Ok(Completion::Text(t.to_string())),
            MockReply::Blocked(r) => Ok(Completion::Blocked(r.to_string())),
            MockReply::Fails => Err(LlmError::Status {
                status: 500,
                body: "internal".into(),
            }),
        }
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product { title: "Canvas Tote".into(), price: "24.00".into() },
        Product { title: "Enamel Mug".into(), price: "12.50".into() },
    ]
}

pub fn state_with(catalog: MockCatalog, llm: Option<Arc<MockLlm>>) -> SharedState {
    let llm = llm.map(|l| l as Arc<dyn CompletionClient>);
    Arc::new(AppState::new(Arc::new(catalog), llm))
}
