// src/state.rs
use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::services::catalog::{ProductCatalog, ShopifyClient};
use crate::services::gemini::{CompletionClient, GeminiClient};
use crate::services::usage::UsageCounters;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub catalog: Arc<dyn ProductCatalog>,
    /// `None` when no model API key is configured.
    pub llm: Option<Arc<dyn CompletionClient>>,
    pub usage: UsageCounters,
}

impl AppState {
    pub fn new(catalog: Arc<dyn ProductCatalog>, llm: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            catalog,
            llm,
            usage: UsageCounters::new(),
        }
    }

    /// Builds both adapters on one shared HTTP client.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;

        let catalog = Arc::new(ShopifyClient::new(http.clone(), &config.shopify));
        let llm = config.gemini.api_key.as_deref().map(|key| {
            Arc::new(GeminiClient::new(http.clone(), &config.gemini, key)) as Arc<dyn CompletionClient>
        });
        if llm.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; chat requests will fail");
        }

        Ok(Self::new(catalog, llm))
    }
}
