//! Product lookup against the Shopify Admin REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ShopifyConfig;
use crate::message::Product;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("shop url not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("shopify returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}

#[derive(Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<ShopifyProduct>,
}

#[derive(Deserialize)]
struct ShopifyProduct {
    title: String,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
}

#[derive(Deserialize)]
struct ShopifyVariant {
    price: String,
}

#[derive(Clone, Debug)]
pub struct ShopifyClient {
    http: Client,
    /// `https://{shop}/admin/api/{version}`, or `None` when no shop is configured.
    base_url: Option<String>,
    access_token: Option<String>,
}

impl ShopifyClient {
    pub fn new(http: Client, config: &ShopifyConfig) -> Self {
        let base_url = config.shop_url.as_deref().map(|shop| {
            format!(
                "https://{}/admin/api/{}",
                shop.trim_end_matches('/'),
                config.api_version
            )
        });
        Self {
            http,
            base_url,
            access_token: config.access_token.clone(),
        }
    }

    /// Points the client at an arbitrary API root, e.g. a local stand-in.
    pub fn with_base_url(http: Client, base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            http,
            base_url: Some(base_url.into()),
            access_token,
        }
    }
}

#[async_trait]
impl ProductCatalog for ShopifyClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let base = self.base_url.as_deref().ok_or(CatalogError::NotConfigured)?;
        let url = format!("{base}/products.json");

        let mut req = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.access_token {
            req = req.header("X-Shopify-Access-Token", token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(CatalogError::Status { status, body });
        }

        let page: ProductsPage = resp.json().await?;
        tracing::debug!(count = page.products.len(), "fetched shopify products");
        Ok(to_products(page.products))
    }
}

// A product without variants has no price to show; it is left out.
fn to_products(products: Vec<ShopifyProduct>) -> Vec<Product> {
    products
        .into_iter()
        .filter_map(|p| match p.variants.into_iter().next() {
            Some(variant) => Some(Product {
                title: p.title,
                price: variant.price,
            }),
            None => {
                tracing::warn!(title = %p.title, "skipping product without variants");
                None
            }
        })
        .collect()
}
