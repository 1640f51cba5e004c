//! Service configuration, read once at startup.

use std::{path::PathBuf, time::Duration};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2024-07";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Directory holding `index.html` and the widget assets.
    pub static_dir: PathBuf,
    pub gemini: GeminiConfig,
    pub shopify: ShopifyConfig,
    /// Total timeout for outbound calls. `None` leaves the client default (no timeout).
    pub http_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    pub access_token: Option<String>,
    /// Bare shop host, e.g. `my-store.myshopify.com`.
    pub shop_url: Option<String>,
    pub api_version: String,
}

impl AppConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable               | Default                                      |
    /// |------------------------|----------------------------------------------|
    /// | `BIND_ADDR`            | `0.0.0.0:3000`                               |
    /// | `STATIC_DIR`           | `static`                                     |
    /// | `GEMINI_API_KEY`       | unset                                        |
    /// | `GEMINI_MODEL`         | `gemini-1.5-flash`                           |
    /// | `GEMINI_API_BASE`      | `https://generativelanguage.googleapis.com`  |
    /// | `SHOPIFY_ACCESS_TOKEN` | unset                                        |
    /// | `SHOPIFY_SHOP_URL`     | unset                                        |
    /// | `SHOPIFY_API_VERSION`  | `2024-07`                                    |
    /// | `HTTP_TIMEOUT_SECS`    | unset                                        |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = get("HTTP_TIMEOUT_SECS").and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                tracing::warn!(value = %raw, "ignoring invalid HTTP_TIMEOUT_SECS");
                None
            }
        });

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".into()).into(),
            gemini: GeminiConfig {
                api_key: get("GEMINI_API_KEY"),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
                api_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.into()),
            },
            shopify: ShopifyConfig {
                access_token: get("SHOPIFY_ACCESS_TOKEN"),
                shop_url: get("SHOPIFY_SHOP_URL"),
                api_version: get("SHOPIFY_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_SHOPIFY_API_VERSION.into()),
            },
            http_timeout,
        }
    }
}
