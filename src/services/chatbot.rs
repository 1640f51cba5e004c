use crate::{
    error::{AppError, AppResult},
    message::{ChatMessage, ChatResponse},
    services::{
        catalog::ProductCatalog,
        gemini::{Completion, CompletionClient, Prompt},
    },
};

pub const PRODUCT_KEYWORDS: [&str; 5] = ["product", "item", "price", "stock", "available"];
pub const ORDER_KEYWORDS: [&str; 4] = ["order", "tracking", "shipping", "delivery"];

pub const PRODUCTS_HEADER: &str = "Here are some products from our store:";
pub const ORDER_NUMBER_PROMPT: &str = "To check your order status, please provide your order number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Product,
    Order,
    Chat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Product => "product",
            Intent::Order => "order",
            Intent::Chat => "chat",
        }
    }
}

/// Product keywords are checked before order keywords; anything else goes to the model.
pub fn detect_intent(msg: &str) -> Intent {
    let msg_lower = msg.to_lowercase();

    if PRODUCT_KEYWORDS.iter().any(|k| msg_lower.contains(k)) {
        Intent::Product
    } else if ORDER_KEYWORDS.iter().any(|k| msg_lower.contains(k)) {
        Intent::Order
    } else {
        Intent::Chat
    }
}

pub async fn generate_reply(
    intent: Intent,
    user_msg: &str,
    history: &[ChatMessage],
    catalog: &dyn ProductCatalog,
    llm: &dyn CompletionClient,
) -> AppResult<ChatResponse> {
    match intent {
        Intent::Product => {
            let products = catalog
                .fetch_products()
                .await
                .map_err(|e| AppError::Catalog(e.to_string()))?;
            if products.is_empty() {
                return Err(AppError::Catalog("no products returned".into()));
            }
            Ok(ChatResponse::Product {
                message: PRODUCTS_HEADER.to_string(),
                products,
            })
        }

        Intent::Order => Ok(ChatResponse::OrderRequest {
            message: ORDER_NUMBER_PROMPT.to_string(),
        }),

        Intent::Chat => {
            let prompt = Prompt::build(history, user_msg);
            tracing::debug!(parts = prompt.parts().len(), "sending prompt to model");
            match llm.generate(&prompt).await {
                Ok(Completion::Text(message)) => Ok(ChatResponse::Chat { message }),
                Ok(Completion::Blocked(reason)) => Err(AppError::Blocked(reason)),
                Err(e) => Err(AppError::Generation(e.to_string())),
            }
        }
    }
}
