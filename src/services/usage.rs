//! Process-wide counters of classified intents and response kinds.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::message::ResponseKind;
use crate::services::chatbot::Intent;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IntentUsage {
    pub product: u64,
    pub order: u64,
    pub chat: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseUsage {
    pub chat: u64,
    pub product: u64,
    pub order_request: u64,
    pub error: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub intents: IntentUsage,
    pub responses: ResponseUsage,
}

#[derive(Debug, Default)]
pub struct UsageCounters {
    intents: [AtomicU64; 3],
    responses: [AtomicU64; 4],
}

impl UsageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_intent(&self, intent: Intent) {
        let slot = match intent {
            Intent::Product => 0,
            Intent::Order => 1,
            Intent::Chat => 2,
        };
        self.intents[slot].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response(&self, kind: ResponseKind) {
        let slot = match kind {
            ResponseKind::Chat => 0,
            ResponseKind::Product => 1,
            ResponseKind::OrderRequest => 2,
            ResponseKind::Error => 3,
        };
        self.responses[slot].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let read = |c: &AtomicU64| c.load(Ordering::Relaxed);
        UsageSnapshot {
            intents: IntentUsage {
                product: read(&self.intents[0]),
                order: read(&self.intents[1]),
                chat: read(&self.intents[2]),
            },
            responses: ResponseUsage {
                chat: read(&self.responses[0]),
                product: read(&self.responses[1]),
                order_request: read(&self.responses[2]),
                error: read(&self.responses[3]),
            },
        }
    }
}
