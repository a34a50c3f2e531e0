//! Shared test helpers.
#![allow(dead_code)]

use std::sync::Arc;
use tradepilot::domain::entities::conversation_memory::NewConversationMemory;
use tradepilot::domain::values::sentiment::Sentiment;
use tradepilot::infrastructure::ai::canned::CannedProvider;
use tradepilot::TradePilot;

pub const CANNED_REPLY: &str = "RSI and support levels matter. Always manage risk with a stop loss.";

pub fn setup() -> TradePilot {
    setup_with_reply(CANNED_REPLY)
}

pub fn setup_with_reply(reply: &str) -> TradePilot {
    TradePilot::with_providers(":memory:", Arc::new(CannedProvider::with_reply(reply)), Some(42)).unwrap()
}

pub fn memory(user_id: &str, session_id: &str, topic: &str) -> NewConversationMemory {
    NewConversationMemory {
        user_id: user_id.to_string(),
        session_id: session_id.to_string(),
        topic: topic.to_string(),
        context: Default::default(),
        key_points: vec![],
        sentiment: Sentiment::Neutral,
        expires_at: None,
    }
}
