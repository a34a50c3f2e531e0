pub mod account;
pub mod activity;
pub mod admin;
pub mod chat;
pub mod conversation_memory;
pub mod learning;
pub mod learning_insight;
pub mod market;
pub mod market_insight;
pub mod shared_data;
pub mod trading_pattern;
pub mod training;
pub mod user_preference;
pub mod user_profile;
