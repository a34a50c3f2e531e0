pub mod accounts;
pub mod admin;
pub mod ai_service;
pub mod chat;
pub mod knowledge_base;
pub mod learning_catalog;
pub mod learning_system;
pub mod market_data;
pub mod prompts;
pub mod shared_data;
pub mod training;
pub mod ttl_cache;
