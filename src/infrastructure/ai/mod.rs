pub mod canned;
pub mod chat_completions;
