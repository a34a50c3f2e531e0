pub mod analytics_range;
pub mod chat_mode;
pub mod difficulty;
pub mod history_period;
pub mod insight;
pub mod market_condition;
pub mod order_type;
pub mod pattern_type;
pub mod persona;
pub mod preference_category;
pub mod progress_status;
pub mod risk_tolerance;
pub mod sentiment;
pub mod trade_side;
pub mod trading_experience;
pub mod understanding;
