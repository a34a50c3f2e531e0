//! Prompt text and keyword extraction for assistant replies.

use crate::domain::entities::chat::{ChatMessage, Role};
use crate::domain::values::chat_mode::ChatMode;
use crate::domain::values::persona::Persona;

pub const GENERAL_TOPIC: &str = "General Trading";
const MAX_EXTRACTED_CONCEPTS: usize = 5;

const TOPICS: [&str; 9] = [
    "Technical Analysis",
    "Risk Management",
    "Options Trading",
    "Market Psychology",
    "Fundamental Analysis",
    "Day Trading",
    "Swing Trading",
    "Cryptocurrency",
    "Forex Trading",
];

const CONCEPTS: [&str; 10] = [
    "support and resistance",
    "moving averages",
    "candlestick patterns",
    "volume analysis",
    "trend lines",
    "risk-reward ratio",
    "stop loss",
    "position sizing",
    "market sentiment",
    "volatility",
];

/// System prompt for a full chat turn.
pub fn chat_system_prompt(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Chat => "You are an intelligent AI trading assistant with deep knowledge of financial markets, trading strategies, and investment principles. You are helpful, professional, and educational. Always provide accurate information and remind users that trading involves risks.",
        ChatMode::Learning => "You are an expert trading educator. Your role is to teach trading concepts from basics to advanced levels. Break down complex topics into digestible lessons, provide examples, and adapt your teaching style to the user's level. Track learning progress and suggest next steps. Always encourage questions and provide practical examples.",
        ChatMode::Trading => "You are a professional trading analyst. Provide market analysis, trading strategies, and risk management advice. Be specific about entry/exit points when discussing trades, but always emphasize risk management. Stay current with market trends and provide actionable insights while reminding users to do their own research.",
    }
}

/// Shorter prompt used for one-off generations outside a conversation.
pub fn service_system_prompt(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Chat => "You are an intelligent AI trading assistant. Provide helpful, accurate information about trading and finance. Always remind users about risks.",
        ChatMode::Learning => "You are a patient trading educator. Adapt your teaching to the user's level. Break complex concepts into simple steps. Encourage questions and provide examples.",
        ChatMode::Trading => "You are a professional trading analyst. Provide specific, actionable insights while emphasizing risk management. Be clear about assumptions and limitations.",
    }
}

/// Appends the selected persona (and the name the user gave it) to `base`.
pub fn with_persona(base: &str, persona: Option<&Persona>, custom_name: Option<&str>) -> String {
    let mut prompt = base.to_string();
    if let Some(p) = persona {
        let name = custom_name.filter(|n| !n.trim().is_empty()).unwrap_or(p.name);
        prompt.push_str(&format!(
            "\n\nYour name is {name}. {} Personality: {}. Strengths: {}.",
            p.description,
            p.personality,
            p.strengths.join(", ")
        ));
    } else if let Some(name) = custom_name.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("\n\nYour name is {name}."));
    }
    prompt
}

pub fn enhance_message(message: &str, mode: ChatMode) -> String {
    match mode {
        ChatMode::Chat => message.to_string(),
        ChatMode::Learning => format!(
            "Learning Mode - {message}\n\nContext: This is a learning session. Please provide educational content, break down concepts clearly, and suggest follow-up topics. If this seems like a new topic, start with fundamentals."
        ),
        ChatMode::Trading => format!(
            "Trading Mode - {message}\n\nContext: This is a trading consultation. Provide actionable insights, market analysis, and specific strategies while emphasizing risk management."
        ),
    }
}

/// The last `limit` messages as "User:"/"Assistant:" lines.
pub fn history_context(history: &[ChatMessage], limit: usize) -> String {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First known topic mentioned in the message.
pub fn extract_topic(message: &str) -> String {
    let lower = message.to_lowercase();
    TOPICS
        .iter()
        .find(|t| lower.contains(&t.to_lowercase()))
        .unwrap_or(&GENERAL_TOPIC)
        .to_string()
}

/// Known concepts that appear in `text`, in catalog order.
pub fn extract_concepts(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    CONCEPTS
        .iter()
        .filter(|c| lower.contains(*c))
        .take(MAX_EXTRACTED_CONCEPTS)
        .map(|c| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::persona::find_persona;

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            kind: None,
        }
    }

    #[test]
    fn test_extract_topic() {
        assert_eq!(extract_topic("Explain RISK MANAGEMENT please"), "Risk Management");
        assert_eq!(extract_topic("what is a stock?"), GENERAL_TOPIC);
        // First in catalog order wins.
        assert_eq!(
            extract_topic("day trading vs technical analysis"),
            "Technical Analysis"
        );
    }

    #[test]
    fn test_extract_concepts_caps_at_five() {
        let text = "Volatility, stop loss, position sizing, trend lines, volume analysis, moving averages and market sentiment.";
        let found = extract_concepts(text);
        assert_eq!(found.len(), 5);
        assert_eq!(found[0], "moving averages");
    }

    #[test]
    fn test_history_context_keeps_last_messages() {
        let history: Vec<ChatMessage> = (0..7)
            .map(|i| msg(if i % 2 == 0 { Role::User } else { Role::Assistant }, &format!("m{i}")))
            .collect();
        let ctx = history_context(&history, 5);
        assert_eq!(ctx.lines().count(), 5);
        assert!(ctx.starts_with("User: m2"));
        assert!(ctx.ends_with("User: m6"));
    }

    #[test]
    fn test_persona_prompt_prefers_custom_name() {
        let p = find_persona("sentinel");
        let prompt = with_persona("base", p, Some("Max"));
        assert!(prompt.starts_with("base"));
        assert!(prompt.contains("Your name is Max."));
        assert!(prompt.contains("Risk management"));

        assert_eq!(with_persona("base", None, None), "base");
    }

    #[test]
    fn test_enhance_message_by_mode() {
        assert_eq!(enhance_message("hi", ChatMode::Chat), "hi");
        assert!(enhance_message("hi", ChatMode::Learning).starts_with("Learning Mode - hi"));
        assert!(enhance_message("hi", ChatMode::Trading).starts_with("Trading Mode - hi"));
    }
}
