mod common;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tradepilot::application::chat::CHAT_MAX_TOKENS;
use tradepilot::domain::entities::chat::{ChatMessage, ChatRequest, MessageKind, NewTradingInsight, RiskLevel, Role};
use tradepilot::domain::error::DomainError;
use tradepilot::domain::ports::completion_port::{CompletionProvider, CompletionRequest};
use tradepilot::domain::values::chat_mode::ChatMode;
use tradepilot::TradePilot;

/// Replies with a fixed text and keeps every request it saw.
#[derive(Default)]
struct RecordingProvider {
    seen: Mutex<Vec<CompletionRequest>>,
}

impl RecordingProvider {
    fn last(&self) -> CompletionRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, String> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(common::CANNED_REPLY.to_string())
    }
}

struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, String> {
        Err("upstream returned 503".to_string())
    }
}

fn recording_app() -> (TradePilot, Arc<RecordingProvider>) {
    let provider = Arc::new(RecordingProvider::default());
    let app = TradePilot::with_providers(":memory:", provider.clone(), Some(42)).unwrap();
    (app, provider)
}

fn request(message: &str, mode: ChatMode, history: Vec<ChatMessage>) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        mode,
        history,
        assistant: None,
    }
}

fn turn(role: Role, content: &str, kind: Option<MessageKind>) -> ChatMessage {
    ChatMessage {
        role,
        content: content.to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_chat_mode_has_no_learning_data() {
    let app = common::setup();
    let reply = app.chat(None, request("What is a limit order?", ChatMode::Chat, vec![])).await.unwrap();
    assert_eq!(reply.response, common::CANNED_REPLY);
    assert!(reply.learning_data.is_none());
}

#[tokio::test]
async fn test_learning_mode_tracks_topic_and_concepts() {
    let app = common::setup();
    let history = vec![
        turn(Role::User, "teach me", Some(MessageKind::Learning)),
        turn(Role::Assistant, "sure", Some(MessageKind::Learning)),
        turn(Role::User, "unrelated", Some(MessageKind::General)),
    ];
    let reply = app
        .chat(None, request("Explain risk management basics", ChatMode::Learning, history))
        .await
        .unwrap();

    let data = reply.learning_data.unwrap();
    assert_eq!(data.topic, "Risk Management");
    assert_eq!(data.progress, 30);
    assert_eq!(data.concepts, vec!["stop loss"]);
}

#[tokio::test]
async fn test_learning_progress_caps_at_100() {
    let app = common::setup();
    let history = (0..12)
        .map(|_| turn(Role::User, "more", Some(MessageKind::Learning)))
        .collect();
    let reply = app.chat(None, request("hello", ChatMode::Learning, history)).await.unwrap();

    let data = reply.learning_data.unwrap();
    assert_eq!(data.progress, 100);
    assert_eq!(data.topic, "General Trading");
}

#[tokio::test]
async fn test_prompt_carries_recent_history_and_mode() {
    let (app, provider) = recording_app();
    let history: Vec<ChatMessage> = (1..=7)
        .map(|i| {
            let role = if i % 2 == 1 { Role::User } else { Role::Assistant };
            turn(role, &format!("message {i}"), None)
        })
        .collect();

    app.chat(None, request("Should I buy TSLA?", ChatMode::Trading, history))
        .await
        .unwrap();

    let sent = provider.last();
    assert_eq!(sent.max_tokens, CHAT_MAX_TOKENS);
    assert!(sent.system.starts_with("You are a professional trading analyst."));
    assert!(!sent.prompt.contains("message 2"));
    assert!(sent.prompt.contains("User: message 3"));
    assert!(sent.prompt.contains("Assistant: message 6"));
    assert!(sent.prompt.contains("Current message: Trading Mode - Should I buy TSLA?"));
}

#[tokio::test]
async fn test_account_persona_shapes_system_prompt() {
    let (app, provider) = recording_app();
    app.accounts().create_profile("u1", "u1@example.com", None).unwrap();
    app.accounts().select_assistant("u1", "oracle").unwrap();
    app.accounts()
        .update_profile("u1", None, Some("Athena".into()))
        .unwrap();

    app.chat(Some("u1"), request("hi", ChatMode::Chat, vec![])).await.unwrap();
    let system = provider.last().system;
    assert!(system.contains("Your name is Athena."));
    assert!(system.contains("Wise, thoughtful, and comprehensive"));

    // An explicit assistant in the request wins over the saved one.
    let mut req = request("hi", ChatMode::Chat, vec![]);
    req.assistant = Some("Sentinel".into());
    app.chat(Some("u1"), req).await.unwrap();
    let system = provider.last().system;
    assert!(!system.contains("Wise, thoughtful"));
    // The saved custom name stays with the saved assistant.
    assert!(system.contains("Your name is Sentinel."));
    assert!(!system.contains("Athena"));
}

#[tokio::test]
async fn test_known_user_turns_are_logged() {
    let app = common::setup();
    app.accounts().create_profile("u1", "u1@example.com", None).unwrap();

    app.chat(Some("u1"), request("hi", ChatMode::Trading, vec![])).await.unwrap();
    app.chat(None, request("hi", ChatMode::Chat, vec![])).await.unwrap();

    let logs = app.accounts().list_activity(None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].activity_type, "ai_message");
    let data = logs[0].activity_data.as_ref().unwrap();
    assert_eq!(data["mode"], "trading");
    assert_eq!(data["provider"], "canned");
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let app = common::setup();
    let err = app.chat(None, request("   ", ChatMode::Chat, vec![])).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
async fn test_provider_failure_is_ai_error() {
    let app = TradePilot::with_providers(":memory:", Arc::new(FailingProvider), Some(42)).unwrap();
    let err = app.chat(None, request("hi", ChatMode::Chat, vec![])).await.unwrap_err();
    assert!(matches!(err, DomainError::Ai(_)));

    let err = app.ai().generate_response("hi", ChatMode::Chat).await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_generate_response_uses_short_budget() {
    let (app, provider) = recording_app();
    let text = app.ai().generate_response("Define beta", ChatMode::Learning).await.unwrap();
    assert_eq!(text, common::CANNED_REPLY);

    let sent = provider.last();
    assert_eq!(sent.max_tokens, 800);
    assert_eq!(sent.prompt, "Define beta");
    assert!(sent.system.starts_with("You are a patient trading educator."));
}

#[test]
fn test_learning_sessions_merge_concepts() {
    let app = common::setup();
    let ai = app.ai();
    ai.update_learning_progress("u1", "Options Trading", &["volatility".into(), "volatility".into()])
        .unwrap();
    let session = ai
        .update_learning_progress("u1", "Options Trading", &["volatility".into(), "stop loss".into()])
        .unwrap();

    assert_eq!(session.interactions, 2);
    assert_eq!(session.progress, 20);
    assert_eq!(session.concepts, vec!["volatility", "stop loss"]);
    assert_eq!(ai.get_learning_progress("u1").unwrap().len(), 1);
    assert!(ai.get_learning_progress("u2").unwrap().is_empty());
}

#[test]
fn test_trading_insights_roll_over() {
    let app = common::setup();
    let ai = app.ai();
    for i in 0..105 {
        ai.add_trading_insight(NewTradingInsight {
            symbol: Some("SPY".into()),
            analysis: format!("note {i}"),
            confidence: 60.0,
            timeframe: "1w".into(),
            risk_level: RiskLevel::Medium,
        })
        .unwrap();
    }

    let recent = ai.get_recent_insights(3).unwrap();
    let notes: Vec<&str> = recent.iter().map(|i| i.analysis.as_str()).collect();
    assert_eq!(notes, vec!["note 104", "note 103", "note 102"]);
    assert_eq!(ai.get_recent_insights(500).unwrap().len(), 100);

    let bad = ai.add_trading_insight(NewTradingInsight {
        symbol: None,
        analysis: "x".into(),
        confidence: 120.0,
        timeframe: "1d".into(),
        risk_level: RiskLevel::High,
    });
    assert!(matches!(bad, Err(DomainError::InvalidInput(_))));
}

#[tokio::test]
async fn test_offline_provider_from_config() {
    let app = TradePilot::new(&tradepilot::config::Config::for_tests()).unwrap();
    let reply = app.chat(None, request("ping", ChatMode::Chat, vec![])).await.unwrap();
    assert!(reply.response.starts_with("[offline] Previous conversation:"));
    assert!(reply.response.ends_with("Current message: ping"));
}
