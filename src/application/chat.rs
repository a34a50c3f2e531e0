use crate::application::prompts::{
    chat_system_prompt, enhance_message, extract_concepts, extract_topic, history_context, with_persona,
};
use crate::domain::entities::activity::{ActivityLog, AI_MESSAGE};
use crate::domain::entities::chat::{ChatReply, ChatRequest, LearningData, MessageKind};
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::ports::completion_port::{CompletionProvider, CompletionRequest};
use crate::domain::values::chat_mode::ChatMode;
use crate::domain::values::persona::find_persona;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub const CHAT_MAX_TOKENS: u32 = 1000;
const HISTORY_WINDOW: usize = 5;

/// One conversational turn with the user's assistant.
pub struct ChatUseCase {
    provider: Arc<dyn CompletionProvider>,
    accounts: Arc<dyn AccountRepository>,
}

impl ChatUseCase {
    pub fn new(provider: Arc<dyn CompletionProvider>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { provider, accounts }
    }

    pub async fn execute(&self, user_id: Option<&str>, request: ChatRequest) -> Result<ChatReply, DomainError> {
        if request.message.trim().is_empty() {
            return Err(DomainError::InvalidInput("Message must not be empty".to_string()));
        }

        let account = match user_id {
            Some(id) => self.accounts.get_profile(id)?,
            None => None,
        };
        // The custom name belongs to the saved assistant, not to an override.
        let (persona, custom_name) = match request.assistant.as_deref() {
            Some(name) => (find_persona(name), None),
            None => (
                account
                    .as_ref()
                    .and_then(|a| a.selected_ai_assistant.as_deref())
                    .and_then(find_persona),
                account.as_ref().and_then(|a| a.custom_ai_name.as_deref()),
            ),
        };

        let system = with_persona(chat_system_prompt(request.mode), persona, custom_name);
        let prompt = format!(
            "Previous conversation:\n{}\n\nCurrent message: {}",
            history_context(&request.history, HISTORY_WINDOW),
            enhance_message(&request.message, request.mode)
        );

        let text = self
            .provider
            .complete(&CompletionRequest::new(system, prompt, CHAT_MAX_TOKENS))
            .await
            .map_err(DomainError::Ai)?;

        let learning_data = (request.mode == ChatMode::Learning).then(|| {
            let learning_turns = request
                .history
                .iter()
                .filter(|m| m.kind == Some(MessageKind::Learning))
                .count() as u32;
            LearningData {
                id: uuid::Uuid::new_v4().to_string(),
                topic: extract_topic(&request.message),
                progress: ((learning_turns + 1) * 10).min(100),
                concepts: extract_concepts(&text),
                timestamp: Utc::now(),
            }
        });

        if let Some(id) = user_id {
            let log = ActivityLog::new(
                id,
                AI_MESSAGE,
                Some(json!({
                    "mode": request.mode.to_string(),
                    "assistant": persona.map(|p| p.name),
                    "provider": self.provider.name(),
                })),
            );
            // Logging failures don't fail the turn.
            if let Err(e) = self.accounts.log_activity(&log) {
                warn!(user_id = id, error = %e, "failed to log chat activity");
            }
        }

        info!(mode = %request.mode, provider = self.provider.name(), "chat turn answered");
        Ok(ChatReply {
            response: text,
            learning_data,
        })
    }
}
