use crate::application::prompts::service_system_prompt;
use crate::domain::entities::chat::{LearningSession, NewTradingInsight, TradingInsight};
use crate::domain::error::DomainError;
use crate::domain::ports::completion_port::{CompletionProvider, CompletionRequest};
use crate::domain::values::chat_mode::ChatMode;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub const SERVICE_MAX_TOKENS: u32 = 800;
pub const DEFAULT_INSIGHT_LIMIT: usize = 10;
const MAX_INSIGHTS: usize = 100;
const PROGRESS_PER_INTERACTION: u32 = 10;

#[derive(Default)]
struct ServiceState {
    sessions: HashMap<String, Vec<LearningSession>>,
    insights: VecDeque<TradingInsight>,
}

/// Standalone generations plus per-user learning sessions and a rolling
/// log of trading insights.
pub struct AiTradingService {
    provider: Arc<dyn CompletionProvider>,
    state: Mutex<ServiceState>,
}

impl AiTradingService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(ServiceState::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServiceState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Store(format!("ai service: {e}")))
    }

    pub async fn generate_response(&self, message: &str, mode: ChatMode) -> Result<String, DomainError> {
        let request = CompletionRequest::new(service_system_prompt(mode), message, SERVICE_MAX_TOKENS);
        self.provider
            .complete(&request)
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to generate AI response: {e}")))
    }

    /// Records one interaction on `topic`, merging newly seen concepts.
    pub fn update_learning_progress(
        &self,
        user_id: &str,
        topic: &str,
        concepts: &[String],
    ) -> Result<LearningSession, DomainError> {
        let mut st = self.lock()?;
        let sessions = st.sessions.entry(user_id.to_string()).or_default();
        let now = Utc::now();

        if let Some(session) = sessions.iter_mut().find(|s| s.topic == topic) {
            for concept in concepts {
                if !session.concepts.contains(concept) {
                    session.concepts.push(concept.clone());
                }
            }
            session.interactions += 1;
            session.progress = (session.interactions * PROGRESS_PER_INTERACTION).min(100);
            session.last_activity = now;
            return Ok(session.clone());
        }

        let mut unique: Vec<String> = Vec::with_capacity(concepts.len());
        for concept in concepts {
            if !unique.contains(concept) {
                unique.push(concept.clone());
            }
        }
        let session = LearningSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            concepts: unique,
            progress: PROGRESS_PER_INTERACTION,
            interactions: 1,
            started_at: now,
            last_activity: now,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    pub fn get_learning_progress(&self, user_id: &str) -> Result<Vec<LearningSession>, DomainError> {
        Ok(self.lock()?.sessions.get(user_id).cloned().unwrap_or_default())
    }

    pub fn add_trading_insight(&self, insight: NewTradingInsight) -> Result<TradingInsight, DomainError> {
        if !(0.0..=100.0).contains(&insight.confidence) {
            return Err(DomainError::InvalidInput(format!(
                "Confidence must be between 0 and 100, got {}",
                insight.confidence
            )));
        }
        let stored = TradingInsight {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: insight.symbol,
            analysis: insight.analysis,
            confidence: insight.confidence,
            timeframe: insight.timeframe,
            risk_level: insight.risk_level,
            generated_at: Utc::now(),
        };

        let mut st = self.lock()?;
        st.insights.push_back(stored.clone());
        while st.insights.len() > MAX_INSIGHTS {
            st.insights.pop_front();
        }
        Ok(stored)
    }

    /// Newest first.
    pub fn get_recent_insights(&self, limit: usize) -> Result<Vec<TradingInsight>, DomainError> {
        Ok(self.lock()?.insights.iter().rev().take(limit).cloned().collect())
    }
}
