use crate::domain::entities::conversation_memory::{ConversationMemory, NewConversationMemory};
use crate::domain::entities::learning_insight::{InsightUpdate, LearningInsight};
use crate::domain::entities::market_insight::{MarketInsight, NewMarketInsight};
use crate::domain::entities::trading_pattern::{NewTradingPattern, PatternUpdate, TradingPattern};
use crate::domain::entities::user_preference::UserPreference;
use crate::domain::entities::user_profile::{ProfileUpdate, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::values::insight::{Impact, InsightType, Timeframe};
use crate::domain::values::pattern_type::PatternType;
use crate::domain::values::preference_category::PreferenceCategory;
use crate::domain::values::risk_tolerance::RiskTolerance;
use crate::domain::values::trading_experience::TradingExperience;
use crate::domain::values::understanding::Understanding;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

pub const DEMO_USER: &str = "demo-user";
/// Key for market insights that are not filed under a specific symbol.
pub const GENERAL_KEY: &str = "general";

const MAX_MEMORIES_PER_USER: usize = 50;
const RECENT_MEMORIES: usize = 10;
const MAX_INSIGHTS_PER_KEY: usize = 20;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub learning_topics: Vec<String>,
    pub trading_opportunities: Vec<String>,
    pub risk_alerts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemorySearch {
    pub conversations: Vec<ConversationMemory>,
    pub patterns: Vec<TradingPattern>,
    pub insights: Vec<MarketInsight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub total_conversations: usize,
    pub learning_progress: u32,
    pub trading_pattern_count: usize,
    pub risk_score: u32,
    pub engagement_score: u32,
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, UserProfile>,
    patterns: HashMap<String, Vec<TradingPattern>>,
    memories: HashMap<String, Vec<ConversationMemory>>,
    learning: HashMap<String, Vec<LearningInsight>>,
    market: HashMap<String, Vec<MarketInsight>>,
    preferences: HashMap<String, Vec<UserPreference>>,
}

/// Per-user profile, pattern, memory and insight records held in process memory.
pub struct KnowledgeBase {
    tables: RwLock<Tables>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// A knowledge base seeded with the demo trader.
    pub fn new() -> Self {
        let kb = Self::empty();
        if let Ok(mut t) = kb.tables.write() {
            seed_demo_data(&mut t);
        }
        kb
    }

    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables
            .read()
            .map_err(|e| DomainError::Store(format!("knowledge base: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables
            .write()
            .map_err(|e| DomainError::Store(format!("knowledge base: {e}")))
    }

    // Profiles

    pub fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.read()?.profiles.get(user_id).cloned())
    }

    pub fn update_user_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile, DomainError> {
        let mut t = self.write()?;
        let profile = t
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        profile.apply(update);
        Ok(profile.clone())
    }

    // Trading patterns

    pub fn get_trading_patterns(&self, user_id: &str) -> Result<Vec<TradingPattern>, DomainError> {
        Ok(self.read()?.patterns.get(user_id).cloned().unwrap_or_default())
    }

    pub fn add_trading_pattern(&self, new: NewTradingPattern) -> Result<TradingPattern, DomainError> {
        let pattern = TradingPattern::new(new);
        self.write()?
            .patterns
            .entry(pattern.user_id.clone())
            .or_default()
            .push(pattern.clone());
        Ok(pattern)
    }

    /// Returns `None` when the user has no pattern with that id.
    pub fn update_trading_pattern(
        &self,
        user_id: &str,
        pattern_id: &str,
        update: PatternUpdate,
    ) -> Result<Option<TradingPattern>, DomainError> {
        let mut t = self.write()?;
        let Some(pattern) = t
            .patterns
            .get_mut(user_id)
            .and_then(|ps| ps.iter_mut().find(|p| p.id == pattern_id))
        else {
            return Ok(None);
        };
        pattern.apply(update);
        Ok(Some(pattern.clone()))
    }

    // Conversation memory

    /// All memories of one session, or the most recent ones across sessions.
    pub fn get_conversation_memory(
        &self,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Vec<ConversationMemory>, DomainError> {
        let t = self.read()?;
        let memories = t.memories.get(user_id).map(Vec::as_slice).unwrap_or_default();
        Ok(match session_id {
            Some(sid) => memories.iter().filter(|m| m.session_id == sid).cloned().collect(),
            None => memories[memories.len().saturating_sub(RECENT_MEMORIES)..].to_vec(),
        })
    }

    pub fn add_conversation_memory(&self, new: NewConversationMemory) -> Result<ConversationMemory, DomainError> {
        let memory = ConversationMemory::new(new);
        let mut t = self.write()?;
        let memories = t.memories.entry(memory.user_id.clone()).or_default();
        memories.push(memory.clone());
        if memories.len() > MAX_MEMORIES_PER_USER {
            let excess = memories.len() - MAX_MEMORIES_PER_USER;
            memories.drain(..excess);
        }
        Ok(memory)
    }

    // Learning insights

    pub fn get_learning_insights(&self, user_id: &str) -> Result<Vec<LearningInsight>, DomainError> {
        Ok(self.read()?.learning.get(user_id).cloned().unwrap_or_default())
    }

    /// Upserts the insight for `concept`.
    pub fn update_learning_insight(
        &self,
        user_id: &str,
        concept: &str,
        update: InsightUpdate,
    ) -> Result<LearningInsight, DomainError> {
        let mut t = self.write()?;
        let insights = t.learning.entry(user_id.to_string()).or_default();
        let idx = match insights.iter().position(|i| i.concept == concept) {
            Some(idx) => idx,
            None => {
                insights.push(LearningInsight::new(user_id, concept));
                insights.len() - 1
            }
        };
        insights[idx].apply(update);
        Ok(insights[idx].clone())
    }

    // Market insights

    /// With a symbol: insights filed under it plus matching general ones.
    /// Without: everything, newest first.
    pub fn get_market_insights(&self, symbol: Option<&str>) -> Result<Vec<MarketInsight>, DomainError> {
        let t = self.read()?;
        Ok(match symbol {
            Some(sym) => {
                let mut out = t.market.get(sym).cloned().unwrap_or_default();
                if sym != GENERAL_KEY {
                    if let Some(general) = t.market.get(GENERAL_KEY) {
                        out.extend(general.iter().filter(|i| i.symbol == sym).cloned());
                    }
                }
                out
            }
            None => {
                let mut all: Vec<MarketInsight> = t.market.values().flatten().cloned().collect();
                all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                all
            }
        })
    }

    pub fn add_market_insight(&self, new: NewMarketInsight) -> Result<MarketInsight, DomainError> {
        let insight = MarketInsight::new(new);
        let key = if insight.symbol.is_empty() {
            GENERAL_KEY.to_string()
        } else {
            insight.symbol.clone()
        };
        let mut t = self.write()?;
        let insights = t.market.entry(key).or_default();
        insights.push(insight.clone());
        if insights.len() > MAX_INSIGHTS_PER_KEY {
            let excess = insights.len() - MAX_INSIGHTS_PER_KEY;
            insights.drain(..excess);
        }
        Ok(insight)
    }

    // Preferences

    pub fn get_user_preferences(
        &self,
        user_id: &str,
        category: Option<PreferenceCategory>,
    ) -> Result<Vec<UserPreference>, DomainError> {
        let t = self.read()?;
        let prefs = t.preferences.get(user_id).map(Vec::as_slice).unwrap_or_default();
        Ok(prefs
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect())
    }

    /// Upserts by (category, key).
    pub fn set_user_preference(
        &self,
        user_id: &str,
        category: PreferenceCategory,
        key: &str,
        value: serde_json::Value,
    ) -> Result<UserPreference, DomainError> {
        let pref = UserPreference::new(user_id, category, key, value);
        let mut t = self.write()?;
        let prefs = t.preferences.entry(user_id.to_string()).or_default();
        match prefs.iter_mut().find(|p| p.category == category && p.key == key) {
            Some(existing) => *existing = pref.clone(),
            None => prefs.push(pref.clone()),
        }
        Ok(pref)
    }

    // Derived views

    pub fn get_personalized_recommendations(&self, user_id: &str) -> Result<Recommendations, DomainError> {
        let profile = self.get_user_profile(user_id)?;
        let patterns = self.get_trading_patterns(user_id)?;
        let insights = self.get_learning_insights(user_id)?;

        let mut learning_topics = Vec::new();
        for insight in &insights {
            if insight.understanding.needs_work() {
                learning_topics.push(format!("Improve {} understanding", insight.concept));
            }
            learning_topics.extend(insight.recommended_actions.iter().cloned());
        }

        let mut trading_opportunities = Vec::new();
        if let Some(profile) = &profile {
            for asset in &profile.preferred_assets {
                for insight in self.get_market_insights(Some(asset))? {
                    if insight.confidence > 70.0 && insight.impact != Impact::Low {
                        trading_opportunities.push(format!("{asset}: {}", insight.title));
                    }
                }
            }
        }

        let risk_alerts: Vec<String> = patterns
            .iter()
            .filter(|p| p.success_rate < 50.0)
            .map(|p| format!("Review {} - low success rate", p.description))
            .collect();

        learning_topics.truncate(5);
        trading_opportunities.truncate(5);
        let risk_alerts = risk_alerts.into_iter().take(3).collect();

        Ok(Recommendations {
            learning_topics,
            trading_opportunities,
            risk_alerts,
        })
    }

    /// Case-insensitive substring search over a user's recent memories,
    /// their patterns and all market insights.
    pub fn search_memory(&self, user_id: &str, query: &str) -> Result<MemorySearch, DomainError> {
        let q = query.to_lowercase();

        let conversations = self
            .get_conversation_memory(user_id, None)?
            .into_iter()
            .filter(|c| c.mentions(&q))
            .collect();

        let patterns = self
            .get_trading_patterns(user_id)?
            .into_iter()
            .filter(|p| {
                p.description.to_lowercase().contains(&q)
                    || p.examples.iter().any(|e| e.to_lowercase().contains(&q))
            })
            .collect();

        let insights = self
            .get_market_insights(None)?
            .into_iter()
            .filter(|i| i.mentions(&q))
            .collect();

        Ok(MemorySearch {
            conversations,
            patterns,
            insights,
        })
    }

    pub fn get_user_analytics(&self, user_id: &str) -> Result<UserAnalytics, DomainError> {
        let conversations = self.get_conversation_memory(user_id, None)?;
        let patterns = self.get_trading_patterns(user_id)?;
        let insights = self.get_learning_insights(user_id)?;

        let learning_progress = if insights.is_empty() {
            0.0
        } else {
            let total: u32 = insights.iter().map(|i| i.understanding.score()).sum();
            total as f64 / (insights.len() as f64 * 4.0)
        };

        let risk_patterns: Vec<&TradingPattern> = patterns
            .iter()
            .filter(|p| p.pattern_type == PatternType::RiskManagement)
            .collect();
        let risk_score = risk_patterns.iter().map(|p| p.success_rate).sum::<f64>()
            / risk_patterns.len().max(1) as f64;

        let engagement = (conversations.len() as f64 / 10.0).min(1.0) * 100.0;

        debug!(user_id, conversations = conversations.len(), "computed user analytics");

        Ok(UserAnalytics {
            total_conversations: conversations.len(),
            learning_progress: (learning_progress * 100.0).round() as u32,
            trading_pattern_count: patterns.len(),
            risk_score: risk_score.round() as u32,
            engagement_score: engagement.round() as u32,
        })
    }
}

fn seed_demo_data(t: &mut Tables) {
    let now = Utc::now();

    t.profiles.insert(
        DEMO_USER.to_string(),
        UserProfile {
            id: DEMO_USER.to_string(),
            name: Some("Demo Trader".to_string()),
            email: Some("demo@example.com".to_string()),
            trading_experience: TradingExperience::Intermediate,
            risk_tolerance: RiskTolerance::Moderate,
            preferred_assets: strings(&["AAPL", "GOOGL", "TSLA", "SPY"]),
            trading_goals: strings(&["Long-term growth", "Income generation", "Risk management"]),
            timezone: "America/New_York".to_string(),
            created_at: now,
            updated_at: now,
        },
    );

    t.patterns.insert(
        DEMO_USER.to_string(),
        vec![
            TradingPattern {
                id: "pattern-1".to_string(),
                user_id: DEMO_USER.to_string(),
                pattern_type: PatternType::Entry,
                description: "Tends to buy on RSI oversold conditions with volume confirmation".to_string(),
                frequency: 15,
                success_rate: 68.0,
                avg_return: 4.2,
                conditions: HashMap::from([
                    ("rsi".to_string(), serde_json::json!("< 30")),
                    ("volume".to_string(), serde_json::json!("> avg_volume * 1.5")),
                ]),
                examples: strings(&[
                    "AAPL entry at $170 when RSI hit 28",
                    "TSLA entry at $240 with high volume",
                ]),
                created_at: now,
            },
            TradingPattern {
                id: "pattern-2".to_string(),
                user_id: DEMO_USER.to_string(),
                pattern_type: PatternType::RiskManagement,
                description: "Consistently uses 2% position sizing rule".to_string(),
                frequency: 95,
                success_rate: 85.0,
                avg_return: 0.0,
                conditions: HashMap::from([(
                    "position_size".to_string(),
                    serde_json::json!("2% of portfolio"),
                )]),
                examples: strings(&["Never risks more than $2000 on $100k portfolio"]),
                created_at: now,
            },
        ],
    );

    t.learning.insert(
        DEMO_USER.to_string(),
        vec![
            LearningInsight {
                id: "insight-1".to_string(),
                user_id: DEMO_USER.to_string(),
                concept: "Technical Analysis".to_string(),
                understanding: Understanding::Good,
                struggling_areas: strings(&["Elliott Wave Theory", "Fibonacci retracements"]),
                strengths: strings(&["Support/Resistance", "Moving Averages", "RSI"]),
                recommended_actions: strings(&[
                    "Practice Elliott Wave patterns",
                    "Study Fibonacci applications",
                ]),
                last_assessed: now,
            },
            LearningInsight {
                id: "insight-2".to_string(),
                user_id: DEMO_USER.to_string(),
                concept: "Risk Management".to_string(),
                understanding: Understanding::Excellent,
                struggling_areas: vec![],
                strengths: strings(&["Position sizing", "Stop losses", "Diversification"]),
                recommended_actions: strings(&["Explore advanced hedging strategies"]),
                last_assessed: now,
            },
        ],
    );

    t.market.insert(
        GENERAL_KEY.to_string(),
        vec![
            MarketInsight {
                id: "market-1".to_string(),
                symbol: "AAPL".to_string(),
                insight_type: InsightType::Technical,
                title: "Strong Support at $170".to_string(),
                description: "AAPL has consistently bounced from the $170 level, showing strong institutional support".to_string(),
                confidence: 85.0,
                impact: Impact::Medium,
                timeframe: Timeframe::Short,
                tags: strings(&["support", "bounce", "institutional"]),
                created_at: now,
                valid_until: Some(now + Duration::days(7)),
            },
            MarketInsight {
                id: "market-2".to_string(),
                symbol: "TSLA".to_string(),
                insight_type: InsightType::Sentiment,
                title: "Bullish Sentiment on EV Growth".to_string(),
                description: "Increasing positive sentiment around electric vehicle adoption driving TSLA interest".to_string(),
                confidence: 72.0,
                impact: Impact::High,
                timeframe: Timeframe::Long,
                tags: strings(&["ev", "growth", "sentiment"]),
                created_at: now,
                valid_until: None,
            },
        ],
    );
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
