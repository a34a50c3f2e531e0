pub mod api;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::accounts::AccountService;
use crate::application::admin::AdminService;
use crate::application::ai_service::AiTradingService;
use crate::application::chat::ChatUseCase;
use crate::application::knowledge_base::KnowledgeBase;
use crate::application::learning_system::LearningSystem;
use crate::application::market_data::MarketDataService;
use crate::application::shared_data::SharedDataStore;
use crate::application::training::TrainingService;
use crate::config::{AiProvider, Config};
use crate::domain::entities::chat::{ChatReply, ChatRequest};
use crate::domain::entities::shared_data::SharedData;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::AccountRepository;
use crate::domain::ports::admin_repository::AdminRepository;
use crate::domain::ports::completion_port::CompletionProvider;
use crate::infrastructure::ai::canned::CannedProvider;
use crate::infrastructure::ai::chat_completions::{ChatCompletionsProvider, GROQ_BASE_URL, OPENAI_BASE_URL};
use crate::infrastructure::sqlite;
use crate::infrastructure::sqlite::account_repo::SqliteAccountRepo;
use crate::infrastructure::sqlite::admin_repo::SqliteAdminRepo;
use std::sync::Arc;
use tracing::warn;

/// The assistant backend: in-memory learning, market and practice stores
/// plus the database-backed account services.
pub struct TradePilot {
    knowledge: KnowledgeBase,
    learning: LearningSystem,
    market: Arc<MarketDataService>,
    sandbox: SharedDataStore,
    training: TrainingService,
    ai: AiTradingService,
    chat_uc: ChatUseCase,
    accounts: AccountService,
    admin: AdminService,
}

impl TradePilot {
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        let api_key = config.ai_api_key.clone().unwrap_or_default();
        let model = Some(config.ai_model.clone());

        let provider: Arc<dyn CompletionProvider> = match config.ai_provider {
            AiProvider::Canned => Arc::new(CannedProvider::new()),
            AiProvider::Groq => {
                let base = config.ai_base_url.as_deref().unwrap_or(GROQ_BASE_URL);
                Arc::new(ChatCompletionsProvider::new("groq", base, api_key, model))
            }
            AiProvider::Openai => {
                let base = config.ai_base_url.as_deref().unwrap_or(OPENAI_BASE_URL);
                Arc::new(ChatCompletionsProvider::new("openai", base, api_key, model))
            }
        };
        if config.ai_provider != AiProvider::Canned && config.ai_api_key.is_none() {
            warn!(provider = provider.name(), "no AI API key configured; chat requests will fail");
        }

        Self::with_providers(&config.db, provider, config.market_seed)
    }

    pub fn with_providers(
        db_path: &str,
        provider: Arc<dyn CompletionProvider>,
        market_seed: Option<u64>,
    ) -> Result<Self, DomainError> {
        let account_repo: Arc<dyn AccountRepository> = Arc::new(SqliteAccountRepo::new(sqlite::open(db_path)?));
        let admin_repo: Arc<dyn AdminRepository> = Arc::new(SqliteAdminRepo::new(sqlite::open(db_path)?));

        Ok(Self {
            knowledge: KnowledgeBase::new(),
            learning: LearningSystem::new(),
            market: Arc::new(MarketDataService::new(market_seed)),
            sandbox: SharedDataStore::new(),
            training: TrainingService::new(market_seed),
            ai: AiTradingService::new(provider.clone()),
            chat_uc: ChatUseCase::new(provider, account_repo.clone()),
            accounts: AccountService::new(account_repo.clone()),
            admin: AdminService::new(admin_repo, account_repo),
        })
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn learning(&self) -> &LearningSystem {
        &self.learning
    }

    pub fn market(&self) -> &Arc<MarketDataService> {
        &self.market
    }

    pub fn sandbox(&self) -> &SharedDataStore {
        &self.sandbox
    }

    pub fn training(&self) -> &TrainingService {
        &self.training
    }

    pub fn ai(&self) -> &AiTradingService {
        &self.ai
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn admin(&self) -> &AdminService {
        &self.admin
    }

    pub async fn chat(&self, user_id: Option<&str>, request: ChatRequest) -> Result<ChatReply, DomainError> {
        self.chat_uc.execute(user_id, request).await
    }

    pub fn sync_sandbox(&self, user_id: &str) -> Result<Option<SharedData>, DomainError> {
        self.sandbox.sync_with_knowledge_base(user_id, &self.knowledge)
    }
}
