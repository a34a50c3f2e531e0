use crate::domain::entities::account::AccountProfile;
use crate::domain::entities::activity::ActivityLog;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub custom_ai_name: Option<String>,
    pub selected_ai_assistant: Option<String>,
    pub ai_assistant_configured: Option<bool>,
    pub onboarding_completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub since: Option<DateTime<Utc>>,
    pub activity_type: Option<String>,
    pub user_id: Option<String>,
}

pub trait AccountRepository: Send + Sync {
    fn create_profile(&self, profile: &AccountProfile) -> Result<(), DomainError>;
    fn get_profile(&self, id: &str) -> Result<Option<AccountProfile>, DomainError>;
    fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<AccountProfile, DomainError>;
    /// Newest first.
    fn list_profiles(&self, since: Option<DateTime<Utc>>) -> Result<Vec<AccountProfile>, DomainError>;
    fn log_activity(&self, log: &ActivityLog) -> Result<(), DomainError>;
    fn list_activity(&self, filter: &ActivityFilter) -> Result<Vec<ActivityLog>, DomainError>;
}
