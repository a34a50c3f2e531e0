use crate::domain::entities::account::AccountProfile;
use crate::domain::entities::activity::ActivityLog;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::{AccountRepository, ActivityFilter, ProfileChanges};
use crate::domain::values::persona::find_persona;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Profile and onboarding operations over the `user_profiles` table, plus
/// the client activity log.
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    pub fn create_profile(
        &self,
        id: &str,
        email: &str,
        display_name: Option<String>,
    ) -> Result<AccountProfile, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidInput("User id must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(DomainError::InvalidInput(format!("Invalid email: {email}")));
        }
        if self.repo.get_profile(id)?.is_some() {
            return Err(DomainError::InvalidInput(format!("Profile {id} already exists")));
        }
        let profile = AccountProfile::new(id.to_string(), email.to_string(), display_name);
        self.repo.create_profile(&profile)?;
        info!(user_id = id, "profile created");
        Ok(profile)
    }

    pub fn get_profile(&self, id: &str) -> Result<AccountProfile, DomainError> {
        self.repo
            .get_profile(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Profile {id}")))
    }

    pub fn update_profile(
        &self,
        id: &str,
        display_name: Option<String>,
        custom_ai_name: Option<String>,
    ) -> Result<AccountProfile, DomainError> {
        self.repo.update_profile(
            id,
            &ProfileChanges {
                display_name,
                custom_ai_name,
                ..Default::default()
            },
        )
    }

    /// Stores the persona's canonical name and marks the assistant configured.
    pub fn select_assistant(&self, id: &str, assistant: &str) -> Result<AccountProfile, DomainError> {
        let persona = find_persona(assistant)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown assistant: {assistant}")))?;
        self.repo.update_profile(
            id,
            &ProfileChanges {
                selected_ai_assistant: Some(persona.name.to_string()),
                ai_assistant_configured: Some(true),
                ..Default::default()
            },
        )
    }

    pub fn complete_onboarding(
        &self,
        id: &str,
        assistant: Option<&str>,
        custom_ai_name: Option<String>,
    ) -> Result<AccountProfile, DomainError> {
        let mut changes = ProfileChanges {
            onboarding_completed: Some(true),
            custom_ai_name,
            ..Default::default()
        };
        if let Some(name) = assistant {
            let persona = find_persona(name)
                .ok_or_else(|| DomainError::InvalidInput(format!("Unknown assistant: {name}")))?;
            changes.selected_ai_assistant = Some(persona.name.to_string());
            changes.ai_assistant_configured = Some(true);
        }
        let profile = self.repo.update_profile(id, &changes)?;
        self.log_activity(id, "onboarding_completed", None)?;
        Ok(profile)
    }

    /// Newest first; `search` matches display name or email, ignoring case.
    pub fn list_profiles(&self, search: Option<&str>) -> Result<Vec<AccountProfile>, DomainError> {
        let profiles = self.repo.list_profiles(None)?;
        let Some(q) = search.map(str::to_lowercase).filter(|q| !q.is_empty()) else {
            return Ok(profiles);
        };
        Ok(profiles
            .into_iter()
            .filter(|p| p.matches(&q))
            .collect())
    }

    pub fn log_activity(
        &self,
        user_id: &str,
        activity_type: &str,
        data: Option<serde_json::Value>,
    ) -> Result<ActivityLog, DomainError> {
        let log = ActivityLog::new(user_id, activity_type, data);
        self.repo.log_activity(&log)?;
        Ok(log)
    }

    pub fn list_activity(&self, since: Option<DateTime<Utc>>) -> Result<Vec<ActivityLog>, DomainError> {
        self.repo.list_activity(&ActivityFilter {
            since,
            ..Default::default()
        })
    }
}
