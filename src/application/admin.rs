use crate::domain::entities::account::{AccountProfile, AssistantConfig, AssistantConfigInput};
use crate::domain::entities::activity::{ActivityLog, AI_MESSAGE};
use crate::domain::entities::admin::{AdminRole, AdminUser};
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::{AccountRepository, ActivityFilter};
use crate::domain::ports::admin_repository::AdminRepository;
use crate::domain::values::analytics_range::AnalyticsRange;
use chrono::{Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

pub const SUPER_ADMIN_ROLE: &str = "super_admin";
const ACTIVE_USER_DAYS: i64 = 7;
const RECENT_ACTIVITY: usize = 10;

/// Resources an admin role may be granted actions on.
pub const RESOURCES: [&str; 4] = ["users", "ai_configs", "analytics", "admins"];
const ALL_ACTIONS: [&str; 3] = ["read", "write", "delete"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_users: usize,
    pub total_sessions: usize,
    pub recent_activity: Vec<ActivityLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub users: usize,
    pub cumulative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePoint {
    pub date: NaiveDate,
    pub messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    pub activity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub total_sessions: usize,
    pub active_users: usize,
    pub messages_sent: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub range: AnalyticsRange,
    pub total_users: usize,
    pub user_growth: Vec<GrowthPoint>,
    pub ai_usage: Vec<UsagePoint>,
    /// 24 buckets, UTC.
    pub activity_by_hour: Vec<HourBucket>,
    pub assistant_popularity: Vec<AssistantCount>,
    pub user_engagement: Engagement,
}

/// Admin seats, assistant configuration and usage reporting.
pub struct AdminService {
    admins: Arc<dyn AdminRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl AdminService {
    pub fn new(admins: Arc<dyn AdminRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { admins, accounts }
    }

    /// Active admin record without recording a login.
    pub fn get_admin_user(&self, user_id: &str) -> Result<Option<AdminUser>, DomainError> {
        self.admins.get_active_admin(user_id)
    }

    /// The caller's active admin record, or `Unauthorized`.
    pub fn require_admin(&self, user_id: &str) -> Result<AdminUser, DomainError> {
        let admin = self
            .admins
            .get_active_admin(user_id)?
            .ok_or_else(|| DomainError::Unauthorized("Admin access required".to_string()))?;
        if let Err(e) = self.admins.touch_login(&admin.id) {
            warn!(admin_id = %admin.id, error = %e, "failed to record admin login");
        }
        Ok(admin)
    }

    /// Claims the first admin seat. Refused once any admin exists.
    pub fn setup_first_admin(&self, user_id: &str) -> Result<AdminUser, DomainError> {
        if self.admins.admin_count()? > 0 {
            return Err(DomainError::Unauthorized("An admin account already exists".to_string()));
        }

        let permissions: HashMap<String, Vec<String>> = RESOURCES
            .iter()
            .map(|r| (r.to_string(), ALL_ACTIONS.iter().map(|a| a.to_string()).collect()))
            .collect();
        let role = AdminRole {
            id: uuid::Uuid::new_v4().to_string(),
            name: SUPER_ADMIN_ROLE.to_string(),
            permissions,
        };
        let role = self.admins.add_role(&role)?;
        let admin = self.admins.add_admin(user_id, &role.id)?;
        info!(user_id, "first admin configured");
        Ok(admin)
    }

    pub fn list_users(&self, admin: &AdminUser, search: Option<&str>) -> Result<Vec<AccountProfile>, DomainError> {
        authorize(admin, "users", "read")?;
        let profiles = self.accounts.list_profiles(None)?;
        let Some(q) = search.map(str::to_lowercase).filter(|q| !q.is_empty()) else {
            return Ok(profiles);
        };
        Ok(profiles
            .into_iter()
            .filter(|p| p.matches(&q))
            .collect())
    }

    pub fn list_configs(&self, admin: &AdminUser) -> Result<Vec<AssistantConfig>, DomainError> {
        authorize(admin, "ai_configs", "read")?;
        self.admins.list_configs()
    }

    pub fn create_config(&self, admin: &AdminUser, input: AssistantConfigInput) -> Result<AssistantConfig, DomainError> {
        authorize(admin, "ai_configs", "write")?;
        input.validate().map_err(DomainError::InvalidInput)?;
        let config = AssistantConfig::new(input);
        self.admins.add_config(&config)?;
        info!(config_id = %config.id, name = %config.name, "assistant config created");
        Ok(config)
    }

    pub fn update_config(
        &self,
        admin: &AdminUser,
        id: &str,
        input: AssistantConfigInput,
    ) -> Result<AssistantConfig, DomainError> {
        authorize(admin, "ai_configs", "write")?;
        input.validate().map_err(DomainError::InvalidInput)?;
        self.admins.update_config(id, &input)
    }

    pub fn delete_config(&self, admin: &AdminUser, id: &str) -> Result<(), DomainError> {
        authorize(admin, "ai_configs", "delete")?;
        self.admins.delete_config(id)
    }

    pub fn dashboard(&self, admin: &AdminUser) -> Result<DashboardStats, DomainError> {
        authorize(admin, "analytics", "read")?;
        let profiles = self.accounts.list_profiles(None)?;
        let active_since = Utc::now() - Duration::days(ACTIVE_USER_DAYS);
        let logs = self.accounts.list_activity(&ActivityFilter::default())?;

        Ok(DashboardStats {
            total_users: profiles.len(),
            active_users: profiles.iter().filter(|p| p.updated_at >= active_since).count(),
            total_sessions: logs.len(),
            recent_activity: logs.into_iter().take(RECENT_ACTIVITY).collect(),
        })
    }

    pub fn analytics(&self, admin: &AdminUser, range: AnalyticsRange) -> Result<AnalyticsReport, DomainError> {
        authorize(admin, "analytics", "read")?;

        let now = Utc::now();
        let start = now - Duration::days(range.days());
        let today = now.date_naive();
        let days: Vec<NaiveDate> = (0..range.days()).rev().map(|i| today - Duration::days(i)).collect();

        let all_profiles = self.accounts.list_profiles(None)?;
        let new_profiles: Vec<&AccountProfile> = all_profiles.iter().filter(|p| p.created_at >= start).collect();
        let logs = self.accounts.list_activity(&ActivityFilter {
            since: Some(start),
            ..Default::default()
        })?;
        let ai_logs: Vec<&ActivityLog> = logs.iter().filter(|l| l.activity_type == AI_MESSAGE).collect();

        let user_growth = days
            .iter()
            .map(|day| GrowthPoint {
                date: *day,
                users: new_profiles.iter().filter(|p| p.created_at.date_naive() == *day).count(),
                cumulative: new_profiles.iter().filter(|p| p.created_at.date_naive() <= *day).count(),
            })
            .collect();

        let ai_usage = days
            .iter()
            .map(|day| UsagePoint {
                date: *day,
                messages: ai_logs.iter().filter(|l| l.created_at.date_naive() == *day).count(),
            })
            .collect();

        let mut hours = [0usize; 24];
        for log in &logs {
            hours[log.created_at.hour() as usize] += 1;
        }
        let activity_by_hour = hours
            .iter()
            .enumerate()
            .map(|(hour, &activity)| HourBucket {
                hour: hour as u32,
                activity,
            })
            .collect();

        let mut popularity: HashMap<&str, usize> = HashMap::new();
        for name in all_profiles.iter().filter_map(|p| p.selected_ai_assistant.as_deref()) {
            *popularity.entry(name).or_default() += 1;
        }
        let mut assistant_popularity: Vec<AssistantCount> = popularity
            .into_iter()
            .map(|(name, value)| AssistantCount {
                name: name.to_string(),
                value,
            })
            .collect();
        assistant_popularity.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

        let active_users: HashSet<&str> = logs.iter().map(|l| l.user_id.as_str()).collect();

        Ok(AnalyticsReport {
            range,
            total_users: all_profiles.len(),
            user_growth,
            ai_usage,
            activity_by_hour,
            assistant_popularity,
            user_engagement: Engagement {
                total_sessions: logs.len(),
                active_users: active_users.len(),
                messages_sent: ai_logs.len(),
            },
        })
    }
}

fn authorize(admin: &AdminUser, resource: &str, action: &str) -> Result<(), DomainError> {
    if admin.has_permission(resource, action) {
        Ok(())
    } else {
        Err(DomainError::Unauthorized(format!("Missing permission {action} on {resource}")))
    }
}
