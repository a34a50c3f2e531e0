use crate::domain::entities::account::{AssistantConfig, AssistantConfigInput};
use crate::domain::entities::admin::{AdminRole, AdminUser};
use crate::domain::error::DomainError;

pub trait AdminRepository: Send + Sync {
    /// Upserts by name and returns the stored role.
    fn add_role(&self, role: &AdminRole) -> Result<AdminRole, DomainError>;
    fn add_admin(&self, user_id: &str, role_id: &str) -> Result<AdminUser, DomainError>;
    /// Active admin record for a user, joined with its role.
    fn get_active_admin(&self, user_id: &str) -> Result<Option<AdminUser>, DomainError>;
    fn admin_count(&self) -> Result<usize, DomainError>;
    fn touch_login(&self, admin_id: &str) -> Result<(), DomainError>;

    fn add_config(&self, config: &AssistantConfig) -> Result<(), DomainError>;
    fn update_config(&self, id: &str, input: &AssistantConfigInput) -> Result<AssistantConfig, DomainError>;
    fn delete_config(&self, id: &str) -> Result<(), DomainError>;
    fn get_config(&self, id: &str) -> Result<Option<AssistantConfig>, DomainError>;
    /// Newest first.
    fn list_configs(&self) -> Result<Vec<AssistantConfig>, DomainError>;
}
