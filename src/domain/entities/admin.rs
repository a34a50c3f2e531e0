use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRole {
    pub id: String,
    pub name: String,
    /// Resource name to allowed actions.
    pub permissions: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub role: AdminRole,
}

impl AdminUser {
    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.role
            .permissions
            .get(resource)
            .map(|actions| actions.iter().any(|a| a == action))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_with(perms: &[(&str, &[&str])]) -> AdminUser {
        let permissions = perms
            .iter()
            .map(|(r, a)| (r.to_string(), a.iter().map(|s| s.to_string()).collect()))
            .collect();
        AdminUser {
            id: "a1".into(),
            user_id: "u1".into(),
            role_id: "r1".into(),
            is_active: true,
            last_login: None,
            role: AdminRole {
                id: "r1".into(),
                name: "support".into(),
                permissions,
            },
        }
    }

    #[test]
    fn test_permission_lookup() {
        let admin = admin_with(&[("users", &["read"]), ("ai_configs", &["read", "write"])]);
        assert!(admin.has_permission("users", "read"));
        assert!(!admin.has_permission("users", "write"));
        assert!(admin.has_permission("ai_configs", "write"));
        assert!(!admin.has_permission("analytics", "read"));
    }
}
