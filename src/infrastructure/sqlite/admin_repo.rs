use super::{from_sql_json, from_sql_time, to_sql_time};
use crate::domain::entities::account::{AssistantConfig, AssistantConfigInput};
use crate::domain::entities::admin::{AdminRole, AdminUser};
use crate::domain::error::DomainError;
use crate::domain::ports::admin_repository::AdminRepository;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

const CONFIG_COLS: &str =
    "id, name, description, model_provider, model_name, system_prompt, max_tokens, temperature, is_active, created_at";

pub struct SqliteAdminRepo {
    conn: Mutex<Connection>,
}

impl SqliteAdminRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn.lock().map_err(|e| DomainError::Database(e.to_string()))
    }

    fn row_to_admin(row: &rusqlite::Row) -> Result<AdminUser, rusqlite::Error> {
        let active: i32 = row.get(3)?;
        let login_str: Option<String> = row.get(4)?;
        let perms_str: String = row.get(7)?;

        Ok(AdminUser {
            id: row.get(0)?,
            user_id: row.get(1)?,
            role_id: row.get(2)?,
            is_active: active != 0,
            last_login: login_str.map(|s| from_sql_time(4, &s)).transpose()?,
            role: AdminRole {
                id: row.get(5)?,
                name: row.get(6)?,
                permissions: from_sql_json(7, &perms_str)?,
            },
        })
    }

    fn row_to_config(row: &rusqlite::Row) -> Result<AssistantConfig, rusqlite::Error> {
        let active: i32 = row.get(8)?;
        let created_str: String = row.get(9)?;

        Ok(AssistantConfig {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            model_provider: row.get(3)?,
            model_name: row.get(4)?,
            system_prompt: row.get(5)?,
            max_tokens: row.get(6)?,
            temperature: row.get(7)?,
            is_active: active != 0,
            created_at: from_sql_time(9, &created_str)?,
        })
    }

    fn fetch_admin(conn: &Connection, user_id: &str) -> Result<Option<AdminUser>, DomainError> {
        conn.query_row(
            "SELECT u.id, u.user_id, u.role_id, u.is_active, u.last_login, r.id, r.name, r.permissions
             FROM admin_users u JOIN admin_roles r ON r.id = u.role_id
             WHERE u.user_id = ?1 AND u.is_active = 1",
            params![user_id],
            Self::row_to_admin,
        )
        .optional()
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn fetch_config(conn: &Connection, id: &str) -> Result<Option<AssistantConfig>, DomainError> {
        let sql = format!("SELECT {CONFIG_COLS} FROM ai_assistant_configs WHERE id = ?1");
        conn.query_row(&sql, params![id], Self::row_to_config)
            .optional()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl AdminRepository for SqliteAdminRepo {
    fn add_role(&self, role: &AdminRole) -> Result<AdminRole, DomainError> {
        let conn = self.conn()?;
        let permissions =
            serde_json::to_string(&role.permissions).map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            "INSERT INTO admin_roles (id, name, permissions) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET permissions = excluded.permissions",
            params![role.id, role.name, permissions],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add role: {e}")))?;

        // An existing role of the same name keeps its id.
        conn.query_row(
            "SELECT id, name, permissions FROM admin_roles WHERE name = ?1",
            params![role.name],
            |row| {
                let perms_str: String = row.get(2)?;
                Ok(AdminRole {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    permissions: from_sql_json(2, &perms_str)?,
                })
            },
        )
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn add_admin(&self, user_id: &str, role_id: &str) -> Result<AdminUser, DomainError> {
        let conn = self.conn()?;
        let role_exists: bool = conn
            .query_row("SELECT COUNT(*) FROM admin_roles WHERE id = ?1", params![role_id], |r| {
                r.get::<_, i64>(0)
            })
            .map(|n| n > 0)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if !role_exists {
            return Err(DomainError::NotFound(format!("Admin role {role_id}")));
        }

        conn.execute(
            "INSERT INTO admin_users (id, user_id, role_id, is_active) VALUES (?1, ?2, ?3, 1)",
            params![uuid::Uuid::new_v4().to_string(), user_id, role_id],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add admin: {e}")))?;
        Self::fetch_admin(&conn, user_id)?.ok_or_else(|| DomainError::NotFound(format!("Admin {user_id}")))
    }

    fn get_active_admin(&self, user_id: &str) -> Result<Option<AdminUser>, DomainError> {
        let conn = self.conn()?;
        Self::fetch_admin(&conn, user_id)
    }

    fn admin_count(&self) -> Result<usize, DomainError> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM admin_users", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn touch_login(&self, admin_id: &str) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE admin_users SET last_login = ?2 WHERE id = ?1",
            params![admin_id, to_sql_time(&Utc::now())],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn add_config(&self, config: &AssistantConfig) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ai_assistant_configs (id, name, description, model_provider, model_name, system_prompt, max_tokens, temperature, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                config.id,
                config.name,
                config.description,
                config.model_provider,
                config.model_name,
                config.system_prompt,
                config.max_tokens,
                config.temperature,
                config.is_active as i32,
                to_sql_time(&config.created_at),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add assistant config: {e}")))?;
        Ok(())
    }

    fn update_config(&self, id: &str, input: &AssistantConfigInput) -> Result<AssistantConfig, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE ai_assistant_configs SET name = ?2, description = ?3, model_provider = ?4, model_name = ?5,
                    system_prompt = ?6, max_tokens = ?7, temperature = ?8, is_active = ?9
                 WHERE id = ?1",
                params![
                    id,
                    input.name,
                    input.description,
                    input.model_provider,
                    input.model_name,
                    input.system_prompt,
                    input.max_tokens,
                    input.temperature,
                    input.is_active as i32,
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to update assistant config: {e}")))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Assistant config {id}")));
        }
        Self::fetch_config(&conn, id)?.ok_or_else(|| DomainError::NotFound(format!("Assistant config {id}")))
    }

    fn delete_config(&self, id: &str) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM ai_assistant_configs WHERE id = ?1", params![id])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Assistant config {id}")));
        }
        Ok(())
    }

    fn get_config(&self, id: &str) -> Result<Option<AssistantConfig>, DomainError> {
        let conn = self.conn()?;
        Self::fetch_config(&conn, id)
    }

    fn list_configs(&self) -> Result<Vec<AssistantConfig>, DomainError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {CONFIG_COLS} FROM ai_assistant_configs ORDER BY created_at DESC, rowid DESC");
        let mut stmt = conn.prepare(&sql).map_err(|e| DomainError::Database(e.to_string()))?;
        let configs = stmt
            .query_map([], Self::row_to_config)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::open;
    use std::collections::HashMap;

    fn repo() -> SqliteAdminRepo {
        SqliteAdminRepo::new(open(":memory:").unwrap())
    }

    fn role(name: &str) -> AdminRole {
        let mut permissions = HashMap::new();
        permissions.insert("users".to_string(), vec!["read".to_string()]);
        AdminRole {
            id: format!("role-{name}"),
            name: name.to_string(),
            permissions,
        }
    }

    #[test]
    fn test_admin_joins_role() {
        let repo = repo();
        repo.add_role(&role("support")).unwrap();
        let admin = repo.add_admin("u1", "role-support").unwrap();

        assert!(admin.is_active);
        assert_eq!(admin.role.name, "support");
        assert!(admin.has_permission("users", "read"));
        assert_eq!(repo.admin_count().unwrap(), 1);
        assert!(repo.get_active_admin("u2").unwrap().is_none());
    }

    #[test]
    fn test_add_role_reuses_existing_name() {
        let repo = repo();
        let first = repo.add_role(&role("support")).unwrap();
        let mut again = role("support");
        again.id = "other-id".into();
        let stored = repo.add_role(&again).unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[test]
    fn test_add_admin_requires_role() {
        let repo = repo();
        assert!(matches!(repo.add_admin("u1", "nope"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_touch_login_sets_timestamp() {
        let repo = repo();
        repo.add_role(&role("support")).unwrap();
        let admin = repo.add_admin("u1", "role-support").unwrap();
        assert!(admin.last_login.is_none());

        repo.touch_login(&admin.id).unwrap();
        assert!(repo.get_active_admin("u1").unwrap().unwrap().last_login.is_some());
    }

    #[test]
    fn test_config_crud() {
        let repo = repo();
        let config = AssistantConfig::new(AssistantConfigInput::named("Friday"));
        repo.add_config(&config).unwrap();

        let mut input = AssistantConfigInput::named("Friday v2");
        input.max_tokens = 2000;
        let updated = repo.update_config(&config.id, &input).unwrap();
        assert_eq!(updated.name, "Friday v2");
        assert_eq!(updated.max_tokens, 2000);
        assert_eq!(updated.created_at, repo.get_config(&config.id).unwrap().unwrap().created_at);

        repo.delete_config(&config.id).unwrap();
        assert!(repo.list_configs().unwrap().is_empty());
        assert!(matches!(repo.delete_config(&config.id), Err(DomainError::NotFound(_))));
    }
}
