use super::{from_sql_json, from_sql_time, to_sql_time};
use crate::domain::entities::account::AccountProfile;
use crate::domain::entities::activity::ActivityLog;
use crate::domain::error::DomainError;
use crate::domain::ports::account_repository::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

const PROFILE_COLS: &str = "id, email, display_name, custom_ai_name, selected_ai_assistant, ai_assistant_configured, onboarding_completed, created_at, updated_at";

pub struct SqliteAccountRepo {
    conn: Mutex<Connection>,
}

impl SqliteAccountRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn.lock().map_err(|e| DomainError::Database(e.to_string()))
    }

    fn row_to_profile(row: &rusqlite::Row) -> Result<AccountProfile, rusqlite::Error> {
        let configured: i32 = row.get(5)?;
        let onboarded: i32 = row.get(6)?;
        let created_str: String = row.get(7)?;
        let updated_str: String = row.get(8)?;

        Ok(AccountProfile {
            id: row.get(0)?,
            email: row.get(1)?,
            display_name: row.get(2)?,
            custom_ai_name: row.get(3)?,
            selected_ai_assistant: row.get(4)?,
            ai_assistant_configured: configured != 0,
            onboarding_completed: onboarded != 0,
            created_at: from_sql_time(7, &created_str)?,
            updated_at: from_sql_time(8, &updated_str)?,
        })
    }

    fn row_to_log(row: &rusqlite::Row) -> Result<ActivityLog, rusqlite::Error> {
        let data_str: Option<String> = row.get(3)?;
        let created_str: String = row.get(4)?;

        Ok(ActivityLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            activity_type: row.get(2)?,
            activity_data: data_str.map(|s| from_sql_json(3, &s)).transpose()?,
            created_at: from_sql_time(4, &created_str)?,
        })
    }

    fn fetch_profile(conn: &Connection, id: &str) -> Result<Option<AccountProfile>, DomainError> {
        let sql = format!("SELECT {PROFILE_COLS} FROM user_profiles WHERE id = ?1");
        conn.query_row(&sql, params![id], Self::row_to_profile)
            .optional()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl AccountRepository for SqliteAccountRepo {
    fn create_profile(&self, profile: &AccountProfile) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user_profiles (id, email, display_name, custom_ai_name, selected_ai_assistant, ai_assistant_configured, onboarding_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                profile.id,
                profile.email,
                profile.display_name,
                profile.custom_ai_name,
                profile.selected_ai_assistant,
                profile.ai_assistant_configured as i32,
                profile.onboarding_completed as i32,
                to_sql_time(&profile.created_at),
                to_sql_time(&profile.updated_at),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to create profile: {e}")))?;
        Ok(())
    }

    fn get_profile(&self, id: &str) -> Result<Option<AccountProfile>, DomainError> {
        let conn = self.conn()?;
        Self::fetch_profile(&conn, id)
    }

    fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<AccountProfile, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE user_profiles SET
                    display_name = COALESCE(?2, display_name),
                    custom_ai_name = COALESCE(?3, custom_ai_name),
                    selected_ai_assistant = COALESCE(?4, selected_ai_assistant),
                    ai_assistant_configured = COALESCE(?5, ai_assistant_configured),
                    onboarding_completed = COALESCE(?6, onboarding_completed),
                    updated_at = ?7
                 WHERE id = ?1",
                params![
                    id,
                    changes.display_name,
                    changes.custom_ai_name,
                    changes.selected_ai_assistant,
                    changes.ai_assistant_configured.map(|b| b as i32),
                    changes.onboarding_completed.map(|b| b as i32),
                    to_sql_time(&Utc::now()),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to update profile: {e}")))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Profile {id}")));
        }
        Self::fetch_profile(&conn, id)?.ok_or_else(|| DomainError::NotFound(format!("Profile {id}")))
    }

    fn list_profiles(&self, since: Option<DateTime<Utc>>) -> Result<Vec<AccountProfile>, DomainError> {
        let conn = self.conn()?;
        let mut sql = format!("SELECT {PROFILE_COLS} FROM user_profiles");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if let Some(since) = &since {
            sql.push_str(" WHERE created_at >= ?1");
            param_values.push(Box::new(to_sql_time(since)));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql).map_err(|e| DomainError::Database(e.to_string()))?;
        let profiles = stmt
            .query_map(params_refs.as_slice(), Self::row_to_profile)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    fn log_activity(&self, log: &ActivityLog) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let data = log
            .activity_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            "INSERT INTO client_activity_logs (id, user_id, activity_type, activity_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                log.id,
                log.user_id,
                log.activity_type,
                data,
                to_sql_time(&log.created_at),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to log activity: {e}")))?;
        Ok(())
    }

    fn list_activity(&self, filter: &ActivityFilter) -> Result<Vec<ActivityLog>, DomainError> {
        let conn = self.conn()?;
        let mut sql = String::from(
            "SELECT id, user_id, activity_type, activity_data, created_at FROM client_activity_logs WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND created_at >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(to_sql_time(since)));
        }
        if let Some(kind) = &filter.activity_type {
            sql.push_str(&format!(" AND activity_type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(kind.clone()));
        }
        if let Some(user) = &filter.user_id {
            sql.push_str(&format!(" AND user_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(user.clone()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql).map_err(|e| DomainError::Database(e.to_string()))?;
        let logs = stmt
            .query_map(params_refs.as_slice(), Self::row_to_log)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}
