use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user_profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            display_name TEXT,
            custom_ai_name TEXT,
            selected_ai_assistant TEXT,
            ai_assistant_configured INTEGER NOT NULL DEFAULT 0,
            onboarding_completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS client_activity_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            activity_type TEXT NOT NULL,
            activity_data TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS admin_roles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            permissions TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS admin_users (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            role_id TEXT NOT NULL REFERENCES admin_roles(id),
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login TEXT
        );

        CREATE TABLE IF NOT EXISTS ai_assistant_configs (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            model_provider TEXT NOT NULL,
            model_name TEXT NOT NULL,
            system_prompt TEXT,
            max_tokens INTEGER NOT NULL DEFAULT 1000,
            temperature REAL NOT NULL DEFAULT 0.7,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_created ON user_profiles(created_at);
        CREATE INDEX IF NOT EXISTS idx_activity_created ON client_activity_logs(created_at);
        CREATE INDEX IF NOT EXISTS idx_activity_user ON client_activity_logs(user_id);
        CREATE INDEX IF NOT EXISTS idx_activity_type ON client_activity_logs(activity_type);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
