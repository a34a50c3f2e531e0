mod common;

use common::setup;
use std::collections::HashMap;
use std::sync::Arc;
use tradepilot::application::admin::{AdminService, SUPER_ADMIN_ROLE};
use tradepilot::domain::entities::account::AssistantConfigInput;
use tradepilot::domain::entities::admin::AdminRole;
use tradepilot::domain::entities::chat::ChatRequest;
use tradepilot::domain::error::DomainError;
use tradepilot::domain::ports::admin_repository::AdminRepository;
use tradepilot::domain::values::analytics_range::AnalyticsRange;
use tradepilot::domain::values::chat_mode::ChatMode;
use tradepilot::infrastructure::sqlite::account_repo::SqliteAccountRepo;
use tradepilot::infrastructure::sqlite::admin_repo::SqliteAdminRepo;
use tradepilot::infrastructure::sqlite::open;

#[test]
fn test_first_admin_setup_only_once() {
    let app = setup();
    let admin = app.admin().setup_first_admin("boss").unwrap();
    assert_eq!(admin.role.name, SUPER_ADMIN_ROLE);
    assert!(admin.has_permission("admins", "delete"));

    assert!(matches!(
        app.admin().setup_first_admin("intruder"),
        Err(DomainError::Unauthorized(_))
    ));
    assert!(app.admin().get_admin_user("intruder").unwrap().is_none());
}

#[test]
fn test_require_admin() {
    let app = setup();
    assert!(matches!(app.admin().require_admin("boss"), Err(DomainError::Unauthorized(_))));

    app.admin().setup_first_admin("boss").unwrap();
    app.admin().require_admin("boss").unwrap();
    let stored = app.admin().get_admin_user("boss").unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[test]
fn test_assistant_config_crud() {
    let app = setup();
    let admin = app.admin().setup_first_admin("boss").unwrap();
    let svc = app.admin();

    let created = svc.create_config(&admin, AssistantConfigInput::named("Friday")).unwrap();
    assert_eq!(created.max_tokens, 1000);
    assert_eq!(created.temperature, 0.7);
    assert!(created.is_active);

    let mut input = AssistantConfigInput::named("Friday Pro");
    input.temperature = 0.2;
    let updated = svc.update_config(&admin, &created.id, input).unwrap();
    assert_eq!(updated.name, "Friday Pro");

    let mut bad = AssistantConfigInput::named("Broken");
    bad.temperature = 3.5;
    assert!(matches!(svc.create_config(&admin, bad), Err(DomainError::InvalidInput(_))));

    svc.create_config(&admin, AssistantConfigInput::named("Nova")).unwrap();
    let names: Vec<String> = svc.list_configs(&admin).unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Nova", "Friday Pro"]);

    svc.delete_config(&admin, &created.id).unwrap();
    assert!(matches!(svc.delete_config(&admin, &created.id), Err(DomainError::NotFound(_))));
}

#[test]
fn test_list_users_search() {
    let app = setup();
    let admin = app.admin().setup_first_admin("boss").unwrap();
    app.accounts().create_profile("u1", "ada@example.com", Some("Ada".into())).unwrap();
    app.accounts().create_profile("u2", "bob@corp.io", None).unwrap();

    assert_eq!(app.admin().list_users(&admin, None).unwrap().len(), 2);
    let hits = app.admin().list_users(&admin, Some("ADA")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "u1");
}

#[tokio::test]
async fn test_analytics_report() {
    let app = setup();
    let admin = app.admin().setup_first_admin("boss").unwrap();
    app.accounts().create_profile("u1", "a@example.com", None).unwrap();
    app.accounts().create_profile("u2", "b@example.com", None).unwrap();
    app.accounts().select_assistant("u1", "Oracle").unwrap();
    app.accounts().select_assistant("u2", "Oracle").unwrap();

    for user in ["u1", "u1", "u2"] {
        let request = ChatRequest {
            message: "hi".into(),
            mode: ChatMode::Chat,
            history: vec![],
            assistant: None,
        };
        app.chat(Some(user), request).await.unwrap();
    }
    app.accounts().log_activity("u2", "login", None).unwrap();

    let report = app.admin().analytics(&admin, AnalyticsRange::Week).unwrap();
    assert_eq!(report.total_users, 2);
    assert_eq!(report.user_growth.len(), 7);
    assert_eq!(report.user_growth.last().unwrap().users, 2);
    assert_eq!(report.user_growth.last().unwrap().cumulative, 2);
    assert_eq!(report.ai_usage.last().unwrap().messages, 3);
    assert_eq!(report.activity_by_hour.len(), 24);
    assert_eq!(report.activity_by_hour.iter().map(|h| h.activity).sum::<usize>(), 4);
    assert_eq!(report.assistant_popularity.len(), 1);
    assert_eq!(report.assistant_popularity[0].name, "Oracle");
    assert_eq!(report.assistant_popularity[0].value, 2);
    assert_eq!(report.user_engagement.total_sessions, 4);
    assert_eq!(report.user_engagement.active_users, 2);
    assert_eq!(report.user_engagement.messages_sent, 3);

    let quarter = app.admin().analytics(&admin, AnalyticsRange::Quarter).unwrap();
    assert_eq!(quarter.user_growth.len(), 90);
}

#[test]
fn test_dashboard() {
    let app = setup();
    let admin = app.admin().setup_first_admin("boss").unwrap();
    app.accounts().create_profile("u1", "a@example.com", None).unwrap();
    for _ in 0..12 {
        app.accounts().log_activity("u1", "page_view", None).unwrap();
    }

    let stats = app.admin().dashboard(&admin).unwrap();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.active_users, 1);
    assert_eq!(stats.total_sessions, 12);
    assert_eq!(stats.recent_activity.len(), 10);
}

#[test]
fn test_permissions_are_per_resource_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin.db");
    let path = path.to_str().unwrap();

    let admins = Arc::new(SqliteAdminRepo::new(open(path).unwrap()));
    let accounts = Arc::new(SqliteAccountRepo::new(open(path).unwrap()));

    let mut permissions = HashMap::new();
    permissions.insert("users".to_string(), vec!["read".to_string()]);
    let role = admins
        .add_role(&AdminRole {
            id: "support".into(),
            name: "support".into(),
            permissions,
        })
        .unwrap();
    admins.add_admin("helper", &role.id).unwrap();

    let svc = AdminService::new(admins, accounts);
    let helper = svc.require_admin("helper").unwrap();
    assert!(svc.list_users(&helper, None).unwrap().is_empty());
    assert!(matches!(svc.list_configs(&helper), Err(DomainError::Unauthorized(_))));
    assert!(matches!(
        svc.analytics(&helper, AnalyticsRange::Month),
        Err(DomainError::Unauthorized(_))
    ));
    // A seat already exists, so setup is refused.
    assert!(matches!(svc.setup_first_admin("other"), Err(DomainError::Unauthorized(_))));

    // Reopening the file sees the same admin.
    let reopened = SqliteAdminRepo::new(open(path).unwrap());
    assert!(reopened.get_active_admin("helper").unwrap().is_some());
}
