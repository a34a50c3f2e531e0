mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tradepilot::api::router;

fn app() -> Router {
    router(Arc::new(common::setup()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, user: &str) -> Request<Body> {
    Request::get(uri).header("x-user-id", user).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_quotes_requires_symbols() {
    let app = app();
    let (status, body) = send(&app, get("/api/market/quotes")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Symbols parameter is required");

    let (status, _) = send(&app, get("/api/market/quotes?symbols=,")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/market/quotes?symbols=aapl,msft")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["symbol"], "AAPL");
    assert_eq!(body[1]["symbol"], "MSFT");
    assert!(body[0]["changePercent"].is_number());
}

#[tokio::test]
async fn test_market_endpoints() {
    let app = app();

    let (status, body) = send(&app, get("/api/market/quote/tsla")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "TSLA");

    let (status, body) = send(&app, get("/api/market/historical/AAPL?period=5d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);

    let (status, _) = send(&app, get("/api/market/historical/AAPL?period=forever")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/market/news?symbols=NVDA&limit=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, _) = send(&app, get("/api/market/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = send(&app, get("/api/market/search?q=tesla")).await;
    assert_eq!(body[0]["symbol"], "TSLA");
    assert_eq!(body[0]["type"], "stock");

    let (status, body) = send(&app, get("/api/market/indicators/AAPL")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["bollinger"]["upper"].is_number());

    let (status, body) = send(&app, get("/api/market/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "America/New_York");
}

#[tokio::test]
async fn test_stream_requires_symbols() {
    let (status, _) = send(&app(), get("/api/market/stream")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_learning_mode() {
    let app = app();
    let request = json_request(
        "POST",
        "/api/chat",
        None,
        json!({ "message": "Teach me technical analysis", "mode": "learning" }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], common::CANNED_REPLY);
    assert_eq!(body["learningData"]["topic"], "Technical Analysis");
    assert_eq!(body["learningData"]["progress"], 10);

    // The turn is tracked as a learning session for the demo user.
    let (_, sessions) = send(&app, get("/api/chat/sessions")).await;
    assert_eq!(sessions[0]["topic"], "Technical Analysis");
    assert_eq!(sessions[0]["interactions"], 1);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let request = json_request("POST", "/api/chat", None, json!({ "message": "" }));
    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_knowledge_profile_flow() {
    let app = app();

    let (status, body) = send(&app, get("/api/knowledge/profile")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Demo Trader");

    let (status, _) = send(&app, get_as("/api/knowledge/profile", "u1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let update = json_request(
        "PUT",
        "/api/knowledge/profile",
        Some("u1"),
        json!({ "name": "Ada", "riskTolerance": "aggressive" }),
    );
    let (status, body) = send(&app, update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let (_, body) = send(&app, get_as("/api/knowledge/profile", "u1")).await;
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["riskTolerance"], "aggressive");
}

#[tokio::test]
async fn test_patterns_are_scoped_to_caller() {
    let app = app();
    let create = json_request(
        "POST",
        "/api/knowledge/patterns",
        Some("u1"),
        json!({ "patternType": "exit", "description": "Trails stops", "successRate": 40.0 }),
    );
    let (status, body) = send(&app, create).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], "u1");
    let id = body["id"].as_str().unwrap().to_string();

    let patch = json_request(
        "PATCH",
        &format!("/api/knowledge/patterns/{id}"),
        Some("u2"),
        json!({ "successRate": 90.0 }),
    );
    let (status, _) = send(&app, patch).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, alerts) = send(&app, get_as("/api/knowledge/recommendations", "u1")).await;
    assert_eq!(alerts["riskAlerts"][0], "Review Trails stops - low success rate");
}

#[tokio::test]
async fn test_preferences_category_filter() {
    let app = app();
    let put = json_request(
        "PUT",
        "/api/knowledge/preferences",
        None,
        json!({ "category": "ui", "key": "theme", "value": "dark" }),
    );
    let (status, _) = send(&app, put).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/knowledge/preferences?category=ui")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (status, _) = send(&app, get("/api/knowledge/preferences?category=colour")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_learning_endpoints() {
    let app = app();

    let (_, body) = send(&app, get("/api/learning/concepts?difficulty=advanced")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "options-basics");

    let (status, _) = send(&app, get("/api/learning/concepts/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let quiz = json_request(
        "POST",
        "/api/learning/concepts/basics-intro/quiz",
        Some("u1"),
        json!({ "questionId": "q1", "answer": 0 }),
    );
    let (status, body) = send(&app, quiz).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correct"], true);
    assert_eq!(body["score"], 100);

    let complete = json_request(
        "POST",
        "/api/learning/concepts/basics-intro/complete",
        Some("u1"),
        json!({ "score": 95 }),
    );
    let (_, body) = send(&app, complete).await;
    assert_eq!(body["status"], "mastered");

    let (_, body) = send(&app, get_as("/api/learning/progress", "u1")).await;
    assert_eq!(body["overall"]["masteredConcepts"], 1);
    assert_eq!(body["concepts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sandbox_patch_and_sync() {
    let app = app();
    let patch = json_request("PATCH", "/api/sandbox", None, json!({ "notes": ["Hedge with puts"] }));
    let (status, body) = send(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sandboxData"]["notes"][0], "Hedge with puts");
    assert_eq!(body["sandboxData"]["positions"].as_array().unwrap().len(), 3);

    let sync = json_request("POST", "/api/sandbox/sync", None, json!({}));
    let (status, body) = send(&app, sync).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sandboxData"]["watchlist"], json!(["AAPL", "GOOGL", "TSLA", "SPY"]));

    let sync = json_request("POST", "/api/sandbox/sync", Some("stranger"), json!({}));
    let (status, _) = send(&app, sync).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sandbox_patch_broadcasts_once() {
    let pilot = Arc::new(common::setup());
    let mut rx = pilot.sandbox().subscribe("demo-user").unwrap();
    let app = router(pilot.clone());

    let patch = json_request("PATCH", "/api/sandbox", None, json!({ "notes": ["Scale out"] }));
    let (status, _) = send(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rx.try_recv().unwrap().sandbox_data.notes, vec!["Scale out"]);
    assert!(rx.try_recv().is_err());

    let patch = json_request(
        "PATCH",
        "/api/sandbox",
        None,
        json!({
            "userPreferences": { "theme": "light", "notifications": false, "riskLevel": "moderate" },
            "watchlist": ["SPY"]
        }),
    );
    let (status, body) = send(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userPreferences"]["theme"], "light");
    assert_eq!(body["sandboxData"]["watchlist"], json!(["SPY"]));
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());

    let empty = json_request("PATCH", "/api/sandbox", None, json!({}));
    let (status, _) = send(&app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_profile_requires_identity() {
    let app = app();
    let (status, body) = send(&app, get("/api/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let create = json_request(
        "POST",
        "/api/profile",
        Some("u1"),
        json!({ "email": "ada@example.com", "displayName": "Ada" }),
    );
    let (status, _) = send(&app, create).await;
    assert_eq!(status, StatusCode::CREATED);

    let assistant = json_request("PUT", "/api/profile/assistant", Some("u1"), json!({ "assistant": "apex" }));
    let (status, body) = send(&app, assistant).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selectedAiAssistant"], "Apex");

    let (_, personas) = send(&app, get("/api/assistants")).await;
    assert_eq!(personas.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_admin_routes_need_admin() {
    let app = app();

    let (status, _) = send(&app, get("/api/admin/users")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, get_as("/api/admin/users", "boss")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let setup = json_request("POST", "/api/admin/setup", Some("boss"), json!({}));
    let (status, _) = send(&app, setup).await;
    assert_eq!(status, StatusCode::CREATED);

    let create = json_request(
        "POST",
        "/api/admin/assistant-configs",
        Some("boss"),
        json!({ "name": "Friday" }),
    );
    let (status, body) = send(&app, create).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["maxTokens"], 1000);
    let id = body["id"].as_str().unwrap().to_string();

    let delete = Request::delete(format!("/api/admin/assistant-configs/{id}"))
        .header("x-user-id", "boss")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get_as("/api/admin/analytics?range=30d", "boss")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["range"], "30d");
    assert_eq!(body["userGrowth"].as_array().unwrap().len(), 30);

    let (status, _) = send(&app, get_as("/api/admin/analytics?range=1y", "boss")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_learning_path_lookup() {
    let app = app();
    let (status, body) = send(&app, get("/api/learning/paths/advanced-path")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Advanced Strategies");
    assert_eq!(body["concepts"], json!(["market-psychology", "options-basics"]));

    let (status, body) = send(&app, get("/api/learning/paths/expert-path")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Learning path expert-path not found");
}

#[tokio::test]
async fn test_generate_is_one_shot() {
    let app = app();
    let request = json_request(
        "POST",
        "/api/ai/generate",
        None,
        json!({ "message": "Define beta", "mode": "learning" }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], common::CANNED_REPLY);

    let blank = json_request("POST", "/api/ai/generate", None, json!({ "message": " " }));
    let (status, _) = send(&app, blank).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_me() {
    let app = app();
    let (status, _) = send(&app, get("/api/admin/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, get_as("/api/admin/me", "boss")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let setup = json_request("POST", "/api/admin/setup", Some("boss"), json!({}));
    send(&app, setup).await;

    let (status, body) = send(&app, get_as("/api/admin/me", "boss")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "boss");
    assert_eq!(body["role"]["name"], "super_admin");
    assert!(body["role"]["permissions"]["admins"]
        .as_array()
        .unwrap()
        .contains(&json!("delete")));
}

#[tokio::test]
async fn test_training_flow() {
    let app = app();

    let (_, scenarios) = send(&app, get("/api/training/scenarios")).await;
    assert_eq!(scenarios.as_array().unwrap().len(), 3);
    assert_eq!(scenarios[1]["marketCondition"], "volatile");

    let (status, _) = send(&app, get("/api/training/session")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let start = json_request("POST", "/api/training/start", None, json!({ "scenarioId": "missing" }));
    let (status, _) = send(&app, start).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let start = json_request("POST", "/api/training/start", None, json!({ "scenarioId": "trend-following" }));
    let (status, body) = send(&app, start).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["scenario"]["initialBalance"], 10000.0);

    let pause = json_request("POST", "/api/training/pause", None, json!({}));
    let (_, body) = send(&app, pause).await;
    assert_eq!(body["isActive"], false);

    let order = json!({ "symbol": "AAPL", "type": "buy", "quantity": 2, "orderType": "limit", "limitPrice": 150.0 });
    let (status, body) = send(&app, json_request("POST", "/api/training/trade", None, order)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trades"][0]["type"], "buy");
    assert_eq!(body["balance"], 9700.0);

    let order = json!({ "symbol": "GOOGL", "type": "buy", "quantity": 1000 });
    let (status, body) = send(&app, json_request("POST", "/api/training/trade", None, order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input: Insufficient funds"));

    let (_, metrics) = send(&app, get("/api/training/performance")).await;
    assert_eq!(metrics["totalTrades"], 1);
    assert_eq!(metrics["positions"]["AAPL"]["quantity"], 2);

    let (_, hint) = send(&app, get("/api/training/hint")).await;
    assert!(hint["hint"].as_str().unwrap().starts_with("Hint:"));

    // Sessions belong to the caller.
    let (status, _) = send(&app, get_as("/api/training/session", "u1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
