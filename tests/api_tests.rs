mod common;

use std::str::FromStr;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use common::build_test_app;
use valore_tracker::store::TrackerStore;
use valore_tracker::tracker::PersistPolicy;

fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, json) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, body) = app.send_text("GET", "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("day_saves_total"));
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, json) = app.send("GET", "/api/months/2024/5", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);

    let (status, _) = app
        .send("GET", "/api/settings", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_requires_credentials() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, json) = app
        .send(
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "ana@example.com", "action": "register" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_register_then_conflict() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let body = json!({
        "email": "ana@example.com",
        "password": "secret",
        "name": "Ana",
        "phone": "11987654321",
        "action": "register",
    });

    let (status, json) = app.send("POST", "/api/auth", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["action"], "register_success");

    let user_id = uuid::Uuid::parse_str(json["userId"].as_str().unwrap()).unwrap();
    let settings = app.store.get_settings(user_id).await.unwrap().unwrap();
    assert_eq!(settings.capital, Decimal::from(100));
    assert_eq!(settings.name.as_deref(), Some("Ana"));

    let (status, json) = app.send("POST", "/api/auth", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "email_exists");
}

#[tokio::test]
async fn test_login_action_is_acknowledged() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, json) = app
        .send(
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "ana@example.com", "password": "x", "action": "login" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"], "login");

    let (status, _) = app
        .send(
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "ana@example.com", "password": "x", "action": "delete" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_succeeds_when_settings_write_fails() {
    let app = build_test_app(PersistPolicy::BestEffort);
    app.store.set_fail_writes(true);

    let (status, json) = app
        .send(
            "POST",
            "/api/auth",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secret", "action": "register" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"], "register_success");
}

#[tokio::test]
async fn test_legacy_register_repairs_existing_user() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let body = json!({ "email": "ana@example.com", "password": "secret", "name": "Ana" });

    let (status, first) = app.send("POST", "/api/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = app
        .send(
            "POST",
            "/api/register",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secret", "name": "Ana Maria" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["userId"], first["userId"]);
    assert!(second["message"].is_string());

    let user_id = uuid::Uuid::parse_str(second["userId"].as_str().unwrap()).unwrap();
    let settings = app.store.get_settings(user_id).await.unwrap().unwrap();
    assert_eq!(settings.name.as_deref(), Some("Ana Maria"));
}

#[tokio::test]
async fn test_create_user_settings_is_idempotent() {
    let app = build_test_app(PersistPolicy::BestEffort);

    let (status, _) = app
        .send("POST", "/api/create-user-settings", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let user_id = uuid::Uuid::new_v4();
    let body = json!({ "userId": user_id });

    let (status, json) = app
        .send("POST", "/api/create-user-settings", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json.get("message").is_none());

    let (status, json) = app
        .send("POST", "/api/create-user-settings", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_sign_in_and_current_session() {
    let app = build_test_app(PersistPolicy::BestEffort);
    app.signed_in_user("ana@example.com").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/session/sign-in",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app
        .send(
            "POST",
            "/api/session/sign-in",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = json["data"]["access_token"].as_str().unwrap().to_string();

    let (status, json) = app.send("GET", "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "ana@example.com");

    let (status, _) = app
        .send("POST", "/api/session/sign-out", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_month_starts_as_placeholders() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, json) = app.send("GET", "/api/months/2024/2", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let view = &json["data"];
    let days = view["days"].as_array().unwrap();
    assert_eq!(days.len(), 29);
    assert_eq!(days[0]["date"], "01/02/2024");
    assert!(days.iter().all(|d| d["opening_value"].is_null()));
    assert_eq!(view["summary"]["total_operations"], 0);
    assert_eq!(view["persisted"], false);
}

#[tokio::test]
async fn test_invalid_month_and_day_are_rejected() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, _) = app.send("GET", "/api/months/2024/13", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "PUT",
            "/api/months/2023/2/days/29",
            Some(&token),
            Some(json!({ "opening_value": "100", "closing_value": "110" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_day_edits_recompute_summary() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, json) = app
        .send(
            "PUT",
            "/api/months/2024/5/days/1",
            Some(&token),
            Some(json!({ "opening_value": "100", "closing_value": "110" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["report"]["entries"]["status"], "saved");

    let (status, json) = app
        .send(
            "PUT",
            "/api/months/2024/5/days/2",
            Some(&token),
            Some(json!({ "opening_value": "110", "closing_value": "100" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let summary = &json["data"]["view"]["summary"];
    assert_eq!(summary["total_operations"], 2);
    assert_eq!(summary["profit_days"], 1);
    assert_eq!(summary["loss_days"], 1);
    assert_eq!(dec(&summary["total_profit"]), Decimal::ZERO);
    assert_eq!(summary["best_day"]["day"], 1);
    assert_eq!(dec(&summary["best_day"]["profit"]), Decimal::from(10));
    assert_eq!(summary["worst_day"]["day"], 2);
    assert_eq!(dec(&summary["worst_day"]["profit"]), Decimal::from(-10));

    let (status, json) = app
        .send("GET", "/api/months/2024/5/summary", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_operations"], 2);

    let (_, json) = app.send("GET", "/api/months/2024/5", Some(&token), None).await;
    let day1 = &json["data"]["days"][0];
    assert_eq!(dec(&day1["closing_value"]), Decimal::from(110));
    assert_eq!(json["data"]["persisted"], true);
}

#[tokio::test]
async fn test_reset_month_clears_summary() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    app.send(
        "PUT",
        "/api/months/2024/5/days/3",
        Some(&token),
        Some(json!({ "opening_value": "100", "closing_value": "105" })),
    )
    .await;

    let (status, json) = app
        .send("POST", "/api/months/2024/5/reset", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["report"]["summary"]["status"], "cleared");
    assert_eq!(json["data"]["view"]["summary"]["total_operations"], 0);

    let (status, _) = app
        .send("GET", "/api/months/2024/5/summary", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_best_effort_reports_store_failure() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;
    app.store.set_fail_writes(true);

    let (status, json) = app
        .send(
            "PUT",
            "/api/months/2024/5/days/1",
            Some(&token),
            Some(json!({ "opening_value": "100", "closing_value": "110" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["report"]["entries"]["status"], "failed");
    assert_eq!(json["data"]["view"]["summary"]["total_operations"], 1);
}

#[tokio::test]
async fn test_out_of_range_day_values_are_rejected() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, json) = app
        .send(
            "PUT",
            "/api/months/2024/5/days/1",
            Some(&token),
            Some(json!({
                "opening_value": "0.0000000000000000000000000001",
                "closing_value": "79228162514264337593543950335",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = app.send("GET", "/api/months/2024/5", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_strict_policy_surfaces_store_failure() {
    let app = build_test_app(PersistPolicy::Strict);
    let token = app.signed_in_user("ana@example.com").await;
    app.store.set_fail_writes(true);

    let (status, json) = app
        .send(
            "PUT",
            "/api/months/2024/5/days/1",
            Some(&token),
            Some(json!({ "opening_value": "100", "closing_value": "110" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, json) = app.send("GET", "/api/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&json["data"]["capital"]), Decimal::from(100));

    let (status, _) = app
        .send("PUT", "/api/settings", Some(&token), Some(json!({ "capital": "0" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .send(
            "PUT",
            "/api/settings",
            Some(&token),
            Some(json!({ "capital": "250", "target": "8" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&json["data"]["capital"]), Decimal::from(250));
    assert_eq!(dec(&json["data"]["entry"]), Decimal::from(5));
    assert_eq!(dec(&json["data"]["target"]), Decimal::from(8));

    let (_, json) = app.send("GET", "/api/months/2024/5", Some(&token), None).await;
    assert_eq!(dec(&json["data"]["capital"]), Decimal::from(250));
}

#[tokio::test]
async fn test_profile_update_formats_phone() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, json) = app
        .send(
            "PUT",
            "/api/profile",
            Some(&token),
            Some(json!({ "name": " Ana ", "phone": "11987654321" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Ana");
    assert_eq!(json["data"]["phone"], "(11) 98765-4321");

    let (_, json) = app.send("GET", "/api/session", Some(&token), None).await;
    assert_eq!(json["data"]["user_metadata"]["phone"], "(11) 98765-4321");
}

#[tokio::test]
async fn test_password_change_checks_current_password() {
    let app = build_test_app(PersistPolicy::BestEffort);
    let token = app.signed_in_user("ana@example.com").await;

    let (status, _) = app
        .send(
            "PUT",
            "/api/profile/password",
            Some(&token),
            Some(json!({
                "current_password": "secret",
                "new_password": "better",
                "confirm_password": "different",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .send(
            "PUT",
            "/api/profile/password",
            Some(&token),
            Some(json!({
                "current_password": "wrong",
                "new_password": "better",
                "confirm_password": "better",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "current password is incorrect");

    let (status, _) = app
        .send(
            "PUT",
            "/api/profile/password",
            Some(&token),
            Some(json!({
                "current_password": "secret",
                "new_password": "better",
                "confirm_password": "better",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/api/session/sign-in",
            None,
            Some(json!({ "email": "ana@example.com", "password": "better" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
