mod test_utils;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;
use uuid::Uuid;

async fn spawn() -> Option<TestApp> {
    TestApp::spawn(Arc::new(RecordingMailer::default())).await
}

#[actix_rt::test]
async fn register_user_returns_201_for_valid_input() {
    let Some(app) = spawn().await else { return };
    let tag = Uuid::new_v4().simple().to_string();

    let response = app.client
        .post(app.url("/api/v1/auth/register/"))
        .json(&json!({
            "email": format!("new-{}@example.com", tag),
            "username": format!("new-{}", tag),
            "password": "Correct-Horse-42-Battery"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn login_returns_tokens_and_sets_cookie() {
    let Some(app) = spawn().await else { return };
    let credentials = app.insert_user(false).await;

    let response = app.client
        .post(app.url("/api/v1/auth/login/"))
        .json(&credentials)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with("access_token="))
        .map(String::from);
    assert!(cookie.is_some_and(|c| c.contains("HttpOnly")));

    let auth: Value = response.json().await.unwrap();
    assert_eq!(auth["token_type"], "Bearer");
    assert!(!auth["refresh_token"].as_str().unwrap().is_empty());
}

#[actix_rt::test]
async fn me_endpoint_returns_user_data() {
    let Some(app) = spawn().await else { return };
    let credentials = app.insert_user(false).await;
    let auth = app.login_user(&credentials).await;

    let response = app.client
        .get(app.url("/api/v1/users/me/"))
        .bearer_auth(&auth.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["email"], credentials.email);
    assert_eq!(user["full_name"], "Ada Lovelace");
}

#[actix_rt::test]
async fn protected_endpoints_require_auth() {
    let Some(app) = spawn().await else { return };

    let response = app.client.get(app.url("/api/v1/users/me/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn wrong_password_is_unauthorized() {
    let Some(app) = spawn().await else { return };
    let mut credentials = app.insert_user(false).await;
    credentials.password = "WrongPass123!".into();

    let response = app.client
        .post(app.url("/api/v1/auth/login/"))
        .json(&credentials)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn admin_api_requires_admin_claim() {
    let Some(app) = spawn().await else { return };
    let credentials = app.insert_user(false).await;
    let auth = app.login_user(&credentials).await;

    let response = app.client
        .get(app.url("/api/v1/admin/blogs/"))
        .bearer_auth(&auth.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
