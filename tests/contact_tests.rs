mod test_utils;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;
use uuid::Uuid;

fn unique_email() -> String {
    format!("sender-{}@example.com", Uuid::new_v4().simple())
}

#[actix_rt::test]
async fn delivered_message_is_stored_and_forwarded() {
    let mailer = RecordingMailer::default();
    let Some(app) = TestApp::spawn(Arc::new(mailer.clone())).await else { return };
    let email = unique_email();

    let response = app
        .site_post(&Visitor::new(), "/contact/submit/")
        .json(&json!({"name": "Ada", "email": email, "subject": "Hi", "message": "Hello there"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "message": "Message sent successfully!"}));
    assert_eq!(app.messages_from(&email).await, 1);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["owner@example.com".to_string()]);
    assert_eq!(sent[0].reply_to.as_deref(), Some(email.as_str()));
    assert_eq!(sent[0].subject, "Hi");
}

#[actix_rt::test]
async fn failed_delivery_keeps_the_message() {
    let Some(app) = TestApp::spawn(Arc::new(FailingMailer)).await else { return };
    let email = unique_email();

    let response = app
        .site_post(&Visitor::new(), "/contact/")
        .form(&[("name", "Ada"), ("email", email.as_str()), ("message", "Hello there")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["saved"], true);
    assert_eq!(app.messages_from(&email).await, 1);
}

#[actix_rt::test]
async fn invalid_submission_is_rejected_before_storage() {
    let mailer = RecordingMailer::default();
    let Some(app) = TestApp::spawn(Arc::new(mailer.clone())).await else { return };

    let response = app
        .site_post(&Visitor::new(), "/contact/submit/")
        .json(&json!({"name": "", "email": "not-an-email", "message": "Hi"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["name"].is_array());
    assert_eq!(body["errors"]["email"][0], "Enter a valid email address.");
    assert_eq!(app.messages_from("not-an-email").await, 0);
    assert!(mailer.sent().is_empty());
}
