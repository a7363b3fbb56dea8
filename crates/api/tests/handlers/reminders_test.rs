use axum::http::StatusCode;
use fake::{Fake, faker::internet::en::SafeEmail};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use vitalog_core::models::reminder::{Reminder, Schedule};
use vitalog_db::repositories::ReminderRepository;

use crate::test_utils::TestContext;

fn reminders_path(user_id: &str) -> String {
    format!("/api/users/{}/reminders", user_id)
}

#[tokio::test]
async fn test_create_and_list_reminder() {
    let server = TestContext::new().server();
    let email: String = SafeEmail().fake();

    let response = server
        .post(&reminders_path("user-1"))
        .json(&json!({
            "name": "Metformin",
            "frequency": "weekly",
            "time": "08:30",
            "days_of_week": ["Monday", "Thursday"],
            "email": email
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Reminder = response.json();
    assert_eq!(created.name, "Metformin");
    assert_eq!(created.time_label(), "08:30");
    assert!(matches!(created.schedule, Schedule::Weekly { ref days_of_week } if days_of_week.len() == 2));
    assert!(created.notifications_enabled);
    assert_eq!(created.email.as_deref(), Some(email.as_str()));

    let listed: Vec<Reminder> = server.get(&reminders_path("user-1")).await.json();
    assert_eq!(listed, vec![created]);

    let other: Vec<Reminder> = server.get(&reminders_path("user-2")).await.json();
    assert!(other.is_empty());
}

#[rstest]
#[case(json!({"name": "A", "frequency": "weekly", "time": "08:30"}))]
#[case(json!({"name": "A", "frequency": "daily", "time": "8.30"}))]
#[case(json!({"name": "A", "frequency": "hourly", "time": "08:30"}))]
#[case(json!({"name": "A", "frequency": "daily", "time": "08:30", "days_of_week": ["Monday"]}))]
#[case(json!({"name": "A", "frequency": "specific_date", "time": "08:30"}))]
#[case(json!({"name": "  ", "frequency": "daily", "time": "08:30"}))]
#[tokio::test]
async fn test_create_invalid_reminder_is_rejected(#[case] body: Value) {
    let mut ctx = TestContext::new();
    ctx.chat.expect_send_message().never();
    let store = ctx.store.clone();
    let server = ctx.server();

    server
        .post(&reminders_path("user-1"))
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_reminder() {
    let server = TestContext::new().server();
    let created: Reminder = server
        .post(&reminders_path("user-1"))
        .json(&json!({
            "name": "Warfarin",
            "frequency": "specific_date",
            "time": "21:00",
            "specific_date": "2024-03-10"
        }))
        .await
        .json();
    let path = format!("{}/{}", reminders_path("user-1"), created.id);

    // Another user cannot delete it
    server
        .delete(&format!("{}/{}", reminders_path("user-2"), created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
}
