use chrono::{Duration, NaiveDate, Utc, Weekday};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio_test::assert_ok;
use uuid::Uuid;
use vitalog_core::{
    errors::HealthError,
    models::reminder::{Reminder, Schedule},
};
use vitalog_db::{
    mock::memory::InMemoryStore,
    models::{DbBotBinding, DbReminder, NewReminder},
    repositories::{BotRepository, ReminderRepository},
};

fn row(frequency: &str, time: &str, days: &[&str], date: Option<NaiveDate>) -> DbReminder {
    DbReminder {
        id: Uuid::new_v4(),
        user_id: "abc123".to_string(),
        name: "Atorvastatin".to_string(),
        frequency: frequency.to_string(),
        time: time.to_string(),
        days_of_week: days.iter().map(|d| d.to_string()).collect(),
        specific_date: date,
        email: None,
        notifications_enabled: true,
        telegram_notifications_enabled: false,
        telegram_chat_id: None,
        created_at: Utc::now(),
    }
}

#[test]
fn test_decode_weekly_row() {
    let reminder = Reminder::try_from(row("weekly", "09:00", &["Monday", "friday"], None))
        .expect("row should decode");

    assert_eq!(
        reminder.schedule,
        Schedule::Weekly {
            days_of_week: vec![Weekday::Mon, Weekday::Fri]
        }
    );
}

#[rstest]
#[case(row("hourly", "09:00", &[], None))]
#[case(row("weekly", "09:00", &[], None))]
#[case(row("specific_date", "09:00", &[], None))]
#[case(row("daily", "9am", &[], None))]
#[case(row("daily", "25:00", &[], None))]
fn test_decode_rejects_malformed_rows(#[case] bad: DbReminder) {
    let id = bad.id;

    match Reminder::try_from(bad) {
        Err(HealthError::Data(message)) => assert!(message.contains(&id.to_string())),
        other => panic!("Expected Data error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_reminders_listed_newest_first() {
    let store = InMemoryStore::new();
    let mut older = row("daily", "08:00", &[], None);
    older.created_at = Utc::now() - Duration::days(1);
    let newer = row("daily", "20:00", &[], None);
    assert_ok!(store.insert_reminder(older.clone()));
    assert_ok!(store.insert_reminder(newer.clone()));

    let listed = store.list_for_user("abc123").await.unwrap();

    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn test_create_and_delete_reminder() {
    let store = InMemoryStore::new();
    let created = store
        .create(&NewReminder {
            user_id: "abc123".to_string(),
            name: "Insulin".to_string(),
            schedule: Schedule::SpecificDate {
                specific_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            },
            time: "07:15".to_string(),
            email: Some("me@example.com".to_string()),
            notifications_enabled: true,
            telegram_notifications_enabled: false,
            telegram_chat_id: None,
        })
        .await
        .unwrap();

    assert_eq!(created.frequency, "specific_date");
    assert!(!store.delete("someone-else", created.id).await.unwrap());
    assert!(store.delete("abc123", created.id).await.unwrap());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_newest_binding_is_active() {
    let store = InMemoryStore::new();

    let first = store
        .create_bot_binding("abc123", "111:first", "first_bot")
        .await
        .unwrap();
    let second = store
        .create_bot_binding("abc123", "222:second", "second_bot")
        .await
        .unwrap();

    let bindings = store.list_bot_bindings("abc123").await.unwrap();
    let active: Vec<_> = bindings.iter().filter(|b| b.is_active).map(|b| b.id).collect();
    assert_eq!(active, vec![second.id]);

    let summary = store.get_user_summary("abc123").await.unwrap().unwrap();
    assert_eq!(summary.active_bot_id, Some(second.id));
    assert_eq!(summary.telegram_bot_token.as_deref(), Some("222:second"));
    assert_ne!(summary.active_bot_id, Some(first.id));
}

#[tokio::test]
async fn test_activate_switches_mirror() {
    let store = InMemoryStore::new();
    let first = store
        .create_bot_binding("abc123", "111:first", "first_bot")
        .await
        .unwrap();
    store
        .bind_chat("abc123", first.id, "5550001", Some("alice"))
        .await
        .unwrap();
    store
        .create_bot_binding("abc123", "222:second", "second_bot")
        .await
        .unwrap();

    let activated = store
        .activate_bot_binding("abc123", first.id)
        .await
        .unwrap()
        .expect("binding belongs to user");

    assert!(activated.is_active);
    let summary = store.get_user_summary("abc123").await.unwrap().unwrap();
    assert_eq!(summary.active_bot_id, Some(first.id));
    assert_eq!(summary.telegram_chat_id.as_deref(), Some("5550001"));
    assert!(
        store
            .activate_bot_binding("intruder", first.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_deleting_active_binding_promotes_newest_remaining() {
    let store = InMemoryStore::new();
    let now = Utc::now();
    for (offset, token) in [(3, "111:a"), (2, "222:b")] {
        store
            .insert_bot_binding(DbBotBinding {
                id: Uuid::new_v4(),
                user_id: "abc123".to_string(),
                bot_token: token.to_string(),
                bot_username: "bot".to_string(),
                chat_id: None,
                chat_handle: None,
                created_at: now - Duration::hours(offset),
                is_active: false,
            })
            .unwrap();
    }
    let active = store
        .create_bot_binding("abc123", "333:c", "bot_c")
        .await
        .unwrap();

    assert!(store.delete_bot_binding("abc123", active.id).await.unwrap());

    let summary = store.get_user_summary("abc123").await.unwrap().unwrap();
    assert_eq!(summary.telegram_bot_token.as_deref(), Some("222:b"));
    let bindings = store.list_bot_bindings("abc123").await.unwrap();
    assert_eq!(bindings.iter().filter(|b| b.is_active).count(), 1);
}

#[tokio::test]
async fn test_deleting_last_binding_clears_mirror() {
    let store = InMemoryStore::new();
    let only = store
        .create_bot_binding("abc123", "111:a", "bot_a")
        .await
        .unwrap();

    assert!(store.delete_bot_binding("abc123", only.id).await.unwrap());

    let summary = store.get_user_summary("abc123").await.unwrap().unwrap();
    assert_eq!(summary.active_bot_id, None);
    assert_eq!(summary.telegram_bot_token, None);
}

#[tokio::test]
async fn test_bind_chat_unknown_binding_fails() {
    let store = InMemoryStore::new();

    let result = store.bind_chat("abc123", Uuid::new_v4(), "1", None).await;

    assert!(result.is_err());
}
