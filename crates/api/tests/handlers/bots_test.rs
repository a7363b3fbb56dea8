use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vitalog_core::models::bot::{BotBindingResponse, DeepLinkResponse};

use crate::test_utils::TestContext;

fn bots_path(user_id: &str) -> String {
    format!("/api/users/{}/bots", user_id)
}

async fn create_bot(server: &axum_test::TestServer, token: &str, username: &str) -> BotBindingResponse {
    let response = server
        .post(&bots_path("abc123"))
        .json(&json!({ "bot_token": token, "bot_username": username }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_newest_bot_is_active_and_token_hidden() {
    let server = TestContext::new().server();
    let first = create_bot(&server, "AAA111:first", "first_bot").await;
    let second = create_bot(&server, "XYZ789:realtoken", "@second_bot").await;

    let listed: Vec<Value> = server.get(&bots_path("abc123")).await.json();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], json!(second.id));
    assert_eq!(listed[0]["is_active"], json!(true));
    assert_eq!(listed[0]["bot_username"], json!("second_bot"));
    assert_eq!(listed[1]["id"], json!(first.id));
    assert_eq!(listed[1]["is_active"], json!(false));
    assert!(listed.iter().all(|bot| bot.get("bot_token").is_none()));
}

#[tokio::test]
async fn test_activate_switches_active_bot() {
    let server = TestContext::new().server();
    let first = create_bot(&server, "AAA111:first", "first_bot").await;
    let second = create_bot(&server, "XYZ789:realtoken", "second_bot").await;

    let activated: BotBindingResponse = server
        .put(&format!("{}/{}/activate", bots_path("abc123"), first.id))
        .await
        .json();
    assert!(activated.is_active);

    let listed: Vec<BotBindingResponse> = server.get(&bots_path("abc123")).await.json();
    let active: Vec<_> = listed.iter().filter(|b| b.is_active).map(|b| b.id).collect();
    assert_eq!(active, vec![first.id]);
    assert!(listed.iter().any(|b| b.id == second.id && !b.is_active));
}

#[tokio::test]
async fn test_activate_unknown_bot_is_not_found() {
    let server = TestContext::new().server();

    server
        .put(&format!("{}/{}/activate", bots_path("abc123"), uuid::Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_link_carries_credential_prefix() {
    let server = TestContext::new().server();
    let bot = create_bot(&server, "XYZ789:realtoken", "pillbox_bot").await;

    let link: DeepLinkResponse = server.get(&format!("{}/link", bots_path("abc123"))).await.json();

    assert_eq!(link.bot_id, bot.id);
    assert_eq!(link.url, "https://t.me/pillbox_bot?start=abc123_XYZ789");
}

#[tokio::test]
async fn test_link_without_bot_is_not_found() {
    let server = TestContext::new().server();

    server
        .get(&format!("{}/link", bots_path("abc123")))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_active_bot_promotes_newest_remaining() {
    let server = TestContext::new().server();
    let first = create_bot(&server, "AAA111:first", "first_bot").await;
    let second = create_bot(&server, "XYZ789:realtoken", "second_bot").await;

    server
        .delete(&format!("{}/{}", bots_path("abc123"), second.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed: Vec<BotBindingResponse> = server.get(&bots_path("abc123")).await.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.id);
    assert!(listed[0].is_active);
}

#[tokio::test]
async fn test_create_bot_requires_token() {
    let server = TestContext::new().server();

    server
        .post(&bots_path("abc123"))
        .json(&json!({ "bot_token": " ", "bot_username": "pillbox_bot" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
