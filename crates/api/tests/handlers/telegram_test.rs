use std::sync::Arc;

use axum::http::{Method, StatusCode};
use eyre::eyre;
use pretty_assertions::assert_eq;
use vitalog_api::handlers::telegram::{LINKED_CONFIRMATION, handle_inbound_update};
use vitalog_db::repositories::BotRepository;

use crate::test_utils::{MockChat, TestContext, UnreachableBots, start_update};

const WEBHOOK: &str = "/telegram/webhook";

#[test_log::test(tokio::test)]
async fn test_start_with_matching_prefix_binds_chat() {
    let mut ctx = TestContext::new();
    let binding = ctx
        .store
        .create_bot_binding("abc123", "XYZ789:realtoken", "pillbox_bot")
        .await
        .unwrap();
    ctx.chat
        .expect_send_message()
        .times(1)
        .withf(|credential, chat_id, text| {
            credential == "XYZ789:realtoken" && chat_id == "555" && text == LINKED_CONFIRMATION
        })
        .returning(|_, _, _| Ok(()));
    let store = ctx.store.clone();
    let server = ctx.server();

    let response = server
        .post(WEBHOOK)
        .json(&start_update("/start abc123_XYZ789", 555))
        .await;

    response.assert_status(StatusCode::OK);
    let bound = store.get_bot_binding(binding.id).await.unwrap().unwrap();
    assert_eq!(bound.chat_id.as_deref(), Some("555"));
    assert_eq!(bound.chat_handle.as_deref(), Some("ada"));
    let summary = store.get_user_summary("abc123").await.unwrap().unwrap();
    assert_eq!(summary.telegram_chat_id.as_deref(), Some("555"));
}

#[tokio::test]
async fn test_start_with_mismatched_prefix_is_rejected_without_mutation() {
    let mut ctx = TestContext::new();
    let binding = ctx
        .store
        .create_bot_binding("abc123", "ZZZ000:realtoken", "pillbox_bot")
        .await
        .unwrap();
    ctx.chat.expect_send_message().never();
    let store = ctx.store.clone();
    let before = store.bot_bindings().unwrap();
    let server = ctx.server();

    let response = server
        .post(WEBHOOK)
        .json(&start_update("/start abc123_XYZ789", 555))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(store.bot_bindings().unwrap(), before);
    let unbound = store.get_bot_binding(binding.id).await.unwrap().unwrap();
    assert_eq!(unbound.chat_id, None);
}

#[tokio::test]
async fn test_replayed_start_is_idempotent() {
    let mut ctx = TestContext::new();
    let binding = ctx
        .store
        .create_bot_binding("abc123", "XYZ789:realtoken", "pillbox_bot")
        .await
        .unwrap();
    ctx.chat
        .expect_send_message()
        .times(2)
        .returning(|_, _, _| Ok(()));
    let store = ctx.store.clone();
    let server = ctx.server();

    for _ in 0..2 {
        server
            .post(WEBHOOK)
            .json(&start_update("/start abc123_XYZ789", 555))
            .await
            .assert_status(StatusCode::OK);
    }

    let bound = store.get_bot_binding(binding.id).await.unwrap().unwrap();
    assert_eq!(bound.chat_id.as_deref(), Some("555"));
    assert_eq!(store.bot_bindings().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_post_is_rejected() {
    let server = TestContext::new().server();

    server.get(WEBHOOK).await.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_start_message_is_acknowledged() {
    let mut ctx = TestContext::new();
    ctx.chat.expect_send_message().never();
    let server = ctx.server();

    server
        .post(WEBHOOK)
        .json(&start_update("good morning", 555))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_update_without_message_is_acknowledged() {
    let server = TestContext::new().server();

    server
        .post(WEBHOOK)
        .json(&serde_json::json!({ "update_id": 2 }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = TestContext::new().server();

    server
        .post(WEBHOOK)
        .text("not json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_start_without_prefix_is_rejected() {
    let server = TestContext::new().server();

    server
        .post(WEBHOOK)
        .json(&start_update("/start abc123", 555))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_start_for_user_without_bot_is_rejected() {
    let server = TestContext::new().server();

    let response = server
        .post(WEBHOOK)
        .json(&start_update("/start nobody_XYZ789", 555))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("bot not found"));
}

#[tokio::test]
async fn test_failed_confirmation_keeps_binding() {
    let mut ctx = TestContext::new();
    let binding = ctx
        .store
        .create_bot_binding("abc123", "XYZ789:realtoken", "pillbox_bot")
        .await
        .unwrap();
    ctx.chat
        .expect_send_message()
        .times(1)
        .returning(|_, _, _| Err(eyre!("sendMessage returned 403 Forbidden")));
    let store = ctx.store.clone();
    let server = ctx.server();

    server
        .post(WEBHOOK)
        .json(&start_update("/start abc123_XYZ789", 555))
        .await
        .assert_status(StatusCode::OK);

    let bound = store.get_bot_binding(binding.id).await.unwrap().unwrap();
    assert_eq!(bound.chat_id.as_deref(), Some("555"));
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let mut chat = MockChat::new();
    chat.expect_send_message().never();
    let body = serde_json::to_vec(&start_update("/start abc123_XYZ789", 555)).unwrap();

    let result = handle_inbound_update(&UnreachableBots, &chat, &Method::POST, &body).await;

    let status = result.unwrap_err().status();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_user_ids_with_underscores_link() {
    let mut ctx = TestContext::new();
    ctx.store
        .create_bot_binding("user_42", "XYZ789:realtoken", "pillbox_bot")
        .await
        .unwrap();
    ctx.chat.expect_send_message().returning(|_, _, _| Ok(()));
    let store: Arc<_> = ctx.store.clone();
    let server = ctx.server();

    server
        .post(WEBHOOK)
        .json(&start_update("/start user_42_XYZ789", 77))
        .await
        .assert_status(StatusCode::OK);

    let summary = store.get_user_summary("user_42").await.unwrap().unwrap();
    assert_eq!(summary.telegram_chat_id.as_deref(), Some("77"));
}
