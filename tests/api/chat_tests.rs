//! AI Chat API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use chat_backend::application::services::SYSTEM_PROMPT;
use chat_backend::domain::ChatRole;
use chat_backend::infrastructure::completion::CompletionError;

use crate::common::TestApp;

#[tokio::test]
async fn test_create_chat_stores_both_turns_with_short_title() {
    let app = TestApp::new();
    let user = app.register().await;
    app.completion.push_reply("Hi! How can I help?");

    let (status, body) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "Hello" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], "Hi! How can I help?");

    let chat = app
        .store
        .chat(body["chat_id"].as_str().unwrap().parse().unwrap())
        .unwrap();
    assert_eq!(chat.title, "Hello");
    assert_eq!(chat.message_count, 2);
    assert_eq!(chat.user_id, user.id);
}

#[tokio::test]
async fn test_long_first_message_truncates_title() {
    let app = TestApp::new();
    let user = app.register().await;
    let message = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";

    let (_, body) = app
        .post("/api/v1/chat", &user.token, json!({ "message": message }))
        .await;

    let chat = app
        .store
        .chat(body["chat_id"].as_str().unwrap().parse().unwrap())
        .unwrap();
    assert_eq!(chat.title, format!("{}...", &message[..30]));
}

#[tokio::test]
async fn test_thirty_japanese_characters_are_not_truncated() {
    let app = TestApp::new();
    let user = app.register().await;
    let message = "あ".repeat(30);

    let (_, body) = app
        .post("/api/v1/chat", &user.token, json!({ "message": message }))
        .await;

    let chat = app
        .store
        .chat(body["chat_id"].as_str().unwrap().parse().unwrap())
        .unwrap();
    assert_eq!(chat.title, message);
}

#[tokio::test]
async fn test_completion_failure_persists_nothing() {
    let app = TestApp::new();
    let user = app.register().await;
    app.completion
        .push_failure(CompletionError::Unreachable("connection refused".into()));

    let (status, _) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "Hello" }))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.store.chat_count(), 0);
    assert_eq!(app.store.chat_message_count(), 0);
}

#[tokio::test]
async fn test_follow_up_sends_history_and_appends_pair() {
    let app = TestApp::new();
    let user = app.register().await;
    app.completion.push_reply("first reply");
    app.completion.push_reply("second reply");

    let (_, created) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "first question" }))
        .await;
    let chat_id = created["chat_id"].as_str().unwrap().to_string();

    let (status, reply) = app
        .post(
            &format!("/api/v1/chat/{}", chat_id),
            &user.token,
            json!({ "message": "second question" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["role"], "assistant");
    assert_eq!(reply["content"], "second reply");

    let requests = app.completion.requests();
    assert_eq!(requests.len(), 2);
    let follow_up = &requests[1];
    assert_eq!(follow_up.system, SYSTEM_PROMPT);
    let turns: Vec<(ChatRole, &str)> = follow_up
        .turns
        .iter()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (ChatRole::User, "first question"),
            (ChatRole::Assistant, "first reply"),
            (ChatRole::User, "second question"),
        ]
    );

    let (status, chat) = app
        .get(&format!("/api/v1/chat/{}", chat_id), &user.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = chat["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(
        contents,
        vec!["first question", "first reply", "second question", "second reply"]
    );
    assert_eq!(app.store.chat(chat_id.parse().unwrap()).unwrap().message_count, 4);
}

#[tokio::test]
async fn test_failed_follow_up_leaves_chat_unchanged() {
    let app = TestApp::new();
    let user = app.register().await;

    let (_, created) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "question" }))
        .await;
    let chat_id = created["chat_id"].as_str().unwrap().to_string();
    app.completion
        .push_failure(CompletionError::RequestFailed("HTTP 500".into()));

    let (status, _) = app
        .post(
            &format!("/api/v1/chat/{}", chat_id),
            &user.token,
            json!({ "message": "another" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.store.chat_message_count(), 2);
    assert_eq!(app.store.chat(chat_id.parse().unwrap()).unwrap().message_count, 2);
}

#[tokio::test]
async fn test_other_users_chat_is_not_found() {
    let app = TestApp::new();
    let owner = app.register().await;
    let intruder = app.register().await;

    let (_, created) = app
        .post("/api/v1/chat", &owner.token, json!({ "message": "private thoughts" }))
        .await;
    let uri = format!("/api/v1/chat/{}", created["chat_id"].as_str().unwrap());

    let (status, _) = app.get(&uri, &intruder.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(&uri, &intruder.token, json!({ "message": "peek" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.chat_message_count(), 2);
}

#[tokio::test]
async fn test_history_lists_own_chats_most_recent_first() {
    let app = TestApp::new();
    let user = app.register().await;
    let other = app.register().await;

    let (_, older) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "older chat" }))
        .await;
    let (_, newer) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "newer chat" }))
        .await;
    app.post("/api/v1/chat", &other.token, json!({ "message": "not mine" }))
        .await;

    // Continuing the older chat moves it to the top
    app.post(
        &format!("/api/v1/chat/{}", older["chat_id"].as_str().unwrap()),
        &user.token,
        json!({ "message": "bump" }),
    )
    .await;

    let (status, history) = app.get("/api/v1/chat/history", &user.token).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            older["chat_id"].as_str().unwrap(),
            newer["chat_id"].as_str().unwrap(),
        ]
    );
    assert_eq!(history[0]["first_message"], "older chat");
    assert_eq!(history[0]["message_count"], 4);
}

#[tokio::test]
async fn test_blank_chat_message_is_rejected() {
    let app = TestApp::new();
    let user = app.register().await;

    let (status, _) = app
        .post("/api/v1/chat", &user.token, json!({ "message": "" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.completion.requests().is_empty());
}
