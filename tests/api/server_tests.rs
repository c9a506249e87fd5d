//! Server, Channel and Category API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use chat_backend::domain::MemberRole;

use crate::common::TestApp;

fn channel_names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_server_makes_owner_and_general_channel() {
    let app = TestApp::new();
    let owner = app.register().await;

    let server_id = app.create_server(&owner, "Rustaceans").await;

    assert_eq!(
        app.store.role_of(server_id.parse().unwrap(), owner.id),
        Some(MemberRole::Owner)
    );

    let (status, channels) = app
        .get(&format!("/api/v1/servers/{}/channels", server_id), &owner.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(channel_names(&channels), vec!["general"]);
    assert_eq!(channels[0]["is_private"], false);

    // Owner can manage channels right away
    let (status, _) = app
        .post(
            &format!("/api/v1/servers/{}/channels", server_id),
            &owner.token,
            json!({ "name": "announcements" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_list_servers_reports_member_count() {
    let app = TestApp::new();
    let owner = app.register().await;
    let guest = app.register().await;
    let server_id = app.create_server(&owner, "Book Club").await;
    app.join(&guest, &server_id).await;

    let (status, servers) = app.get("/api/v1/servers", &guest.token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(servers.as_array().unwrap().len(), 1);
    assert_eq!(servers[0]["id"], server_id.as_str());
    assert_eq!(servers[0]["member_count"], 2);
}

#[tokio::test]
async fn test_join_twice_conflicts_and_unknown_server_is_not_found() {
    let app = TestApp::new();
    let owner = app.register().await;
    let guest = app.register().await;
    let server_id = app.create_server(&owner, "Hikers").await;
    app.join(&guest, &server_id).await;

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/servers/{}/join", server_id),
            Some(&guest.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/servers/{}/join", uuid::Uuid::new_v4()),
            Some(&guest.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_members_and_admins_cannot_create_channels() {
    let app = TestApp::new();
    let owner = app.register().await;
    let member = app.register().await;
    let admin = app.register().await;
    let server_id = app.create_server(&owner, "Gardeners").await;
    app.join(&member, &server_id).await;
    app.join(&admin, &server_id).await;
    app.store
        .set_role(server_id.parse().unwrap(), admin.id, MemberRole::Admin);

    for user in [&member, &admin] {
        let (status, _) = app
            .post(
                &format!("/api/v1/servers/{}/channels", server_id),
                &user.token,
                json!({ "name": "off-topic" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_non_member_cannot_list_channels() {
    let app = TestApp::new();
    let owner = app.register().await;
    let outsider = app.register().await;
    let server_id = app.create_server(&owner, "Private Club").await;

    let (status, _) = app
        .get(&format!("/api/v1/servers/{}/channels", server_id), &outsider.token)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_private_channel_visibility_follows_channel_membership() {
    let app = TestApp::new();
    let owner = app.register().await;
    let member = app.register().await;
    let server_id = app.create_server(&owner, "Studio").await;
    app.join(&member, &server_id).await;

    let (status, channel) = app
        .post(
            &format!("/api/v1/servers/{}/channels", server_id),
            &owner.token,
            json!({ "name": "staff", "is_private": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let channel_id = channel["id"].as_str().unwrap().to_string();
    let channels_uri = format!("/api/v1/servers/{}/channels", server_id);

    // Creator sees it without an explicit grant
    let (_, owner_view) = app.get(&channels_uri, &owner.token).await;
    assert_eq!(channel_names(&owner_view), vec!["general", "staff"]);

    let (_, member_view) = app.get(&channels_uri, &member.token).await;
    assert_eq!(channel_names(&member_view), vec!["general"]);

    let (status, _) = app
        .get(&format!("/api/v1/channels/{}/messages", channel_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            &format!("/api/v1/channels/{}/members", channel_id),
            &owner.token,
            json!({ "user_id": member.id }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, member_view) = app.get(&channels_uri, &member.token).await;
    assert_eq!(channel_names(&member_view), vec!["general", "staff"]);

    let (status, _) = app
        .get(&format!("/api/v1/channels/{}/messages", channel_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_add_channel_member_rejects_public_channel_and_outsiders() {
    let app = TestApp::new();
    let owner = app.register().await;
    let outsider = app.register().await;
    let server_id = app.create_server(&owner, "Makers").await;
    let general = app.general_channel(&server_id);

    let (status, _) = app
        .post(
            &format!("/api/v1/channels/{}/members", general),
            &owner.token,
            json!({ "user_id": outsider.id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, channel) = app
        .post(
            &format!("/api/v1/servers/{}/channels", server_id),
            &owner.token,
            json!({ "name": "secret", "is_private": true }),
        )
        .await;
    let (status, _) = app
        .post(
            &format!("/api/v1/channels/{}/members", channel["id"].as_str().unwrap()),
            &owner.token,
            json!({ "user_id": outsider.id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories_group_and_move_channels() {
    let app = TestApp::new();
    let owner = app.register().await;
    let server_id = app.create_server(&owner, "Guild Hall").await;

    let (status, category) = app
        .post(
            &format!("/api/v1/servers/{}/categories", server_id),
            &owner.token,
            json!({ "name": "Voice", "position": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, channel) = app
        .post(
            &format!("/api/v1/servers/{}/channels", server_id),
            &owner.token,
            json!({ "name": "lounge", "category_id": category_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(channel["category_id"], category_id.as_str());
    let channel_id = channel["id"].as_str().unwrap().to_string();

    let (_, categories) = app
        .get(&format!("/api/v1/servers/{}/categories", server_id), &owner.token)
        .await;
    assert_eq!(categories.as_array().unwrap().len(), 1);

    let category_uri = format!("/api/v1/categories/{}/channels", category_id);
    let (_, grouped) = app.get(&category_uri, &owner.token).await;
    assert_eq!(channel_names(&grouped), vec!["lounge"]);

    // Move the default channel in, then the lounge out
    let general = app.general_channel(&server_id);
    let (status, _) = app
        .put(
            &format!("/api/v1/channels/{}/category", general),
            &owner.token,
            json!({ "category_id": category_id }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .put(
            &format!("/api/v1/channels/{}/category", channel_id),
            &owner.token,
            json!({ "category_id": null }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, grouped) = app.get(&category_uri, &owner.token).await;
    assert_eq!(channel_names(&grouped), vec!["general"]);
}

#[tokio::test]
async fn test_category_from_another_server_is_rejected() {
    let app = TestApp::new();
    let owner = app.register().await;
    let first = app.create_server(&owner, "First Server").await;
    let second = app.create_server(&owner, "Second Server").await;

    let (_, category) = app
        .post(
            &format!("/api/v1/servers/{}/categories", first),
            &owner.token,
            json!({ "name": "Text" }),
        )
        .await;

    let (status, _) = app
        .post(
            &format!("/api/v1/servers/{}/channels", second),
            &owner.token,
            json!({ "name": "misplaced", "category_id": category["id"] }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_server_name_is_rejected() {
    let app = TestApp::new();
    let owner = app.register().await;

    let (status, _) = app
        .post("/api/v1/servers", &owner.token, json!({ "name": "ab" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.server_count(), 0);
}
