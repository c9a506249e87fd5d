//! Common Test Utilities
//!
//! In-memory adapters for every repository, storage and completion seam,
//! plus a router-level `TestApp`.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use chat_backend::config::{
    CompletionSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    StorageSettings,
};
use chat_backend::domain::{
    Attachment, AttachmentRepository, Category, CategoryRepository, Channel, ChannelMember,
    ChannelRepository, Chat, ChatMessage, ChatRepository, ChatRole, ChatSummary,
    MemberRepository, MemberRole, Message, MessageRepository, Server, ServerMember,
    ServerOverview, ServerRepository, User, UserRepository,
};
use chat_backend::infrastructure::completion::{
    CompletionClient, CompletionError, CompletionRequest,
};
use chat_backend::infrastructure::database::ReadinessCheck;
use chat_backend::infrastructure::storage::{FileStorage, StorageError};
use chat_backend::presentation::http::routes::create_router;
use chat_backend::shared::error::AppError;
use chat_backend::startup::{AppState, Repositories};

// ============================================================================
// In-memory repositories
// ============================================================================

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    servers: Vec<Server>,
    members: Vec<ServerMember>,
    categories: Vec<Category>,
    channels: Vec<Channel>,
    channel_members: Vec<ChannelMember>,
    messages: Vec<Message>,
    attachments: Vec<Attachment>,
    chats: Vec<Chat>,
    chat_messages: Vec<ChatMessage>,
}

/// One store backing every repository trait. Each method holds the lock for
/// its whole body, so multi-row writes are all-or-nothing.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    /// Index of the attachment row whose insert fails, once
    attachment_fault: Mutex<Option<usize>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next message write fail while inserting attachment `index`,
    /// after the message row and earlier attachments were written.
    pub fn fail_attachment_insert(&self, index: usize) {
        *self.attachment_fault.lock().unwrap() = Some(index);
    }

    pub fn server_count(&self) -> usize {
        self.tables.lock().unwrap().servers.len()
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().unwrap().messages.len()
    }

    pub fn attachment_count(&self) -> usize {
        self.tables.lock().unwrap().attachments.len()
    }

    pub fn chat_count(&self) -> usize {
        self.tables.lock().unwrap().chats.len()
    }

    pub fn chat_message_count(&self) -> usize {
        self.tables.lock().unwrap().chat_messages.len()
    }

    pub fn channels_of(&self, server_id: Uuid) -> Vec<Channel> {
        self.tables
            .lock()
            .unwrap()
            .channels
            .iter()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect()
    }

    pub fn role_of(&self, server_id: Uuid, user_id: Uuid) -> Option<MemberRole> {
        self.tables
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.server_id == server_id && m.user_id == user_id)
            .map(|m| m.role)
    }

    pub fn message(&self, id: Uuid) -> Option<Message> {
        self.tables
            .lock()
            .unwrap()
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn chat(&self, id: Uuid) -> Option<Chat> {
        self.tables
            .lock()
            .unwrap()
            .chats
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Promote a member, as an operator would in the database.
    pub fn set_role(&self, server_id: Uuid, user_id: Uuid, role: MemberRole) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(member) = tables
            .members
            .iter_mut()
            .find(|m| m.server_id == server_id && m.user_id == user_id)
        {
            member.role = role;
        }
    }
}

fn visible(tables: &Tables, channel: &Channel, user_id: Uuid) -> bool {
    !channel.is_private
        || tables
            .channel_members
            .iter()
            .any(|m| m.channel_id == channel.id && m.user_id == user_id)
}

fn sorted_by_name(mut channels: Vec<Channel>) -> Vec<Channel> {
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    channels
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        self.tables.lock().unwrap().users.push(user.clone());
        Ok(user.clone())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username)))
    }
}

#[async_trait]
impl ServerRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Server>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.servers.iter().find(|s| s.id == id).cloned())
    }

    async fn create_with_defaults(
        &self,
        server: &Server,
        default_channel: &Channel,
        owner: &ServerMember,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.servers.push(server.clone());
        tables.channels.push(default_channel.clone());
        tables.members.push(owner.clone());
        Ok(())
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<ServerOverview>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut servers: Vec<ServerOverview> = tables
            .servers
            .iter()
            .filter(|s| {
                tables
                    .members
                    .iter()
                    .any(|m| m.server_id == s.id && m.user_id == user_id)
            })
            .map(|s| ServerOverview {
                server: s.clone(),
                member_count: tables.members.iter().filter(|m| m.server_id == s.id).count() as i64,
            })
            .collect();
        servers.sort_by(|a, b| b.server.created_at.cmp(&a.server.created_at));
        Ok(servers)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, category: &Category) -> Result<(), AppError> {
        self.tables.lock().unwrap().categories.push(category.clone());
        Ok(())
    }

    async fn find_by_server(&self, server_id: Uuid) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then(a.name.cmp(&b.name)));
        Ok(categories)
    }
}

#[async_trait]
impl ChannelRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.channels.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, channel: &Channel, creator_id: Option<Uuid>) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.channels.push(channel.clone());
        if let Some(user_id) = creator_id {
            tables.channel_members.push(ChannelMember {
                channel_id: channel.id,
                user_id,
                added_at: channel.created_at,
            });
        }
        Ok(())
    }

    async fn find_visible_by_server(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_by_name(
            tables
                .channels
                .iter()
                .filter(|c| c.server_id == server_id && visible(&tables, c, user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_visible_by_category(
        &self,
        category_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_by_name(
            tables
                .channels
                .iter()
                .filter(|c| c.category_id == Some(category_id) && visible(&tables, c, user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn update_category(
        &self,
        channel_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(channel) = tables.channels.iter_mut().find(|c| c.id == channel_id) {
            channel.category_id = category_id;
            channel.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn is_member(&self, server_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .members
            .iter()
            .any(|m| m.server_id == server_id && m.user_id == user_id))
    }

    async fn find_role(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, AppError> {
        Ok(self.role_of(server_id, user_id))
    }

    async fn create(&self, member: &ServerMember) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .members
            .iter()
            .any(|m| m.server_id == member.server_id && m.user_id == member.user_id)
        {
            return Err(AppError::Conflict("duplicate server member".into()));
        }
        tables.members.push(member.clone());
        Ok(())
    }

    async fn is_channel_member(&self, channel_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .channel_members
            .iter()
            .any(|m| m.channel_id == channel_id && m.user_id == user_id))
    }

    async fn add_channel_member(&self, member: &ChannelMember) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables
            .channel_members
            .iter()
            .any(|m| m.channel_id == member.channel_id && m.user_id == member.user_id)
        {
            tables.channel_members.push(member.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        Ok(self.message(id))
    }

    async fn create_with_attachments(
        &self,
        message: &Message,
        attachments: &[Attachment],
    ) -> Result<(), AppError> {
        let fault = self.attachment_fault.lock().unwrap().take();
        let mut tables = self.tables.lock().unwrap();
        let (messages_before, attachments_before) = (tables.messages.len(), tables.attachments.len());

        tables.messages.push(message.clone());
        for (index, attachment) in attachments.iter().enumerate() {
            if fault == Some(index) {
                // Roll back everything this write touched
                tables.messages.truncate(messages_before);
                tables.attachments.truncate(attachments_before);
                return Err(AppError::Internal("attachment insert failed".into()));
            }
            tables.attachments.push(attachment.clone());
        }
        Ok(())
    }

    async fn find_by_channel(&self, channel_id: Uuid) -> Result<Vec<Message>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.channel_id == channel_id && !m.is_deleted)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .messages
            .iter_mut()
            .find(|m| m.id == id && !m.is_deleted)
        {
            Some(message) => {
                message.content = content.to_string();
                message.is_edited = true;
                message.edited_at = Some(edited_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        match tables.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Attachment>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.attachments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_message_ids(&self, message_ids: &[Uuid]) -> Result<Vec<Attachment>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut attachments: Vec<Attachment> = tables
            .attachments
            .iter()
            .filter(|a| message_ids.contains(&a.message_id))
            .cloned()
            .collect();
        attachments.sort_by(|a, b| {
            a.message_id
                .cmp(&b.message_id)
                .then(a.position.cmp(&b.position))
        });
        Ok(attachments)
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn create_with_messages(
        &self,
        chat: &Chat,
        messages: &[ChatMessage],
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.chats.push(chat.clone());
        tables.chat_messages.extend_from_slice(messages);
        Ok(())
    }

    async fn find_owned(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Chat>, AppError> {
        Ok(self.chat(chat_id).filter(|c| c.user_id == user_id))
    }

    async fn find_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut messages: Vec<ChatMessage> = tables
            .chat_messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn append_messages(
        &self,
        chat_id: Uuid,
        messages: &[ChatMessage],
        last_message_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(chat) = tables.chats.iter_mut().find(|c| c.id == chat_id) else {
            return Err(AppError::NotFound("chat".into()));
        };
        chat.message_count += messages.len() as i32;
        chat.last_message_at = last_message_at;
        tables.chat_messages.extend_from_slice(messages);
        Ok(())
    }

    async fn find_summaries(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut summaries: Vec<ChatSummary> = tables
            .chats
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| ChatSummary {
                id: c.id,
                title: c.title.clone(),
                created_at: c.created_at,
                last_message_at: c.last_message_at,
                message_count: c.message_count,
                first_message: tables
                    .chat_messages
                    .iter()
                    .filter(|m| m.chat_id == c.id && m.role == ChatRole::User)
                    .min_by_key(|m| m.timestamp)
                    .map(|m| m.content.clone()),
            })
            .collect();
        summaries.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(summaries)
    }
}

// ============================================================================
// Storage, completion and readiness doubles
// ============================================================================

/// File storage kept in a map keyed by generated path.
#[derive(Default)]
pub struct InMemoryFileStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStorage {
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let path = match original_name.rsplit_once('.') {
            Some((_, ext)) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        self.files.lock().unwrap().insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn size_of(&self, path: &str) -> Result<u64, StorageError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|b| b.len() as u64)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

/// Completion client that replays queued outcomes, then echoes the last turn.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, error: CompletionError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(outcome) = self.replies.lock().unwrap().pop_front() {
            return outcome;
        }
        let last = request.turns.last().map(|t| t.content.as_str()).unwrap_or_default();
        Ok(format!("echo: {last}"))
    }
}

/// Readiness probe with a fixed answer.
pub struct StubReadiness {
    pub healthy: bool,
}

#[async_trait]
impl ReadinessCheck for StubReadiness {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.healthy {
            Ok(())
        } else {
            Err(AppError::Internal("connection refused".into()))
        }
    }
}

// ============================================================================
// Test application
// ============================================================================

pub const TEST_PASSWORD: &str = "TestPassword123!";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://unused".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-that-is-long-enough".into(),
            access_token_expiry_minutes: 60,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        storage: StorageSettings {
            uploads_dir: "./uploads".into(),
            max_upload_bytes: 1024 * 1024,
        },
        completion: CompletionSettings {
            base_url: "http://localhost:0".into(),
            api_key: None,
            model: "test-model".into(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 5,
        },
        environment: "test".into(),
    }
}

/// Generate a unique test email
pub fn unique_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}_{}", &Uuid::new_v4().simple().to_string()[..8], email)
}

/// Generate a unique test username
pub fn unique_username() -> String {
    let name: String = Username().fake();
    let name: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).take(16).collect();
    format!("{}_{}", name, &Uuid::new_v4().simple().to_string()[..8])
}

/// A registered user and their token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
    pub email: String,
}

/// Router plus handles on every in-memory adapter
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub files: Arc<InMemoryFileStorage>,
    pub completion: Arc<ScriptedCompletion>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_readiness(true)
    }

    pub fn with_readiness(healthy: bool) -> Self {
        let store = InMemoryStore::new();
        let files = Arc::new(InMemoryFileStorage::default());
        let completion = Arc::new(ScriptedCompletion::default());

        let repos = Repositories {
            users: store.clone(),
            servers: store.clone(),
            channels: store.clone(),
            categories: store.clone(),
            members: store.clone(),
            messages: store.clone(),
            attachments: store.clone(),
            chats: store.clone(),
        };

        let state = AppState::new(
            repos,
            files.clone(),
            completion.clone(),
            Arc::new(StubReadiness { healthy }),
            test_settings(),
        );

        Self {
            router: create_router(state),
            store,
            files,
            completion,
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty or not JSON)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Send raw bytes and return status, headers and body untouched
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    /// Post a multipart message with a `content` field and `files` parts
    pub async fn post_message(
        &self,
        channel_id: &str,
        token: &str,
        content: &str,
        files: &[(&str, &[u8])],
    ) -> (StatusCode, Value) {
        let (content_type, body) = multipart_body(content, files);
        let response = self
            .raw(
                Method::POST,
                &format!("/api/v1/channels/{}/messages", channel_id),
                token,
                Some(&content_type),
                body,
            )
            .await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn register(&self) -> TestUser {
        let email = unique_email();
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "username": unique_username(),
                    "email": email,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        TestUser {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["access_token"].as_str().unwrap().to_string(),
            email,
        }
    }

    /// Create a server owned by `owner`; returns its id
    pub async fn create_server(&self, owner: &TestUser, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/servers",
                &owner.token,
                serde_json::json!({ "name": name, "description": "test server" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create server failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn join(&self, user: &TestUser, server_id: &str) {
        let (status, _) = self
            .request(
                Method::POST,
                &format!("/api/v1/servers/{}/join", server_id),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    /// Id of the server's `general` channel
    pub fn general_channel(&self, server_id: &str) -> String {
        self.store
            .channels_of(server_id.parse().unwrap())
            .into_iter()
            .find(|c| c.name == "general")
            .unwrap()
            .id
            .to_string()
    }
}

const BOUNDARY: &str = "chat-backend-test-boundary";

/// Encode a `multipart/form-data` body by hand
pub fn multipart_body(content: &str, files: &[(&str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"content\"\r\n\r\n{content}\r\n"
        )
        .as_bytes(),
    );
    for (name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
