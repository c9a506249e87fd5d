//! Chat Service
//!
//! Orchestrates AI chats: asks the completion API for a reply, then persists
//! the user turn and the assistant turn together.
//!
//! The completion call happens before any transaction is opened. A failed or
//! timed-out completion therefore leaves nothing behind.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::CompletionSettings;
use crate::domain::{Chat, ChatMessage, ChatRepository, ChatRole, ChatSummary};
use crate::infrastructure::completion::{
    CompletionClient, CompletionError, CompletionRequest, CompletionTurn,
};
use crate::infrastructure::metrics;

/// Preamble sent ahead of every conversation.
pub const SYSTEM_PROMPT: &str = "あなたは親切で丁寧な日本語アシスタントです。ユーザーの質問に対して、簡潔で分かりやすい回答を提供してください。";

/// Titles keep at most this many characters of the first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Start a chat from a first user message.
    ///
    /// Returns the new chat id and the stored `[user, assistant]` turns.
    async fn create_new_chat(
        &self,
        user_id: Uuid,
        message: &str,
    ) -> Result<(Uuid, Vec<ChatMessage>), ChatError>;

    /// Append a user turn and its reply. `None` when the chat is missing or
    /// belongs to someone else.
    async fn add_message(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<Option<ChatMessage>, ChatError>;

    /// All turns of an owned chat. Chats without turns are reported as absent.
    async fn get_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Vec<ChatMessage>>, ChatError>;

    /// The user's chats, most recently active first.
    async fn get_chat_history(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, ChatError>;
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("Completion timed out")]
    CompletionTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Completion parameters used for every request.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl From<&CompletionSettings> for ChatOptions {
    fn from(settings: &CompletionSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Derive a chat title from its first message.
///
/// Counts characters, not bytes, and appends `...` only when something was cut.
pub fn make_title(message: &str) -> String {
    if message.chars().count() <= TITLE_MAX_CHARS {
        return message.to_string();
    }
    let mut title: String = message.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

/// ChatService implementation
pub struct ChatServiceImpl<R>
where
    R: ChatRepository,
{
    chat_repo: Arc<R>,
    completion: Arc<dyn CompletionClient>,
    options: ChatOptions,
}

impl<R> ChatServiceImpl<R>
where
    R: ChatRepository,
{
    pub fn new(chat_repo: Arc<R>, completion: Arc<dyn CompletionClient>, options: ChatOptions) -> Self {
        Self {
            chat_repo,
            completion,
            options,
        }
    }

    /// Ask for a reply, bounded by the configured timeout.
    async fn complete(&self, turns: Vec<CompletionTurn>) -> Result<String, ChatError> {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            turns,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.options.timeout, self.completion.complete(&request)).await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(Ok(reply)) => {
                metrics::record_completion("success", elapsed);
                Ok(reply)
            }
            Ok(Err(CompletionError::Timeout)) | Err(_) => {
                metrics::record_completion("timeout", elapsed);
                tracing::warn!(elapsed_secs = elapsed, "Completion timed out");
                Err(ChatError::CompletionTimeout)
            }
            Ok(Err(e)) => {
                metrics::record_completion("error", elapsed);
                tracing::warn!(error = %e, "Completion failed");
                Err(ChatError::Completion(e.to_string()))
            }
        }
    }
}

/// Strictly later than `asked_at` so the reply sorts after the question.
fn reply_time(asked_at: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(asked_at + chrono::Duration::microseconds(1))
}

#[async_trait]
impl<R> ChatService for ChatServiceImpl<R>
where
    R: ChatRepository + 'static,
{
    async fn create_new_chat(
        &self,
        user_id: Uuid,
        message: &str,
    ) -> Result<(Uuid, Vec<ChatMessage>), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let chat_id = Uuid::new_v4();
        let asked_at = Utc::now();

        let reply = self.complete(vec![CompletionTurn::user(message)]).await?;
        let replied_at = reply_time(asked_at);

        let chat = Chat {
            id: chat_id,
            user_id,
            title: make_title(message),
            message_count: 2,
            last_message_at: replied_at,
            created_at: asked_at,
        };
        let turns = vec![
            ChatMessage::new(chat_id, ChatRole::User, message, asked_at),
            ChatMessage::new(chat_id, ChatRole::Assistant, reply, replied_at),
        ];

        self.chat_repo
            .create_with_messages(&chat, &turns)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        tracing::info!(chat_id = %chat_id, user_id = %user_id, "Chat created");

        Ok((chat_id, turns))
    }

    async fn add_message(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<Option<ChatMessage>, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let owned = self
            .chat_repo
            .find_owned(chat_id, user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;
        if owned.is_none() {
            return Ok(None);
        }

        let history = self
            .chat_repo
            .find_messages(chat_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        let mut turns: Vec<CompletionTurn> = history
            .into_iter()
            .map(|m| CompletionTurn {
                role: m.role,
                content: m.content,
            })
            .collect();
        turns.push(CompletionTurn::user(message));

        let asked_at = Utc::now();
        let reply = self.complete(turns).await?;
        let replied_at = reply_time(asked_at);

        let user_turn = ChatMessage::new(chat_id, ChatRole::User, message, asked_at);
        let assistant_turn = ChatMessage::new(chat_id, ChatRole::Assistant, reply, replied_at);

        self.chat_repo
            .append_messages(chat_id, &[user_turn, assistant_turn.clone()], replied_at)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        tracing::debug!(chat_id = %chat_id, "Chat turn appended");

        Ok(Some(assistant_turn))
    }

    async fn get_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Vec<ChatMessage>>, ChatError> {
        let owned = self
            .chat_repo
            .find_owned(chat_id, user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;
        if owned.is_none() {
            return Ok(None);
        }

        let messages = self
            .chat_repo
            .find_messages(chat_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        Ok(Some(messages).filter(|m| !m.is_empty()))
    }

    async fn get_chat_history(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, ChatError> {
        self.chat_repo
            .find_summaries(user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }
}
