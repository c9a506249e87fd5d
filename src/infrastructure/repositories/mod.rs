//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! Each repository wraps a cloned `PgPool`. Multi-row writes open their own
//! transaction with `pool.begin()`; an uncommitted transaction rolls back when
//! dropped, so every `?` inside one is an abort.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgChannelRepository, PgMessageRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let channel_repo = PgChannelRepository::new(pool.clone());
//!     let message_repo = PgMessageRepository::new(pool.clone());
//! }
//! ```

pub mod attachment_repository;
pub mod category_repository;
pub mod channel_repository;
pub mod chat_repository;
pub mod member_repository;
pub mod message_repository;
pub mod server_repository;
pub mod user_repository;

pub use attachment_repository::PgAttachmentRepository;
pub use category_repository::PgCategoryRepository;
pub use channel_repository::PgChannelRepository;
pub use chat_repository::PgChatRepository;
pub use member_repository::PgMemberRepository;
pub use message_repository::PgMessageRepository;
pub use server_repository::PgServerRepository;
pub use user_repository::PgUserRepository;
