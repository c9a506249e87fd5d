//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT validation
//! - **AccessService**: Membership and permission checks
//! - **ServerService**: Servers, channels, categories, membership
//! - **MessageService**: Channel message lifecycle and attachments
//! - **ChatService**: AI chat orchestration

pub mod access_service;
pub mod auth_service;
pub mod chat_service;
pub mod message_service;
pub mod server_service;

pub use access_service::{AccessError, AccessService, AccessServiceImpl};
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims};
pub use chat_service::{make_title, ChatError, ChatOptions, ChatService, ChatServiceImpl, SYSTEM_PROMPT};
pub use message_service::{
    MessageError, MessageService, MessageServiceImpl, SaveMessageDto, UploadedFile,
};
pub use server_service::{
    CreateCategoryDto, CreateChannelDto, CreateServerDto, ServerError, ServerService,
    ServerServiceImpl,
};
