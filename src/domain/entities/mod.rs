//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the chat backend.
//! All entities map directly to their corresponding database tables.
//!
//! ## Group Chat
//!
//! - **User**: User account with authentication data
//! - **Server**: A community that owns channels, categories and members
//! - **Channel**: A text channel within a server, public or private
//! - **Category**: Display grouping of channels
//! - **ServerMember / ChannelMember**: Server roles and private-channel access
//! - **Message / Attachment**: Channel messages and their files
//!
//! ## AI Chat
//!
//! - **Chat / ChatMessage**: A user's conversation with the assistant
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod attachment;
mod category;
mod channel;
mod chat;
mod member;
mod message;
mod server;
mod user;

pub use attachment::{Attachment, AttachmentRepository, FileType};
pub use category::{Category, CategoryRepository};
pub use channel::{Channel, ChannelRepository, DEFAULT_CHANNEL_DESCRIPTION, DEFAULT_CHANNEL_NAME};
pub use chat::{Chat, ChatMessage, ChatRepository, ChatRole, ChatSummary};
pub use member::{ChannelMember, MemberRepository, MemberRole, ServerMember};
pub use message::{Message, MessageRepository, MessageWithAttachments, MAX_MESSAGE_LENGTH};
pub use server::{Server, ServerOverview, ServerRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use attachment::MockAttachmentRepository;
#[cfg(test)]
pub use category::MockCategoryRepository;
#[cfg(test)]
pub use channel::MockChannelRepository;
#[cfg(test)]
pub use chat::MockChatRepository;
#[cfg(test)]
pub use member::MockMemberRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use server::MockServerRepository;
#[cfg(test)]
pub use user::MockUserRepository;
