//! # Chat Backend Library
//!
//! This crate provides a group chat and AI chat backend with:
//! - RESTful HTTP API endpoints
//! - Servers, public/private channels and categories
//! - Channel messages with file attachments
//! - AI chats answered by an OpenAI-compatible completion API
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, completion client, file storage, metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! chat_backend/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, permission rules, and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, completion, storage and metrics implementations
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
