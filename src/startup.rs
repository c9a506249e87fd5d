//! Application Startup
//!
//! Service wiring and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::application::services::{
    AccessService, AccessServiceImpl, AuthService, AuthServiceImpl, ChatOptions, ChatService,
    ChatServiceImpl, MessageService, MessageServiceImpl, ServerService, ServerServiceImpl,
};
use crate::config::Settings;
use crate::domain::{
    AttachmentRepository, CategoryRepository, ChannelRepository, ChatRepository,
    MemberRepository, MessageRepository, ServerRepository, UserRepository,
};
use crate::infrastructure::completion::{CompletionClient, OpenAiCompletionClient};
use crate::infrastructure::database::{self, ReadinessCheck};
use crate::infrastructure::repositories::{
    PgAttachmentRepository, PgCategoryRepository, PgChannelRepository, PgChatRepository,
    PgMemberRepository, PgMessageRepository, PgServerRepository, PgUserRepository,
};
use crate::infrastructure::storage::{FileStorage, LocalFileStorage};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub access: Arc<dyn AccessService>,
    pub servers: Arc<dyn ServerService>,
    pub messages: Arc<dyn MessageService>,
    pub chats: Arc<dyn ChatService>,
    pub readiness: Arc<dyn ReadinessCheck>,
    pub settings: Arc<Settings>,
}

/// One implementation per repository trait.
pub struct Repositories<U, S, C, Cat, Mem, M, A, Ch> {
    pub users: Arc<U>,
    pub servers: Arc<S>,
    pub channels: Arc<C>,
    pub categories: Arc<Cat>,
    pub members: Arc<Mem>,
    pub messages: Arc<M>,
    pub attachments: Arc<A>,
    pub chats: Arc<Ch>,
}

impl AppState {
    /// Build every service over the given repositories and adapters.
    pub fn new<U, S, C, Cat, Mem, M, A, Ch>(
        repos: Repositories<U, S, C, Cat, Mem, M, A, Ch>,
        storage: Arc<dyn FileStorage>,
        completion: Arc<dyn CompletionClient>,
        readiness: Arc<dyn ReadinessCheck>,
        settings: Settings,
    ) -> Self
    where
        U: UserRepository + 'static,
        S: ServerRepository + 'static,
        C: ChannelRepository + 'static,
        Cat: CategoryRepository + 'static,
        Mem: MemberRepository + 'static,
        M: MessageRepository + 'static,
        A: AttachmentRepository + 'static,
        Ch: ChatRepository + 'static,
    {
        let auth = AuthServiceImpl::new(repos.users, settings.jwt.clone());
        let access = AccessServiceImpl::new(
            repos.members.clone(),
            repos.channels.clone(),
            repos.messages.clone(),
        );
        let servers = ServerServiceImpl::new(
            repos.servers,
            repos.channels,
            repos.categories,
            repos.members,
        );
        let messages = MessageServiceImpl::new(repos.messages, repos.attachments, storage);
        let chats = ChatServiceImpl::new(
            repos.chats,
            completion,
            ChatOptions::from(&settings.completion),
        );

        Self {
            auth: Arc::new(auth),
            access: Arc::new(access),
            servers: Arc::new(servers),
            messages: Arc::new(messages),
            chats: Arc::new(chats),
            readiness,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let db = database::create_pool(&settings.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("failed to apply migrations")?;
            tracing::info!("Database migrations applied");
        }

        let completion = OpenAiCompletionClient::from_settings(&settings.completion)
            .context("failed to build completion client")?;
        if settings
            .completion
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            tracing::warn!("No completion API key configured; requests are sent unauthenticated");
        }

        let storage = LocalFileStorage::new(&settings.storage.uploads_dir);

        let repos = Repositories {
            users: Arc::new(PgUserRepository::new(db.clone())),
            servers: Arc::new(PgServerRepository::new(db.clone())),
            channels: Arc::new(PgChannelRepository::new(db.clone())),
            categories: Arc::new(PgCategoryRepository::new(db.clone())),
            members: Arc::new(PgMemberRepository::new(db.clone())),
            messages: Arc::new(PgMessageRepository::new(db.clone())),
            attachments: Arc::new(PgAttachmentRepository::new(db.clone())),
            chats: Arc::new(PgChatRepository::new(db.clone())),
        };

        let cors_layer = cors::create_cors_layer(&settings.cors);
        let addr = settings.server_addr();

        let state = AppState::new(
            repos,
            Arc::new(storage),
            Arc::new(completion),
            Arc::new(db),
            settings,
        );

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(CompressionLayer::new())
            .layer(logging::create_trace_layer())
            .layer(cors_layer);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A handler that fails to install never resolves.
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
