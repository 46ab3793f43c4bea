//! Application Startup
//!
//! Storage backend selection, service wiring and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    ChatService, ChatServiceImpl, FolderService, FolderServiceImpl, MessageLimits, MessageService,
    MessageServiceImpl, PrivacyService, PrivacyServiceImpl,
};
use crate::config::{MessageSettings, Settings, StorageBackend};
use crate::domain::{ChatRepository, FolderRepository, MessageRepository, PrivacyRepository};
use crate::infrastructure::database;
use crate::infrastructure::memory::{
    InMemoryChatRepository, InMemoryFolderRepository, InMemoryMessageRepository,
    InMemoryPrivacyRepository,
};
use crate::infrastructure::repositories::{
    PgChatRepository, PgFolderRepository, PgMessageRepository, PgPrivacyRepository,
};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<dyn ChatService>,
    pub message_service: Arc<dyn MessageService>,
    pub privacy_service: Arc<dyn PrivacyService>,
    pub folder_service: Arc<dyn FolderService>,
    /// Present only with the PostgreSQL backend
    pub db: Option<PgPool>,
    pub settings: Arc<Settings>,
}

impl From<&MessageSettings> for MessageLimits {
    fn from(settings: &MessageSettings) -> Self {
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
            max_text_length: settings.max_text_length,
            search_limit: settings.search_limit,
        }
    }
}

impl AppState {
    /// State backed by process-local storage.
    pub fn in_memory(settings: Settings) -> Self {
        Self::from_repositories(
            Arc::new(InMemoryChatRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(InMemoryFolderRepository::new()),
            Arc::new(InMemoryPrivacyRepository::new()),
            None,
            settings,
        )
    }

    /// State backed by PostgreSQL, running migrations first if configured.
    pub async fn postgres(settings: Settings) -> Result<Self> {
        let db = database::connect(&settings.database).await?;

        Ok(Self::from_repositories(
            Arc::new(PgChatRepository::new(db.clone())),
            Arc::new(PgMessageRepository::new(db.clone())),
            Arc::new(PgFolderRepository::new(db.clone())),
            Arc::new(PgPrivacyRepository::new(db.clone())),
            Some(db),
            settings,
        ))
    }

    fn from_repositories<C, M, F, P>(
        chats: Arc<C>,
        messages: Arc<M>,
        folders: Arc<F>,
        privacy: Arc<P>,
        db: Option<PgPool>,
        settings: Settings,
    ) -> Self
    where
        C: ChatRepository + 'static,
        M: MessageRepository + 'static,
        F: FolderRepository + 'static,
        P: PrivacyRepository + 'static,
    {
        let limits = MessageLimits::from(&settings.messages);

        Self {
            chat_service: Arc::new(ChatServiceImpl::new(chats.clone(), messages.clone())),
            message_service: Arc::new(
                MessageServiceImpl::new(messages.clone(), chats.clone(), privacy.clone())
                    .with_limits(limits),
            ),
            privacy_service: Arc::new(PrivacyServiceImpl::new(privacy)),
            folder_service: Arc::new(FolderServiceImpl::new(folders, chats, messages)),
            db,
            settings: Arc::new(settings),
        }
    }
}

/// Router with tracing and CORS layers applied
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let addr = settings.server_addr();
        health::mark_started();

        let state = match settings.database.backend {
            StorageBackend::Postgres => AppState::postgres(settings).await?,
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                AppState::in_memory(settings)
            }
        };

        let router = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until Ctrl-C
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
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
