//! Server module for brandforge
//!
//! Wires the capability ports, orchestration core, and HTTP surface
//! together, then runs the axum server.

pub mod config;

pub use config::AppConfig;

use anyhow::{Context, Result};
use axum::Router;
use brandforge_core::{
    BriefClarifier, GenerationConfig, HandoffRouter, InMemoryBlobStore,
    InMemoryConversationStore, RouterConfig, TaskManager, TaskRegistry,
};
use brandforge_llm::{ChatCompletion, ImageGeneration, OpenAiPort};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Generation task manager
    pub tasks: Arc<TaskManager>,
    /// Brief clarification loop
    pub clarifier: Arc<BriefClarifier>,
    /// Handoff router for interactive workflow runs
    pub router: Arc<HandoffRouter>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state over explicit ports; the entry point for tests and for
    /// `run`.
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        images: Arc<dyn ImageGeneration>,
        config: AppConfig,
    ) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let conversations = Arc::new(InMemoryConversationStore::new());

        let tasks = Arc::new(TaskManager::new(
            Arc::clone(&chat),
            images,
            blobs,
            registry,
            GenerationConfig {
                image_prompt_budget: config.generation.image_prompt_budget,
                ..GenerationConfig::default()
            },
        ));
        let clarifier = Arc::new(BriefClarifier::new(Arc::clone(&chat)));
        let router = Arc::new(
            HandoffRouter::new(
                chat,
                RouterConfig {
                    max_user_turns: config.router.max_user_turns,
                    max_agent_hops: config.router.max_agent_hops,
                    ..RouterConfig::default()
                },
            )
            .with_conversation_store(conversations),
        );

        Self {
            tasks,
            clarifier,
            router,
            config: Arc::new(config),
        }
    }
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    crate::api::api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Load configuration, connect the OpenAI ports, and serve until ctrl-c.
pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let openai = Arc::new(OpenAiPort::from_env().context("OpenAI port configuration")?);
    let state = AppState::new(openai.clone(), openai, config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "brandforge listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")
}
