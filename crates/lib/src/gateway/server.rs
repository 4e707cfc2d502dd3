//! Gateway HTTP server (single port).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::agent::{Assistant, PackageAssistant, AGENT_NAME};
use crate::composer::ResponseComposer;
use crate::config::{self, Config};
use crate::directory::DirectoryClient;
use crate::gateway::protocol::{
    AgentCapabilities, AgentStatus, ChatRequest, ChatResponse, FindPackageQuery, ResetQuery,
    TrackPackageQuery, UserPackagesQuery,
};
use crate::llm;
use crate::system_prompt;
use crate::tools::{self, ToolDispatcher, ToolInfo, ToolOutcome};

const SERVICE_NAME: &str = "packaroo-assistant";

/// Shared state for HTTP handlers. Built once at startup.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub assistant: Arc<PackageAssistant>,
}

/// Wire up the assistant from config: text generator, system prompt, directory client.
/// Fails when the generation backend cannot be built (e.g. Gemini without an API key).
pub fn build_assistant(config: &Config, config_path: &Path) -> Result<PackageAssistant> {
    let generator = llm::build_generator(&config.agents)?;
    let workspace = config::resolve_workspace_dir(config, config_path);
    let system_prompt = system_prompt::load_system_prompt(Some(&workspace));

    let base_url = config::resolve_directory_base_url(config);
    let timeout = config::resolve_directory_timeout(config);
    log::info!(
        "package directory at {} (timeout {}s)",
        base_url,
        timeout.as_secs()
    );
    let directory = DirectoryClient::new(base_url, timeout);

    Ok(PackageAssistant::new(
        ToolDispatcher::new(directory),
        ResponseComposer::new(generator, system_prompt, AGENT_NAME),
    ))
}

/// All gateway routes over `state`, with permissive CORS.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .route("/health/live", get(health_live))
        .route("/chat", post(chat))
        .route("/chat/reset", post(chat_reset))
        .route("/agent/status", get(agent_status))
        .route("/agent/capabilities", get(agent_capabilities))
        .route("/tools/find-package", post(tool_find_package))
        .route("/tools/track-package", post(tool_track_package))
        .route("/tools/user-packages", post(tool_user_packages))
        .route("/tools/available", get(tools_available))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the gateway until Ctrl+C or SIGTERM.
pub async fn run_gateway(config: Config, config_path: PathBuf) -> Result<()> {
    let assistant = build_assistant(&config, &config_path)
        .context("initializing the package assistant")?;
    let bind = config::resolve_server_bind(&config);
    let port = config::resolve_server_port(&config);

    let state = GatewayState {
        config: Arc::new(config),
        assistant: Arc::new(assistant),
    };
    let app = router(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / — service info.
async fn service_info(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "agent": state.assistant.name(),
        "model": state.assistant.model_name(),
        "port": config::resolve_server_port(&state.config),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn health_ready() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}

async fn health_live() -> Json<serde_json::Value> {
    Json(json!({ "status": "alive" }))
}

/// POST /chat — one conversation turn. Always 200; failures are reported in the body.
async fn chat(
    State(state): State<GatewayState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let msg = req.into_inbound();
    log::info!(
        "chat: message from {} ({} chars)",
        msg.user_id.as_deref().unwrap_or("anonymous"),
        msg.text.chars().count()
    );
    let reply = state.assistant.handle_message(&msg).await;
    Json(ChatResponse::from_reply(reply, msg.conversation_id))
}

/// POST /chat/reset — turns are stateless, so there is nothing to clear.
async fn chat_reset(Query(q): Query<ResetQuery>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Conversation reset. Each message is handled independently.",
        "conversationId": q.conversation_id,
    }))
}

async fn agent_status(State(state): State<GatewayState>) -> Json<AgentStatus> {
    let a = &state.assistant;
    Json(AgentStatus {
        status: "active".to_string(),
        agent_name: a.name().to_string(),
        model: a.model_name().to_string(),
        capabilities: owned(a.capabilities()),
        example_queries: owned(a.example_queries()),
    })
}

async fn agent_capabilities(State(state): State<GatewayState>) -> Json<AgentCapabilities> {
    let a = &state.assistant;
    Json(AgentCapabilities {
        agent_name: a.name().to_string(),
        description: a.description().to_string(),
        capabilities: owned(a.capabilities()),
        example_queries: owned(a.example_queries()),
    })
}

async fn tool_find_package(
    State(state): State<GatewayState>,
    Query(q): Query<FindPackageQuery>,
) -> Json<ToolOutcome> {
    Json(
        state
            .assistant
            .tools()
            .find_package(&q.package_id, q.auth_token.as_deref())
            .await,
    )
}

async fn tool_track_package(
    State(state): State<GatewayState>,
    Query(q): Query<TrackPackageQuery>,
) -> Json<ToolOutcome> {
    Json(state.assistant.tools().track_package(&q.tracking_number).await)
}

async fn tool_user_packages(
    State(state): State<GatewayState>,
    Query(q): Query<UserPackagesQuery>,
) -> Json<ToolOutcome> {
    Json(
        state
            .assistant
            .tools()
            .user_packages(&q.user_id, &q.auth_token)
            .await,
    )
}

async fn tools_available() -> Json<serde_json::Value> {
    let tools: Vec<ToolInfo> = tools::available_tools();
    Json(json!({ "count": tools.len(), "tools": tools }))
}

fn owned(items: Vec<&'static str>) -> Vec<String> {
    items.into_iter().map(String::from).collect()
}
