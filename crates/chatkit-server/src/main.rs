use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatkit_agent::{AgentBuilder, AgentConfig};
use chatkit_server::{build_router, AppState, ChatServer, Config};
use chatkit_store::{MemoryStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config);

    tracing::info!("Starting ChatKit server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let chat_server = match build_chat_server(&config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to initialize agent: {:#}", e);
            None
        }
    };
    if chat_server.is_none() {
        tracing::warn!("Agent unavailable; POST /chatkit will answer 503");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, chat_server));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_chat_server(
    config: &Config,
    store: Arc<dyn Store>,
) -> anyhow::Result<Option<ChatServer>> {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY is not set");
        return Ok(None);
    };

    let agent = AgentBuilder::new()
        .openai(api_key, config.agent.base_url.as_deref())?
        .config(AgentConfig::from(&config.agent))
        .build()?;
    tracing::info!(model = %agent.config().model, "Agent initialized");

    Ok(Some(
        ChatServer::new(store, Arc::new(agent)).with_history_limit(config.agent.history_limit),
    ))
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
