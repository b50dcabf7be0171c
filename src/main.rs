use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use skillsync::{
    config::Config,
    governor::RateGovernor,
    llm::LLM,
    recommendations::{InMemoryRecommendationStore, RecommendationService},
    routes::create_router,
    utils::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing; the guard flushes the log file on exit
    let _log_guard = init_logger(&config.logging)?;
    info!("Configuration loaded: {:?}", config.server);

    // One governor per process: its quota windows reset on restart
    let governor = Arc::new(RateGovernor::new(config.rate_limit.limits()));
    let limits = governor.limits();
    info!(
        per_minute = limits.per_minute,
        per_day = limits.per_day,
        min_spacing_ms = limits.min_spacing.as_millis() as u64,
        "Gemini rate limits"
    );

    let llm = Arc::new(
        LLM::gemini(&config.gemini, governor.clone(), config.rate_limit.permission_timeout())
            .map_err(|e| anyhow::anyhow!("Failed to create Gemini client: {}", e))?,
    );
    let recommendations = Arc::new(RecommendationService::new(
        llm,
        Arc::new(InMemoryRecommendationStore::new()),
        config.gemini.model.clone(),
    ));

    // Create shared state
    let state = AppState {
        config: config.clone(),
        governor,
        recommendations,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
