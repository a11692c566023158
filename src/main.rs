use anyhow::Context;
use battery_health_predictor::{
    config::Config,
    server::{router, AppState},
    types::InputRecord,
    Artifacts,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env();
    tracing::info!("config: {:?}", cfg);

    let artifacts = Artifacts::from_config(&cfg).context("failed to load artifacts")?;

    // Warmup with the form defaults so a broken model fails before we listen
    let (_, p) = artifacts
        .predict(&InputRecord::default())
        .context("warmup prediction failed")?;
    tracing::info!("warmup forward ok: {}", p.display());

    let app = router(AppState::new(artifacts, cfg.log_pred));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
