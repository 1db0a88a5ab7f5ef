use movie_service::config::MovieConfig;
use movie_service::services::init_metrics;
use movie_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MovieConfig::load()?;

    init_tracing(
        "movie-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start movie-service: {}", e);
        e
    })?;
    application.run_until_stopped().await?;

    tracing::info!("Movie service stopped");
    Ok(())
}
