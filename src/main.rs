use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use mlsearch::config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlsearch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: config.json, then env overrides / 加载配置
    let app_config = config::load_from_env(&config::get_config_path())?;
    tracing::info!(
        "Index {} via {:?} at {}:{}, limit {}",
        app_config.index.index,
        app_config.index.transport,
        app_config.index.host,
        app_config.index.port,
        app_config.index.limit
    );

    // Dictionary loading happens here, once / 词典只在启动时加载一次
    let pipeline = mlsearch::build_pipeline(&app_config)?;
    let backend = pipeline.backend_name().to_string();
    let state = Arc::new(AppState::new(pipeline, backend));

    let app = api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
