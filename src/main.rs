use std::path::PathBuf;

use product_catalog::{
    app::products::{handler::AppState, repository::open_repository, service::ProductService},
    build_router,
    config::load_config,
    infrastructure::logger::Logger,
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 第一个参数可指定配置文件
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let (config, source) = load_config(explicit.as_deref())?;
    config.validate()?;

    Logger::init(&config.logging);
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    info!("Opening {:?} product store...", config.database.backend);
    let repo = open_repository(&config.database).await.map_err(|e| {
        error!("Failed to open product store: {}", e);
        e
    })?;

    let state = AppState {
        product_service: ProductService::new(repo),
    };
    let app = build_router(state, &config.http);

    let listener = TcpListener::bind(config.http.socket_addr()).await?;
    let addr = listener.local_addr()?;

    info!("Product catalog running on http://{}", addr);
    info!("   GET    /products       - List products (?page=N, 10 per page)");
    info!("   POST   /products       - Create product");
    info!("   PUT    /products/:id   - Update product");
    info!("   DELETE /products/:id   - Delete product");
    info!("   GET    /health         - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
