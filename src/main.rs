mod config;
mod db;
mod error;
mod handlers;
mod models;
mod polls;
mod views;

use config::Config;
use db::Database;
use handlers::AppState;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use views::Templates;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::load();

    // Initialize database
    let database = match Database::new(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    match database.question_count().await {
        Ok(count) => info!("Database ready with {} question(s)", count),
        Err(e) => {
            error!("Failed to read from database: {}", e);
            return;
        }
    }

    let templates = match Templates::new() {
        Ok(templates) => templates,
        Err(e) => {
            error!("Failed to load templates: {}", e);
            return;
        }
    };

    let state = Arc::new(AppState {
        database,
        templates,
        index_limit: config.index_limit,
    });
    let app = handlers::router(state);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            return;
        }
    };
    info!("Server running on {address}");

    if let Err(why) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {:?}", why);
    }

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
}
