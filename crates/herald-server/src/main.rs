mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use herald_api::auth::bootstrap_admin;
use herald_api::token::TokenService;
use herald_api::{AppState, AppStateInner};
use herald_db::Database;
use herald_dispatch::{Deliver, Dispatcher, TelegramBot};

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str =
    "herald=debug,herald_api=debug,herald_dispatch=debug,herald_db=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_placeholder_secret() {
        warn!("Using the placeholder JWT secret; set HERALD_JWT_SECRET in production");
    }

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);
    if !bootstrap_admin(&db, &config.admin_password)? {
        info!("Bootstrap admin already present");
    }

    let sender: Option<Arc<dyn Deliver>> = match &config.bot_token {
        Some(token) => {
            let bot = TelegramBot::with_api_url(&config.telegram_api_url, token)?;
            Some(Arc::new(bot))
        }
        None => {
            warn!("HERALD_BOT_TOKEN is not set; broadcasts will be refused");
            None
        }
    };

    let dispatcher = Dispatcher::new(db.clone(), sender, config.send_delay);
    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenService::new(&config.jwt_secret),
        dispatcher,
    });

    let app = herald_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Herald listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
