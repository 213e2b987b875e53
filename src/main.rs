use std::net::SocketAddr;

use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, errors::Result, routes::app_router, state::AppState};

pub mod actions;
pub mod audit;
pub mod config;
pub mod consts;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load_with_dotenv()?;
    info!(?config, "Starting server");
    let bind_addr = config.bind_addr.clone();
    let state = AppState::init(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Serving NAEI admin at http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app(state)?.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

pub fn app(state: AppState) -> Result<Router> {
    app_router(state)
}
