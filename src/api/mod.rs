//! HTTP layer exposing the analysis tables to the dashboard.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    data::{self, DailyRecord},
};

/// Dataset currently served, with the seed that produced it.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub seed: u64,
    pub records: Vec<DailyRecord>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub dataset: Arc<RwLock<Dataset>>,
}

impl AppState {
    /// Simulate the initial dataset from `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let records = data::generate_seeded(&settings.simulation())
            .context("simulate initial dataset")?;
        Ok(Self {
            dataset: Arc::new(RwLock::new(Dataset {
                seed: settings.seed,
                records,
            })),
            settings,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/records", get(routes::list_records))
        .route("/aggregates", get(routes::list_aggregates))
        .route("/summary", get(routes::summary))
        .route("/recommendations", get(routes::list_recommendations))
        .route("/regenerate", post(routes::regenerate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let state = AppState::new(settings)?;
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving adoptix API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
