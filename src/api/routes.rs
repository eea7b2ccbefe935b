//! HTTP route handlers for Axum.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{
    analysis::{self, CampaignAggregate, PortfolioSummary, Recommendation},
    api::types::{RecommendationQuery, RegenerateQuery, RegenerateResponse},
    data::{self, DailyRecord},
};

use super::{AppState, Dataset};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_records(State(state): State<AppState>) -> ApiResult<Vec<DailyRecord>> {
    let dataset = state.dataset.read().await;
    Ok(Json(dataset.records.clone()))
}

pub async fn list_aggregates(State(state): State<AppState>) -> ApiResult<Vec<CampaignAggregate>> {
    let dataset = state.dataset.read().await;
    Ok(Json(analysis::aggregate(&dataset.records)))
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<PortfolioSummary> {
    let dataset = state.dataset.read().await;
    Ok(Json(analysis::summarize(&analysis::aggregate(&dataset.records))))
}

pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Vec<Recommendation>> {
    let mut estimator = state.settings.estimator();
    if query.holdout_fraction.is_some() {
        estimator.holdout_fraction = query.holdout_fraction;
    }
    let shift_fraction = query
        .shift_fraction
        .unwrap_or(state.settings.shift_fraction);

    let records = state.dataset.read().await.records.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        analysis::recommend(&records, &estimator, shift_fraction)
    })
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    outcome
        .map(|analysis| Json(analysis.recommendations))
        .map_err(|err| {
            warn!(%err, "rejected recommendation request");
            (StatusCode::BAD_REQUEST, err.to_string())
        })
}

pub async fn regenerate(
    State(state): State<AppState>,
    Query(query): Query<RegenerateQuery>,
) -> ApiResult<RegenerateResponse> {
    let mut config = state.settings.simulation();
    if let Some(seed) = query.seed {
        config.seed = seed;
    }
    let records = data::generate_seeded(&config)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let rows = records.len();
    *state.dataset.write().await = Dataset {
        seed: config.seed,
        records,
    };
    info!(seed = config.seed, rows, "regenerated dataset");
    Ok(Json(RegenerateResponse {
        seed: config.seed,
        rows,
    }))
}
