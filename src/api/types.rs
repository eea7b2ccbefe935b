//! Query parameters and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub shift_fraction: Option<f64>,
    pub holdout_fraction: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateQuery {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateResponse {
    pub seed: u64,
    pub rows: usize,
}
