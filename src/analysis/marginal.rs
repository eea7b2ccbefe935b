//! Per-campaign log-linear estimates of marginal return on spend.
//!
//! Each campaign is fitted independently with
//! `conversion_value ~ intercept + beta * ln(1 + spend)`. Since
//! `d/dspend ln(1 + spend) = 1 / (spend + 1)`, the marginal value of the next
//! dollar at the campaign's mean spend is `beta / (mean_spend + 1)`.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    analysis::regression::{fit_line, FitError, LineFit},
    data::DailyRecord,
    error::{ConfigError, ConfigResult},
};

/// Minimum number of daily rows before a campaign is fitted.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 5;

/// Data on which `model_confidence` was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBasis {
    /// R² on the rows the model was trained on; optimistic.
    InSample,
    /// R² on a chronological tail held out from training.
    Holdout,
}

/// Fitted response of one campaign's value to its spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalEstimate {
    pub campaign_id: String,
    pub beta_coefficient: f64,
    pub intercept: f64,
    pub marginal_roas: f64,
    pub model_confidence: f64,
    pub confidence_basis: ConfidenceBasis,
    pub mean_spend: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub min_observations: usize,
    /// Share of the most recent rows scored out of sample, if any.
    pub holdout_fraction: Option<f64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            holdout_fraction: None,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_observations < 2 {
            return Err(ConfigError::MinObservationsTooSmall(self.min_observations));
        }
        if let Some(fraction) = self.holdout_fraction {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(ConfigError::HoldoutFractionOutOfRange(fraction));
            }
        }
        Ok(())
    }
}

/// Reason a campaign produced no estimate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitSkip {
    #[error("insufficient data: {observed} observations, need {required}")]
    InsufficientData { observed: usize, required: usize },
    #[error("degenerate fit: {0}")]
    DegenerateFit(#[from] FitError),
}

/// Estimate every campaign present in `records`, in first-seen order.
///
/// Campaigns with too few rows or a degenerate fit are omitted.
pub fn estimate(
    records: &[DailyRecord],
    config: &EstimatorConfig,
) -> ConfigResult<Vec<MarginalEstimate>> {
    config.validate()?;
    let groups = group_by_campaign(records);
    let attempted = groups.len();

    let estimates: Vec<MarginalEstimate> = groups
        .par_iter()
        .filter_map(|(campaign_id, rows)| fit_campaign(campaign_id, rows, config))
        .collect();

    info!(
        attempted,
        estimated = estimates.len(),
        "fitted marginal response models"
    );
    Ok(estimates)
}

/// Fit one campaign's rows, returning `None` when the campaign must be skipped.
pub fn fit_campaign(
    campaign_id: &str,
    rows: &[&DailyRecord],
    config: &EstimatorConfig,
) -> Option<MarginalEstimate> {
    match try_fit_campaign(campaign_id, rows, config) {
        Ok(estimate) => Some(estimate),
        Err(reason) => {
            debug!(%campaign_id, %reason, "skipping campaign");
            None
        }
    }
}

/// Like [`fit_campaign`] but reports why a campaign was skipped.
pub fn try_fit_campaign(
    campaign_id: &str,
    rows: &[&DailyRecord],
    config: &EstimatorConfig,
) -> Result<MarginalEstimate, FitSkip> {
    if rows.len() < config.min_observations {
        return Err(FitSkip::InsufficientData {
            observed: rows.len(),
            required: config.min_observations,
        });
    }

    let features: Vec<f64> = rows.iter().map(|r| r.spend.ln_1p()).collect();
    let targets: Vec<f64> = rows.iter().map(|r| r.conversion_value).collect();
    let line = fit_line(&features, &targets)?;

    let mean_spend = rows.iter().map(|r| r.spend).sum::<f64>() / rows.len() as f64;
    let (model_confidence, confidence_basis) = match config.holdout_fraction {
        Some(fraction) => match holdout_r_squared(rows, fraction) {
            Some(r2) => (r2, ConfidenceBasis::Holdout),
            None => (line.r_squared(&features, &targets), ConfidenceBasis::InSample),
        },
        None => (line.r_squared(&features, &targets), ConfidenceBasis::InSample),
    };

    Ok(MarginalEstimate {
        campaign_id: campaign_id.to_string(),
        beta_coefficient: line.slope,
        intercept: line.intercept,
        marginal_roas: line.slope / (mean_spend + 1.0),
        model_confidence,
        confidence_basis,
        mean_spend,
        observations: rows.len(),
    })
}

/// R² of a model trained on the earliest rows and scored on the latest ones.
fn holdout_r_squared(rows: &[&DailyRecord], fraction: f64) -> Option<f64> {
    let mut ordered: Vec<&DailyRecord> = rows.to_vec();
    ordered.sort_by_key(|r| r.date);
    let test_len = ((ordered.len() as f64) * fraction).round() as usize;
    let train_len = ordered.len().checked_sub(test_len)?;
    if train_len < 2 || test_len < 2 {
        return None;
    }
    let (train, test) = ordered.split_at(train_len);
    let split = |part: &[&DailyRecord]| -> (Vec<f64>, Vec<f64>) {
        part.iter()
            .map(|r| (r.spend.ln_1p(), r.conversion_value))
            .unzip()
    };
    let (train_x, train_y) = split(train);
    let (test_x, test_y) = split(test);
    let line: LineFit = fit_line(&train_x, &train_y).ok()?;
    Some(line.r_squared(&test_x, &test_y))
}

/// Group rows by campaign id, preserving first-seen order of campaigns and rows.
pub fn group_by_campaign(records: &[DailyRecord]) -> Vec<(String, Vec<&DailyRecord>)> {
    let mut groups: IndexMap<&str, Vec<&DailyRecord>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.campaign_id.as_str())
            .or_default()
            .push(record);
    }
    groups
        .into_iter()
        .map(|(id, rows)| (id.to_string(), rows))
        .collect()
}
