//! Campaign analytics: aggregation, marginal estimation and reallocation.

pub mod aggregate;
pub mod allocate;
pub mod marginal;
pub mod regression;

use serde::Serialize;
use tracing::info;

pub use aggregate::{aggregate, summarize, CampaignAggregate, PortfolioSummary};
pub use allocate::{
    allocate, allocate_with, Action, AllocationPolicy, HalfSplit, QuantileSplit, Recommendation,
};
pub use marginal::{estimate, fit_campaign, ConfidenceBasis, EstimatorConfig, MarginalEstimate};

use crate::{data::DailyRecord, error::ConfigResult};

/// Every table derived from one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: PortfolioSummary,
    pub aggregates: Vec<CampaignAggregate>,
    pub estimates: Vec<MarginalEstimate>,
    pub recommendations: Vec<Recommendation>,
}

/// Aggregate, estimate and allocate in one pass with the default half split.
pub fn recommend(
    records: &[DailyRecord],
    estimator: &EstimatorConfig,
    shift_fraction: f64,
) -> ConfigResult<Analysis> {
    recommend_with(records, estimator, shift_fraction, &HalfSplit)
}

/// Aggregate, estimate and allocate under a custom policy.
pub fn recommend_with<P: AllocationPolicy + ?Sized>(
    records: &[DailyRecord],
    estimator: &EstimatorConfig,
    shift_fraction: f64,
    policy: &P,
) -> ConfigResult<Analysis> {
    allocate::validate_shift_fraction(shift_fraction)?;
    let aggregates = aggregate(records);
    let estimates = estimate(records, estimator)?;
    let recommendations = allocate_with(&aggregates, &estimates, shift_fraction, policy)?;
    let summary = summarize(&aggregates);
    info!(
        campaigns = aggregates.len(),
        recommendations = recommendations.len(),
        global_roas = summary.global_roas,
        "analysis complete"
    );
    Ok(Analysis {
        summary,
        aggregates,
        estimates,
        recommendations,
    })
}
