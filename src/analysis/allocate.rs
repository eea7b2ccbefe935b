//! Rank-based budget reallocation.
//!
//! Campaigns are ranked by marginal ROAS and a policy decides which ranks
//! gain budget and which give it up. This is a rank-threshold heuristic: it
//! does not check that the shift raises total return.

use std::{cmp::Ordering, collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    analysis::{
        aggregate::CampaignAggregate,
        marginal::{ConfidenceBasis, MarginalEstimate},
    },
    error::{ConfigError, ConfigResult},
};

/// Default share of budget moved per campaign.
pub const DEFAULT_SHIFT_FRACTION: f64 = 0.10;

/// Budget action for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "Increase Budget")]
    Increase,
    #[serde(rename = "Decrease Budget")]
    Decrease,
    #[serde(rename = "Hold")]
    Hold,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Increase => "Increase Budget",
            Self::Decrease => "Decrease Budget",
            Self::Hold => "Hold",
        }
    }

    /// Signed budget change for this action.
    pub fn modifier(&self, shift_fraction: f64) -> f64 {
        match self {
            Self::Increase => shift_fraction,
            Self::Decrease => -shift_fraction,
            Self::Hold => 0.0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Joined aggregate and estimate plus the recommended budget change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub campaign_id: String,
    pub campaign_name: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub conversion_value: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
    pub conversion_rate: f64,
    pub beta_coefficient: f64,
    pub intercept: f64,
    pub marginal_roas: f64,
    pub model_confidence: f64,
    pub confidence_basis: ConfidenceBasis,
    pub mean_spend: f64,
    pub observations: usize,
    pub recommended_action: Action,
    pub budget_modifier: f64,
}

impl Recommendation {
    /// Unclassified join of one campaign's aggregate and estimate.
    pub fn join(aggregate: &CampaignAggregate, estimate: &MarginalEstimate) -> Self {
        Self {
            campaign_id: aggregate.campaign_id.clone(),
            campaign_name: aggregate.campaign_name.clone(),
            spend: aggregate.spend,
            impressions: aggregate.impressions,
            clicks: aggregate.clicks,
            conversions: aggregate.conversions,
            conversion_value: aggregate.conversion_value,
            ctr: aggregate.ctr,
            cpc: aggregate.cpc,
            cpa: aggregate.cpa,
            roas: aggregate.roas,
            conversion_rate: aggregate.conversion_rate,
            beta_coefficient: estimate.beta_coefficient,
            intercept: estimate.intercept,
            marginal_roas: estimate.marginal_roas,
            model_confidence: estimate.model_confidence,
            confidence_basis: estimate.confidence_basis,
            mean_spend: estimate.mean_spend,
            observations: estimate.observations,
            recommended_action: Action::Hold,
            budget_modifier: 0.0,
        }
    }
}

/// Ordering and partitioning rule applied to joined campaigns.
pub trait AllocationPolicy {
    /// Compare two rows; rows ordered `Less` come first in the ranking.
    fn compare(&self, a: &Recommendation, b: &Recommendation) -> Ordering {
        rank_by_marginal_roas(a, b)
    }

    /// Action for the row at `rank` (0-based) out of `total` ranked rows.
    fn classify(&self, rank: usize, total: usize) -> Action;
}

/// Highest marginal ROAS first; NaN sorts last.
pub fn rank_by_marginal_roas(a: &Recommendation, b: &Recommendation) -> Ordering {
    let (x, y) = (a.marginal_roas, b.marginal_roas);
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    }
}

/// Top `floor(n/2)` increase, the rest decrease; fewer than two rows hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfSplit;

impl AllocationPolicy for HalfSplit {
    fn classify(&self, rank: usize, total: usize) -> Action {
        if total < 2 {
            Action::Hold
        } else if rank < total / 2 {
            Action::Increase
        } else {
            Action::Decrease
        }
    }
}

/// Top `floor(n * increase_share)` increase, bottom `floor(n * decrease_share)`
/// decrease, everything between holds.
#[derive(Debug, Clone, Copy)]
pub struct QuantileSplit {
    increase_share: f64,
    decrease_share: f64,
}

impl QuantileSplit {
    pub fn new(increase_share: f64, decrease_share: f64) -> ConfigResult<Self> {
        let valid = |share: f64| (0.0..=1.0).contains(&share);
        if !valid(increase_share)
            || !valid(decrease_share)
            || increase_share + decrease_share > 1.0
        {
            return Err(ConfigError::InvalidPolicyShares {
                increase: increase_share,
                decrease: decrease_share,
            });
        }
        Ok(Self {
            increase_share,
            decrease_share,
        })
    }
}

impl AllocationPolicy for QuantileSplit {
    fn classify(&self, rank: usize, total: usize) -> Action {
        let top = (total as f64 * self.increase_share).floor() as usize;
        let bottom = (total as f64 * self.decrease_share).floor() as usize;
        if rank < top {
            Action::Increase
        } else if rank >= total.saturating_sub(bottom) {
            Action::Decrease
        } else {
            Action::Hold
        }
    }
}

pub fn validate_shift_fraction(shift_fraction: f64) -> ConfigResult<()> {
    if shift_fraction > 0.0 && shift_fraction < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ShiftFractionOutOfRange(shift_fraction))
    }
}

/// Rank campaigns with [`HalfSplit`].
pub fn allocate(
    aggregates: &[CampaignAggregate],
    estimates: &[MarginalEstimate],
    shift_fraction: f64,
) -> ConfigResult<Vec<Recommendation>> {
    allocate_with(aggregates, estimates, shift_fraction, &HalfSplit)
}

/// Join, rank and classify campaigns under `policy`.
///
/// Aggregates without a matching estimate are dropped. The sort is stable, so
/// ties keep the order of `aggregates`. Fewer than two ranked campaigns all
/// hold, whatever the policy.
pub fn allocate_with<P: AllocationPolicy + ?Sized>(
    aggregates: &[CampaignAggregate],
    estimates: &[MarginalEstimate],
    shift_fraction: f64,
    policy: &P,
) -> ConfigResult<Vec<Recommendation>> {
    validate_shift_fraction(shift_fraction)?;

    let by_id: HashMap<&str, &MarginalEstimate> = estimates
        .iter()
        .map(|e| (e.campaign_id.as_str(), e))
        .collect();

    let mut joined: Vec<Recommendation> = aggregates
        .iter()
        .filter_map(|aggregate| {
            by_id
                .get(aggregate.campaign_id.as_str())
                .map(|estimate| Recommendation::join(aggregate, estimate))
        })
        .collect();

    let dropped = aggregates.len() - joined.len();
    if dropped > 0 {
        warn!(dropped, "campaigns without an estimate cannot be ranked");
    }

    joined.sort_by(|a, b| policy.compare(a, b));
    let total = joined.len();
    for (rank, row) in joined.iter_mut().enumerate() {
        row.recommended_action = if total < 2 {
            Action::Hold
        } else {
            policy.classify(rank, total)
        };
        row.budget_modifier = row.recommended_action.modifier(shift_fraction);
    }

    info!(
        ranked = total,
        increase = joined
            .iter()
            .filter(|r| r.recommended_action == Action::Increase)
            .count(),
        shift_fraction,
        "allocated budget shifts"
    );
    Ok(joined)
}
