//! Synthetic campaign performance with a known diminishing-returns curve.
//!
//! Every campaign gets an efficiency factor (scales click-through) and a
//! saturation constant (discounts conversions as spend grows). The estimator
//! is validated against data produced here, so all randomness is drawn from
//! a caller-supplied stream.

use chrono::{Duration, NaiveDate};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

const CAMPAIGN_TYPES: &[&str] = &[
    "Awareness",
    "Retargeting",
    "Prospecting",
    "Competitor",
    "Loyalty",
];

const CHANNELS: &[&str] = &["Facebook", "Instagram", "Audience Network"];

const SPEND_RANGE: (f64, f64) = (100.0, 1000.0);
const CPM_RANGE: (f64, f64) = (5.0, 15.0);
const CTR_RANGE: (f64, f64) = (0.005, 0.02);
const CONVERSION_RATE_RANGE: (f64, f64) = (0.02, 0.10);
const EFFICIENCY_RANGE: (f64, f64) = (0.5, 2.0);
const SATURATION_RANGE: (f64, f64) = (1000.0, 5000.0);
const ORDER_VALUE_MEAN: f64 = 50.0;
const ORDER_VALUE_STD: f64 = 10.0;

/// One campaign's performance on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub campaign_id: String,
    pub campaign_name: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub conversion_value: f64,
}

/// Parameters shaping one campaign's response curve.
#[derive(Debug, Clone)]
pub(crate) struct CampaignProfile {
    pub campaign_id: String,
    pub campaign_name: String,
    pub efficiency: f64,
    pub saturation: f64,
}

impl CampaignProfile {
    fn draw<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Self {
        let kind = CAMPAIGN_TYPES.choose(rng).copied().unwrap_or("Awareness");
        let channel = CHANNELS.choose(rng).copied().unwrap_or("Facebook");
        let efficiency = rng.gen_range(EFFICIENCY_RANGE.0..EFFICIENCY_RANGE.1);
        let saturation = rng.gen_range(SATURATION_RANGE.0..SATURATION_RANGE.1);
        let ordinal = index + 1;
        Self {
            campaign_id: format!("CMP_{ordinal:03}"),
            campaign_name: format!("{kind} - {channel} - {ordinal}"),
            efficiency,
            saturation,
        }
    }
}

/// Multiplier applied to raw conversions; strictly decreasing in `spend`.
pub fn saturation_discount(spend: f64, saturation: f64) -> f64 {
    1.0 / (1.0 + spend / saturation)
}

/// Expected conversions for a given spend, holding the per-record draws at their means.
pub fn expected_conversions(spend: f64, efficiency: f64, saturation: f64) -> f64 {
    let cpm = midpoint(CPM_RANGE);
    let ctr = midpoint(CTR_RANGE) * efficiency;
    let rate = midpoint(CONVERSION_RATE_RANGE);
    spend / cpm * 1000.0 * ctr * rate * saturation_discount(spend, saturation)
}

fn midpoint(range: (f64, f64)) -> f64 {
    (range.0 + range.1) / 2.0
}

/// Shape of a generated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub days: u32,
    pub campaign_count: u32,
    pub seed: u64,
    /// First date in the table.
    pub start_date: NaiveDate,
}

impl SimulationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.days == 0 {
            return Err(ConfigError::NonPositiveDays);
        }
        if self.campaign_count == 0 {
            return Err(ConfigError::NonPositiveCampaignCount);
        }
        Ok(())
    }

    /// Random stream scoped to this configuration's seed.
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

/// Generate `days * campaign_count` records using `config.seed`.
pub fn generate_seeded(config: &SimulationConfig) -> ConfigResult<Vec<DailyRecord>> {
    let mut rng = config.rng();
    generate(config, &mut rng)
}

/// Generate records drawing from `rng`.
///
/// Profiles are drawn first, then records day by day with campaigns in id
/// order inside each day.
pub fn generate<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> ConfigResult<Vec<DailyRecord>> {
    config.validate()?;

    let profiles: Vec<CampaignProfile> = (0..config.campaign_count as usize)
        .map(|idx| CampaignProfile::draw(idx, rng))
        .collect();
    for profile in &profiles {
        debug!(
            campaign_id = %profile.campaign_id,
            efficiency = profile.efficiency,
            saturation = profile.saturation,
            "drew campaign profile"
        );
    }

    // Mean and std are compile-time constants, so construction cannot fail.
    let order_value = Normal::new(ORDER_VALUE_MEAN, ORDER_VALUE_STD)
        .unwrap_or_else(|_| unreachable!("order value distribution parameters are valid"));

    let mut records = Vec::with_capacity(config.days as usize * profiles.len());
    for day in 0..config.days {
        let date = config.start_date + Duration::days(i64::from(day));
        for profile in &profiles {
            records.push(draw_record(date, profile, &order_value, rng));
        }
    }

    info!(
        days = config.days,
        campaigns = config.campaign_count,
        seed = config.seed,
        rows = records.len(),
        "generated campaign performance"
    );
    Ok(records)
}

fn draw_record<R: Rng + ?Sized>(
    date: NaiveDate,
    profile: &CampaignProfile,
    order_value: &Normal,
    rng: &mut R,
) -> DailyRecord {
    let spend = rng.gen_range(SPEND_RANGE.0..SPEND_RANGE.1);

    let cpm = rng.gen_range(CPM_RANGE.0..CPM_RANGE.1);
    let impressions = spend / cpm * 1000.0;

    let ctr = rng.gen_range(CTR_RANGE.0..CTR_RANGE.1) * profile.efficiency;
    let clicks = impressions * ctr;

    let base_rate = rng.gen_range(CONVERSION_RATE_RANGE.0..CONVERSION_RATE_RANGE.1);
    let raw_conversions = clicks * base_rate;
    let conversions = (raw_conversions * saturation_discount(spend, profile.saturation))
        .max(0.0)
        .floor();

    let aov: f64 = rng.sample(order_value);
    let conversion_value = conversions * aov;

    DailyRecord {
        date,
        campaign_id: profile.campaign_id.clone(),
        campaign_name: profile.campaign_name.clone(),
        spend: round_cents(spend),
        impressions: impressions as u64,
        clicks: clicks as u64,
        conversions: conversions as u64,
        conversion_value: round_cents(conversion_value.max(0.0)),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(days: u32, campaign_count: u32, seed: u64) -> SimulationConfig {
        SimulationConfig {
            days,
            campaign_count,
            seed,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn produces_one_record_per_campaign_per_day() {
        let records = generate_seeded(&config(7, 4, 1)).unwrap();
        assert_eq!(records.len(), 28);
        assert_eq!(records[0].campaign_id, "CMP_001");
        assert_eq!(records[3].campaign_id, "CMP_004");
        assert_eq!(records[4].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn campaign_names_carry_type_channel_and_ordinal() {
        let records = generate_seeded(&config(1, 3, 9)).unwrap();
        for (idx, record) in records.iter().enumerate() {
            let parts: Vec<&str> = record.campaign_name.split(" - ").collect();
            assert_eq!(parts.len(), 3);
            assert!(CAMPAIGN_TYPES.contains(&parts[0]));
            assert!(CHANNELS.contains(&parts[1]));
            assert_eq!(parts[2], (idx + 1).to_string());
        }
    }

    #[test]
    fn records_respect_schema_bounds() {
        for record in generate_seeded(&config(30, 5, 7)).unwrap() {
            assert!((100.0..=1000.0).contains(&record.spend));
            assert!(record.clicks <= record.impressions);
            assert!(record.conversion_value >= 0.0);
            assert!(record.conversions <= record.clicks);
        }
    }

    #[test]
    fn profiles_stay_inside_their_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for idx in 0..200 {
            let profile = CampaignProfile::draw(idx, &mut rng);
            assert!((0.5..2.0).contains(&profile.efficiency));
            assert!((1000.0..5000.0).contains(&profile.saturation));
        }
    }

    #[test]
    fn rejects_empty_shapes() {
        assert_eq!(
            generate_seeded(&config(0, 3, 1)),
            Err(ConfigError::NonPositiveDays)
        );
        assert_eq!(
            generate_seeded(&config(3, 0, 1)),
            Err(ConfigError::NonPositiveCampaignCount)
        );
    }

    #[test]
    fn discount_decreases_with_spend() {
        let low = saturation_discount(100.0, 2000.0);
        let high = saturation_discount(900.0, 2000.0);
        assert!(low > high);
        assert!(high > 0.0);
    }

    #[test]
    fn expected_response_is_concave() {
        for spend in [100.0, 250.0, 500.0] {
            let single = expected_conversions(spend, 1.2, 2500.0);
            let double = expected_conversions(spend * 2.0, 1.2, 2500.0);
            assert!(double > single);
            assert!(double < 2.0 * single);
        }
    }
}
