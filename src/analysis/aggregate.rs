//! Campaign-level totals and rate KPIs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::DailyRecord;

/// Summed volume metrics and derived KPIs for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAggregate {
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
}

impl CampaignAggregate {
    fn seed(record: &DailyRecord) -> Self {
        Self {
            campaign_id: record.campaign_id.clone(),
            campaign_name: record.campaign_name.clone(),
            spend: 0.0,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            conversion_value: 0.0,
            ctr: 0.0,
            cpc: 0.0,
            cpa: 0.0,
            roas: 0.0,
            conversion_rate: 0.0,
        }
    }

    fn absorb(&mut self, record: &DailyRecord) {
        self.spend += record.spend;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
        self.conversions += record.conversions;
        self.conversion_value += record.conversion_value;
    }

    fn derive_rates(&mut self) {
        self.ctr = ratio(self.clicks as f64, self.impressions as f64);
        self.cpc = ratio(self.spend, self.clicks as f64);
        self.cpa = ratio(self.spend, self.conversions as f64);
        self.roas = ratio(self.conversion_value, self.spend);
        self.conversion_rate = ratio(self.conversions as f64, self.clicks as f64);
    }
}

/// Portfolio-wide headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub campaigns: usize,
    pub total_spend: f64,
    pub total_conversion_value: f64,
    pub total_conversions: u64,
    pub global_roas: f64,
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Collapse daily records to one row per campaign, in first-seen order.
pub fn aggregate(records: &[DailyRecord]) -> Vec<CampaignAggregate> {
    let mut grouped: IndexMap<&str, CampaignAggregate> = IndexMap::new();
    for record in records {
        grouped
            .entry(record.campaign_id.as_str())
            .or_insert_with(|| CampaignAggregate::seed(record))
            .absorb(record);
    }
    grouped
        .into_values()
        .map(|mut row| {
            row.derive_rates();
            row
        })
        .collect()
}

/// Totals across every aggregated campaign.
pub fn summarize(aggregates: &[CampaignAggregate]) -> PortfolioSummary {
    let total_spend: f64 = aggregates.iter().map(|a| a.spend).sum();
    let total_conversion_value: f64 = aggregates.iter().map(|a| a.conversion_value).sum();
    PortfolioSummary {
        campaigns: aggregates.len(),
        total_spend,
        total_conversion_value,
        total_conversions: aggregates.iter().map(|a| a.conversions).sum(),
        global_roas: ratio(total_conversion_value, total_spend),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(
        id: &str,
        spend: f64,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        value: f64,
    ) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            campaign_id: id.into(),
            campaign_name: format!("name {id}"),
            spend,
            impressions,
            clicks,
            conversions,
            conversion_value: value,
        }
    }

    #[test]
    fn sums_volume_and_derives_rates() {
        let rows = aggregate(&[
            record("A", 100.0, 10_000, 100, 5, 250.0),
            record("A", 300.0, 30_000, 300, 15, 750.0),
        ]);
        assert_eq!(rows.len(), 1);
        let a = &rows[0];
        assert_eq!(a.spend, 400.0);
        assert_eq!(a.clicks, 400);
        assert!((a.ctr - 0.01).abs() < 1e-12);
        assert!((a.cpc - 1.0).abs() < 1e-12);
        assert!((a.cpa - 20.0).abs() < 1e-12);
        assert!((a.roas - 2.5).abs() < 1e-12);
        assert!((a.conversion_rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn zero_denominators_yield_zero() {
        let rows = aggregate(&[record("Z", 0.0, 0, 0, 0, 0.0)]);
        let z = &rows[0];
        for value in [z.ctr, z.cpc, z.cpa, z.roas, z.conversion_rate] {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn keeps_first_seen_order_and_first_name() {
        let mut later = record("B", 1.0, 1, 1, 0, 0.0);
        later.campaign_name = "renamed".into();
        let rows = aggregate(&[
            record("B", 1.0, 1, 1, 0, 0.0),
            record("A", 1.0, 1, 1, 0, 0.0),
            later,
        ]);
        let ids: Vec<_> = rows.iter().map(|r| r.campaign_id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
        assert_eq!(rows[0].campaign_name, "name B");
    }

    #[test]
    fn summary_totals_portfolio() {
        let rows = aggregate(&[
            record("A", 100.0, 10, 5, 2, 300.0),
            record("B", 100.0, 10, 5, 1, 100.0),
        ]);
        let summary = summarize(&rows);
        assert_eq!(summary.campaigns, 2);
        assert_eq!(summary.total_conversions, 3);
        assert!((summary.global_roas - 2.0).abs() < 1e-12);
        assert_eq!(summarize(&[]).global_roas, 0.0);
    }
}
