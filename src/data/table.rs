//! Conversion between typed rows and polars data frames.
//!
//! Frames are how the presentation layer hands a dataset to the core and
//! receives results back.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::{DataFrame, DataType, NamedFrom, Series};
use tracing::warn;

use crate::{
    analysis::{CampaignAggregate, Recommendation},
    data::DailyRecord,
};

/// Build a frame with one row per daily record.
pub fn records_to_frame(records: &[DailyRecord]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "date".into(),
            records
                .iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "campaign_id".into(),
            records
                .iter()
                .map(|r| r.campaign_id.clone())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "campaign_name".into(),
            records
                .iter()
                .map(|r| r.campaign_name.clone())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "spend".into(),
            records.iter().map(|r| r.spend).collect::<Vec<_>>(),
        ),
        Series::new(
            "impressions".into(),
            records
                .iter()
                .map(|r| r.impressions as i64)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "clicks".into(),
            records.iter().map(|r| r.clicks as i64).collect::<Vec<_>>(),
        ),
        Series::new(
            "conversions".into(),
            records
                .iter()
                .map(|r| r.conversions as i64)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "conversion_value".into(),
            records
                .iter()
                .map(|r| r.conversion_value)
                .collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

/// Read daily records out of a frame carrying the record columns.
///
/// Numeric columns are cast, so integer spend or float counts are accepted.
/// Rows with a null in any column are skipped; a negative count is an error.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<DailyRecord>> {
    let dates = string_column(df, "date")?;
    let ids = string_column(df, "campaign_id")?;
    let names = string_column(df, "campaign_name")?;
    let spend = float_column(df, "spend")?;
    let impressions = count_column(df, "impressions")?;
    let clicks = count_column(df, "clicks")?;
    let conversions = count_column(df, "conversions")?;
    let value = float_column(df, "conversion_value")?;

    let mut rows = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for idx in 0..df.height() {
        if let (
            Some(date),
            Some(campaign_id),
            Some(campaign_name),
            Some(spend),
            Some(impressions),
            Some(clicks),
            Some(conversions),
            Some(conversion_value),
        ) = (
            dates[idx].as_deref(),
            ids[idx].clone(),
            names[idx].clone(),
            spend[idx],
            impressions[idx],
            clicks[idx],
            conversions[idx],
            value[idx],
        ) {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("parse date `{date}` at row {idx}"))?;
            rows.push(DailyRecord {
                date,
                campaign_id,
                campaign_name,
                spend,
                impressions,
                clicks,
                conversions,
                conversion_value,
            });
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!(skipped, "dropped record rows containing nulls");
    }
    Ok(rows)
}

/// Frame view of the per-campaign aggregates.
pub fn aggregates_to_frame(rows: &[CampaignAggregate]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "campaign_id".into(),
            rows.iter().map(|r| r.campaign_id.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            "campaign_name".into(),
            rows.iter()
                .map(|r| r.campaign_name.clone())
                .collect::<Vec<_>>(),
        ),
        Series::new("spend".into(), rows.iter().map(|r| r.spend).collect::<Vec<_>>()),
        Series::new(
            "impressions".into(),
            rows.iter().map(|r| r.impressions as i64).collect::<Vec<_>>(),
        ),
        Series::new(
            "clicks".into(),
            rows.iter().map(|r| r.clicks as i64).collect::<Vec<_>>(),
        ),
        Series::new(
            "conversions".into(),
            rows.iter().map(|r| r.conversions as i64).collect::<Vec<_>>(),
        ),
        Series::new(
            "conversion_value".into(),
            rows.iter().map(|r| r.conversion_value).collect::<Vec<_>>(),
        ),
        Series::new("ctr".into(), rows.iter().map(|r| r.ctr).collect::<Vec<_>>()),
        Series::new("cpc".into(), rows.iter().map(|r| r.cpc).collect::<Vec<_>>()),
        Series::new("cpa".into(), rows.iter().map(|r| r.cpa).collect::<Vec<_>>()),
        Series::new("roas".into(), rows.iter().map(|r| r.roas).collect::<Vec<_>>()),
        Series::new(
            "conversion_rate".into(),
            rows.iter().map(|r| r.conversion_rate).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

/// Frame view of the recommendation table, in ranked order.
pub fn recommendations_to_frame(rows: &[Recommendation]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "campaign_id".into(),
            rows.iter().map(|r| r.campaign_id.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            "campaign_name".into(),
            rows.iter()
                .map(|r| r.campaign_name.clone())
                .collect::<Vec<_>>(),
        ),
        Series::new("spend".into(), rows.iter().map(|r| r.spend).collect::<Vec<_>>()),
        Series::new(
            "conversion_value".into(),
            rows.iter().map(|r| r.conversion_value).collect::<Vec<_>>(),
        ),
        Series::new("roas".into(), rows.iter().map(|r| r.roas).collect::<Vec<_>>()),
        Series::new(
            "beta_coefficient".into(),
            rows.iter().map(|r| r.beta_coefficient).collect::<Vec<_>>(),
        ),
        Series::new(
            "marginal_roas".into(),
            rows.iter().map(|r| r.marginal_roas).collect::<Vec<_>>(),
        ),
        Series::new(
            "model_confidence".into(),
            rows.iter().map(|r| r.model_confidence).collect::<Vec<_>>(),
        ),
        Series::new(
            "recommended_action".into(),
            rows.iter()
                .map(|r| r.recommended_action.label().to_string())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "budget_modifier".into(),
            rows.iter().map(|r| r.budget_modifier).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn count_column(df: &DataFrame, name: &str) -> Result<Vec<Option<u64>>> {
    let series = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            value
                .map(|v| {
                    u64::try_from(v)
                        .with_context(|| format!("negative `{name}` ({v}) at row {idx}"))
                })
                .transpose()
        })
        .collect()
}
