//! Runtime configuration for adoptix.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    analysis::{allocate, EstimatorConfig},
    data::SimulationConfig,
    error::{ConfigError, ConfigResult},
};

/// Application configuration resolved from `.env`, the environment and defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Days of simulated history.
    pub days: u32,
    /// Number of simulated campaigns.
    pub campaign_count: u32,
    /// Seed of the simulation's random stream.
    pub seed: u64,
    /// Share of budget moved per campaign by the allocator.
    pub shift_fraction: f64,
    /// Rows required before a campaign is fitted.
    pub min_observations: usize,
    /// Score model confidence on this share of recent rows instead of in-sample.
    pub holdout_fraction: Option<f64>,
    /// First simulated date; `None` means `days` before today.
    pub start_date: Option<NaiveDate>,
    /// Root folder for written tables.
    pub outputs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            days: 45,
            campaign_count: 8,
            seed: 42,
            shift_fraction: allocate::DEFAULT_SHIFT_FRACTION,
            min_observations: crate::analysis::marginal::DEFAULT_MIN_OBSERVATIONS,
            holdout_fraction: None,
            start_date: None,
            outputs_dir: PathBuf::from("./outputs"),
        }
    }
}

impl Settings {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            days: parse_or(&lookup, "ADOPTIX_DAYS", defaults.days)?,
            campaign_count: parse_or(&lookup, "ADOPTIX_CAMPAIGNS", defaults.campaign_count)?,
            seed: parse_or(&lookup, "ADOPTIX_SEED", defaults.seed)?,
            shift_fraction: parse_or(&lookup, "ADOPTIX_SHIFT_FRACTION", defaults.shift_fraction)?,
            min_observations: parse_or(
                &lookup,
                "ADOPTIX_MIN_OBSERVATIONS",
                defaults.min_observations,
            )?,
            holdout_fraction: parse_optional(&lookup, "ADOPTIX_HOLDOUT_FRACTION")?,
            start_date: parse_optional(&lookup, "ADOPTIX_START_DATE")?,
            outputs_dir: lookup("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check every field the core consumes.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation().validate()?;
        self.estimator().validate()?;
        allocate::validate_shift_fraction(self.shift_fraction)
    }

    /// Generator configuration; the start date defaults to `days` before today.
    pub fn simulation(&self) -> SimulationConfig {
        let start_date = self.start_date.unwrap_or_else(|| {
            Utc::now().date_naive() - Duration::days(i64::from(self.days))
        });
        SimulationConfig {
            days: self.days,
            campaign_count: self.campaign_count,
            seed: self.seed,
            start_date,
        }
    }

    pub fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            min_observations: self.min_observations,
            holdout_fraction: self.holdout_fraction,
        }
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

fn parse_optional<F, T>(lookup: &F, key: &'static str) -> ConfigResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| ConfigError::Unparseable {
                key,
                value: raw.clone(),
                reason: err.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_dashboard() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.days, 45);
        assert_eq!(settings.campaign_count, 8);
        assert_eq!(settings.shift_fraction, 0.10);
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("ADOPTIX_DAYS", "10"),
            ("ADOPTIX_CAMPAIGNS", "3"),
            ("ADOPTIX_SEED", "7"),
            ("ADOPTIX_SHIFT_FRACTION", "0.25"),
            ("ADOPTIX_HOLDOUT_FRACTION", "0.2"),
            ("ADOPTIX_START_DATE", "2024-06-01"),
            ("OUTPUTS_DIR", "/tmp/adoptix"),
        ]))
        .unwrap();
        assert_eq!(settings.days, 10);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.holdout_fraction, Some(0.2));
        let sim = settings.simulation();
        assert_eq!(sim.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(settings.join_output("a.csv"), PathBuf::from("/tmp/adoptix/a.csv"));
    }

    #[test]
    fn unparseable_values_are_errors() {
        let err = Settings::from_lookup(lookup(&[("ADOPTIX_DAYS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Unparseable { key: "ADOPTIX_DAYS", .. }));
    }

    #[test]
    fn invalid_values_fail_fast() {
        assert_eq!(
            Settings::from_lookup(lookup(&[("ADOPTIX_DAYS", "0")])),
            Err(ConfigError::NonPositiveDays)
        );
        assert_eq!(
            Settings::from_lookup(lookup(&[("ADOPTIX_SHIFT_FRACTION", "1.2")])),
            Err(ConfigError::ShiftFractionOutOfRange(1.2))
        );
    }

    #[test]
    fn default_start_date_precedes_today() {
        let settings = Settings {
            days: 30,
            ..Settings::default()
        };
        let today = Utc::now().date_naive();
        assert_eq!(settings.simulation().start_date, today - Duration::days(30));
    }
}
