//! Command-line interface wiring for adoptix.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::{
    analysis::{AllocationPolicy, HalfSplit, QuantileSplit},
    config::Settings,
    data::{self, DailyRecord},
};

pub mod recommend;
pub mod report;
pub mod serve;
pub mod simulate;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Marginal-ROAS budget reallocation", long_about = None)]
pub struct Cli {
    /// Increase log detail (-v debug, -vv trace); `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Simulate(args) => simulate::run(args, settings).await,
            Commands::Report(args) => report::run(args, settings).await,
            Commands::Recommend(args) => recommend::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate synthetic daily campaign performance.
    Simulate(simulate::Args),
    /// Aggregate campaign totals and portfolio KPIs.
    Report(report::Args),
    /// Estimate marginal ROAS and recommend budget shifts.
    Recommend(recommend::Args),
    /// Serve the JSON API consumed by the dashboard.
    Serve(serve::Args),
}

/// Where a command's daily records come from.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct DatasetArgs {
    /// Read records from this CSV instead of simulating.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Override simulated days.
    #[arg(long)]
    pub days: Option<u32>,
    /// Override simulated campaign count.
    #[arg(long)]
    pub campaigns: Option<u32>,
    /// Override the simulation seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// First simulated date (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl DatasetArgs {
    /// Settings with this command's simulation overrides applied.
    pub fn apply(&self, settings: &Settings) -> Result<Settings> {
        let mut settings = settings.clone();
        if let Some(days) = self.days {
            settings.days = days;
        }
        if let Some(campaigns) = self.campaigns {
            settings.campaign_count = campaigns;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if self.start_date.is_some() {
            settings.start_date = self.start_date;
        }
        settings.validate().context("invalid configuration")?;
        Ok(settings)
    }

    /// Load records from `--input` or simulate them from the settings.
    pub fn load(&self, settings: &Settings) -> Result<Vec<DailyRecord>> {
        match &self.input {
            Some(path) => data::export::load_records(path),
            None => {
                let settings = self.apply(settings)?;
                data::generate_seeded(&settings.simulation()).context("invalid configuration")
            }
        }
    }
}

/// Allocation policy selectable from the command line.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PolicyKind {
    /// Top half increases, bottom half decreases.
    #[default]
    Half,
    /// Top and bottom shares move, the middle holds.
    Quantile,
}

impl PolicyKind {
    pub fn build(
        &self,
        increase_share: f64,
        decrease_share: f64,
    ) -> Result<Box<dyn AllocationPolicy + Send + Sync>> {
        Ok(match self {
            Self::Half => Box::new(HalfSplit),
            Self::Quantile => Box::new(
                QuantileSplit::new(increase_share, decrease_share)
                    .context("invalid policy shares")?,
            ),
        })
    }
}
