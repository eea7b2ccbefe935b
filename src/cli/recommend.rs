//! CLI entry-point for marginal-ROAS budget recommendations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    analysis,
    cli::{DatasetArgs, PolicyKind},
    config::Settings,
    data::{export, table},
};

/// Args for the `recommend` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Share of budget moved per campaign, in (0, 1).
    #[arg(long)]
    pub shift_fraction: Option<f64>,
    /// Ranking and partition rule.
    #[arg(long, value_enum, default_value_t = PolicyKind::Half)]
    pub policy: PolicyKind,
    /// Quantile policy: share of top-ranked campaigns that increase.
    #[arg(long, default_value_t = 0.25)]
    pub increase_share: f64,
    /// Quantile policy: share of bottom-ranked campaigns that decrease.
    #[arg(long, default_value_t = 0.25)]
    pub decrease_share: f64,
    /// Score model confidence on this share of the most recent days.
    #[arg(long)]
    pub holdout_fraction: Option<f64>,
    /// Destination CSV (defaults to `<OUTPUTS_DIR>/recommendations.csv`).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut settings = args.dataset.apply(&settings)?;
    if let Some(shift) = args.shift_fraction {
        settings.shift_fraction = shift;
    }
    if args.holdout_fraction.is_some() {
        settings.holdout_fraction = args.holdout_fraction;
    }
    settings.validate().context("invalid configuration")?;

    let records = args.dataset.load(&settings)?;
    let policy = args.policy.build(args.increase_share, args.decrease_share)?;
    let analysis = analysis::recommend_with(
        &records,
        &settings.estimator(),
        settings.shift_fraction,
        policy.as_ref(),
    )
    .context("invalid configuration")?;

    println!(
        "{}",
        table::recommendations_to_frame(&analysis.recommendations)?
    );

    let path = args
        .output
        .unwrap_or_else(|| settings.join_output("recommendations.csv"));
    export::save_rows(&path, &analysis.recommendations)?;
    info!(
        path = %path.display(),
        rows = analysis.recommendations.len(),
        "wrote recommendations"
    );
    Ok(())
}
