//! CLI entry-point for campaign aggregates and portfolio KPIs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{
    analysis,
    cli::DatasetArgs,
    config::Settings,
    data::{export, table},
};

/// Args for the `report` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Also write the aggregate table to this CSV.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let records = args.dataset.load(&settings)?;
    if records.is_empty() {
        warn!("no records to aggregate");
        return Ok(());
    }
    let aggregates = analysis::aggregate(&records);
    let summary = analysis::summarize(&aggregates);
    info!(
        total_spend = summary.total_spend,
        total_conversion_value = summary.total_conversion_value,
        global_roas = summary.global_roas,
        "portfolio summary"
    );

    println!(
        "Total spend: {:.2} | Total revenue: {:.2} | Global ROAS: {:.2}x | Conversions: {}",
        summary.total_spend,
        summary.total_conversion_value,
        summary.global_roas,
        summary.total_conversions
    );
    println!("{}", table::aggregates_to_frame(&aggregates)?);

    if let Some(path) = args.output {
        export::save_rows(&path, &aggregates)?;
        info!(path = %path.display(), rows = aggregates.len(), "wrote campaign aggregates");
    }
    Ok(())
}
