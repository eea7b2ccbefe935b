//! CLI entry-point for generating synthetic performance data.

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{cli::DatasetArgs, config::Settings, data::export};

/// Args for the `simulate` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Destination CSV (defaults to `<OUTPUTS_DIR>/marketing_data.csv`).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write the table to stdout instead of a file.
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let records = args.dataset.load(&settings)?;
    if args.stdout {
        return export::write_rows(io::stdout().lock(), &records);
    }
    let path = args
        .output
        .unwrap_or_else(|| settings.join_output("marketing_data.csv"));
    export::save_records(&path, &records)
}
