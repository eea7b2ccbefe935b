//! CLI entry-point for the dashboard-facing JSON API.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{api, cli::DatasetArgs, config::Settings};

/// Args for the `serve` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Simulation overrides for the dataset served at startup.
    #[command(flatten)]
    pub dataset: DatasetArgs,
    /// Port to bind.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Host address.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    anyhow::ensure!(
        args.dataset.input.is_none(),
        "serve simulates its dataset; --input is not supported"
    );
    let settings = args.dataset.apply(&settings)?;
    info!(
        days = settings.days,
        campaigns = settings.campaign_count,
        seed = settings.seed,
        "preparing served dataset"
    );
    api::serve(settings, args.host, args.port).await
}
