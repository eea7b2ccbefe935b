//! Entry point wiring CLI dispatch to the analysis pipeline.

use adoptix::{cli::Cli, config::Settings, logging};
use anyhow::{Context, Result};
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;
    let settings = Settings::load().context("loading settings")?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
