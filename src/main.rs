mod app;
mod cli;
mod config;
mod domain;
mod infrastructure;
mod moderate;
mod scrape;
mod session;

use anyhow::Result;
use clap::Parser;

use crate::{app::ModeratorApp, cli::Cli, infrastructure::logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config problems must surface before any network activity.
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let lists = config::load_config(&config_path)?;

    logging::init_tracing(cli.debug)?;

    let app = ModeratorApp::new(lists, cli.debug);
    app.run().await
}
