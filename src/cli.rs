use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "listmod",
    version,
    about = "Moderate Mailman3 mailing lists from the terminal"
)]
pub struct Cli {
    /// Config file to read instead of ~/.listadmin3.ini
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Echo raw page content while talking to the server
    #[arg(long)]
    pub debug: bool,
}
