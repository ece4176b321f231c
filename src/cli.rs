use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "HTTP wallet over the CoinCap price API with fuzzy asset-name lookup",
    long_about = None
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)] // default handled in main.rs
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
