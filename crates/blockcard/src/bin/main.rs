//! Blockcard CLI

use blockcard::cli::{self, Args};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::debug!("Blockcard v{}", env!("CARGO_PKG_VERSION"));
    let output = cli::run(&args).await?;
    println!("{}", output);
    Ok(())
}
