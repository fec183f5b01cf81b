use clap::Parser;

use cinder_keeper::{KeeperConfig, RebaseKeeper};

#[derive(Parser, Debug)]
#[command(name = "cinder-keeper")]
#[command(about = "Cinder protocol off-chain rebase scheduler")]
struct Args {
    /// Path to keeper configuration file
    #[arg(short, long, default_value = "keeper.toml")]
    config: String,

    /// Override the poll interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Dry run mode - compute but don't commit rebases
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    log::info!("Starting Cinder rebase keeper");

    let mut config = KeeperConfig::load(&args.config)?;
    if let Some(interval) = args.interval {
        config.poll_interval_sec = interval;
    }
    if args.dry_run {
        config.dry_run = true;
    }
    if config.dry_run {
        log::warn!("Running in DRY RUN mode - no rebases will be committed");
    }
    log::info!("Poll interval: {}s", config.poll_interval_sec);

    let mut keeper = RebaseKeeper::new(config)?;
    log::info!(
        "Wired deployment: supply={} target_rate={}",
        keeper.token().total_supply(),
        keeper.engine().target_rate()
    );

    keeper.run().await?;
    Ok(())
}
