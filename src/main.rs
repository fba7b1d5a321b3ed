use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flowtag::config::Args;
use flowtag::{engine, report};

fn main() -> Result<()> {
    // FLOWTAG_* settings may live in a .env file
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()))
        .with_writer(std::io::stderr)
        .init();

    let options = args.scan_options();
    info!(
        lookup = %args.lookup.display(),
        flow_logs = %args.flow_logs.display(),
        workers = options.workers,
        policy = ?options.policy,
        "starting scan"
    );

    let outcome = engine::run(&args.lookup, &args.flow_logs, &options).context("scan failed")?;

    let rendered = report::render(&report::build(&outcome.aggregator), args.format)?;
    engine::write_report(&args.output, &rendered)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}
