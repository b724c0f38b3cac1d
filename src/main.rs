use std::sync::Arc;

use anyhow::Result;
use clmm_pool_inspector::{aggregator, config::AppConfig, snapshot, utils};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        max_breakpoints = config.max_breakpoints,
        tick_bound = config.tick_bound.limit(),
        partial_fill = ?config.partial_fill,
        "[INIT] clmm-pool-inspector starting"
    );

    let data = snapshot::load_snapshot(&config.snapshot_path, config.tick_bound).await?;
    let report = aggregator::analyze_pool(Arc::new(data), &config).await?;
    aggregator::log_summary(&report);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
