//! Loading of pool snapshots written by the on-chain fetcher.

use std::path::Path;

use crate::clmm::{TickBound, sqrt_price_x64_to_tick};
use crate::errors::Result;
use crate::models::PoolData;

/// Read and validate a snapshot file.
pub async fn load_snapshot(path: impl AsRef<Path>, bound: TickBound) -> Result<PoolData> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await?;
    let data = parse_snapshot(&raw, bound)?;
    tracing::info!(
        path = %path.display(),
        positions = data.positions.len(),
        current_tick = data.pool.current_tick,
        fee_rate_bps = data.pool.fee_rate_bps,
        "[SNAPSHOT] loaded"
    );
    Ok(data)
}

/// Parse snapshot JSON. Malformed positions are rejected outright.
pub fn parse_snapshot(raw: &str, bound: TickBound) -> Result<PoolData> {
    let data: PoolData = serde_json::from_str(raw)?;
    for position in &data.positions {
        position.validate()?;
    }

    match sqrt_price_x64_to_tick(data.pool.current_sqrt_price_x64, bound) {
        Ok(tick) if tick != data.pool.current_tick => {
            tracing::warn!(
                reported = data.pool.current_tick,
                derived = tick,
                "[SNAPSHOT] current tick does not match sqrt price"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(?e, "[SNAPSHOT] sqrt price outside tick range"),
    }

    let empty = data.positions.iter().filter(|p| p.liquidity == 0).count();
    if empty > 0 {
        tracing::debug!(empty, "[SNAPSHOT] zero-liquidity positions ignored");
    }
    Ok(data)
}
