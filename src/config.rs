//! Configuration loader and application settings.

use std::path::PathBuf;

use alloy_primitives::U256;

use crate::analysis::{AnalysisParams, PartialFill, standard_swap_sizes};
use crate::clmm::{FeeConfig, TickBound};
use crate::errors::{AppError, Result};
use crate::models::{PoolSnapshot, SwapDirection};
use crate::utils::parse_decimal_amount;

/// Consolidated application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// JSON snapshot produced by the pool/position fetcher.
    pub snapshot_path: PathBuf,
    pub max_breakpoints: usize,
    /// Overrides the snapshot's fee rate when set.
    pub fee_base_bps: Option<u32>,
    pub fee_additional_bps: Option<u32>,
    pub tick_bound: TickBound,
    pub partial_fill: PartialFill,
    /// Number of owners listed in the ownership breakdown.
    pub top_owners: usize,
    /// Custom swap ladders in whole tokens; standard ladder when `None`.
    pub swap_sizes_token0: Option<Vec<String>>,
    pub swap_sizes_token1: Option<Vec<String>>,
}

impl AppConfig {
    /// Defaults for everything but the snapshot location.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            max_breakpoints: 20,
            fee_base_bps: None,
            fee_additional_bps: None,
            tick_bound: TickBound::default(),
            partial_fill: PartialFill::default(),
            top_owners: 10,
            swap_sizes_token0: None,
            swap_sizes_token1: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("Set SNAPSHOT_PATH to the pool snapshot JSON file".into())
            })?;
        let mut config = Self::new(snapshot_path);

        if let Some(raw) = lookup("MAX_BREAKPOINTS") {
            config.max_breakpoints = raw.trim().parse()?;
        }
        if let Some(raw) = lookup("FEE_BASE_BPS") {
            config.fee_base_bps = Some(raw.trim().parse()?);
        }
        if let Some(raw) = lookup("FEE_ADDITIONAL_BPS") {
            config.fee_additional_bps = Some(raw.trim().parse()?);
        }
        if let Some(raw) = lookup("TICK_BOUND") {
            config.tick_bound = TickBound::new(raw.trim().parse()?)?;
        }
        if let Some(raw) = lookup("PARTIAL_FILL") {
            config.partial_fill = raw.parse().map_err(AppError::Config)?;
        }
        if let Some(raw) = lookup("TOP_OWNERS") {
            config.top_owners = raw.trim().parse()?;
        }
        config.swap_sizes_token0 = lookup("SWAP_SIZES_TOKEN0")
            .map(|raw| split_sizes(&raw))
            .transpose()?;
        config.swap_sizes_token1 = lookup("SWAP_SIZES_TOKEN1")
            .map(|raw| split_sizes(&raw))
            .transpose()?;

        Ok(config)
    }

    /// Fee schedule for `pool`: the snapshot's rate unless overridden.
    pub fn fees_for(&self, pool: &PoolSnapshot) -> FeeConfig {
        FeeConfig::new(
            self.fee_base_bps.unwrap_or(pool.fee_rate_bps),
            self.fee_additional_bps.unwrap_or(0),
        )
    }

    pub fn analysis_params(&self, pool: &PoolSnapshot) -> AnalysisParams {
        AnalysisParams {
            max_breakpoints: self.max_breakpoints,
            fees: self.fees_for(pool),
            tick_bound: self.tick_bound,
            partial_fill: self.partial_fill,
        }
    }

    /// Raw input sizes to simulate in `direction`.
    pub fn swap_sizes(&self, pool: &PoolSnapshot, direction: SwapDirection) -> Result<Vec<U256>> {
        let custom = match direction {
            SwapDirection::Token0ToToken1 => self.swap_sizes_token0.as_ref(),
            SwapDirection::Token1ToToken0 => self.swap_sizes_token1.as_ref(),
        };
        match custom {
            Some(sizes) => {
                let decimals = pool.token_scale().decimals_in(direction);
                sizes.iter().map(|s| parse_decimal_amount(s, decimals)).collect()
            }
            None => Ok(standard_swap_sizes(pool, direction)),
        }
    }
}

fn split_sizes(raw: &str) -> Result<Vec<String>> {
    let sizes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    // syntax check only, decimals are known once the snapshot is loaded
    for size in &sizes {
        parse_decimal_amount(size, 0)?;
    }
    Ok(sizes)
}
