//! Runs both swap directions and assembles the pool report.

use std::sync::Arc;

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::analysis::{
    AnalysisParams, BreakpointAnalysis, DEFAULT_MIN_DROP_PERCENT, ExactSwapResult, LiquidityDrop,
    SlippageLimit, SwapBreakpoint, analyze_swap_sizes, find_liquidity_breakpoints, max_capacity,
    significant_liquidity_drops, slippage_limits,
};
use crate::clmm::{LiquidityCurve, sqrt_price_x64_to_price};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{PoolData, PoolSnapshot, SwapDirection};
use crate::stats::{
    LiquidityDistribution, OwnershipAnalysis, PositionStats, analyze_ownership,
    liquidity_distribution, position_stats,
};
use crate::utils::add_decimal_point;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionReport {
    pub direction: SwapDirection,
    pub breakpoints: BreakpointAnalysis,
    pub swap_sizes: Vec<ExactSwapResult>,
    pub slippage_limits: Vec<SlippageLimit>,
    pub liquidity_drops: Vec<LiquidityDrop>,
    pub max_capacity: Option<SwapBreakpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolReport {
    pub pool: PoolSnapshot,
    pub spot_price: BigDecimal,
    pub params: AnalysisParams,
    pub position_stats: PositionStats,
    pub distribution: LiquidityDistribution,
    pub ownership: OwnershipAnalysis,
    pub directions: Vec<DirectionReport>,
}

/// Analyze both directions concurrently and gather pool-wide statistics.
pub async fn analyze_pool(data: Arc<PoolData>, config: &AppConfig) -> Result<PoolReport> {
    let pool = &data.pool;
    let params = config.analysis_params(pool);
    params.fees.validate()?;

    {
        let curve = LiquidityCurve::build(&data.positions)?;
        let derived = curve.liquidity_at(pool.current_tick)?;
        if derived != pool.current_liquidity {
            tracing::warn!(
                reported = %pool.current_liquidity,
                derived = %derived,
                "[ANALYSIS] position set does not reproduce pool liquidity"
            );
        }
        tracing::info!(
            ticks = curve.len(),
            positions = data.positions.len(),
            liquidity = %derived,
            "[ANALYSIS] liquidity curve built"
        );
    }

    let down_sizes = config.swap_sizes(pool, SwapDirection::Token0ToToken1)?;
    let up_sizes = config.swap_sizes(pool, SwapDirection::Token1ToToken0)?;
    let down = spawn_direction(data.clone(), SwapDirection::Token0ToToken1, down_sizes, params);
    let up = spawn_direction(data.clone(), SwapDirection::Token1ToToken0, up_sizes, params);
    let (down, up) = futures::join!(down, up);
    let directions = vec![down??, up??];

    Ok(PoolReport {
        pool: pool.clone(),
        spot_price: sqrt_price_x64_to_price(
            pool.current_sqrt_price_x64,
            pool.decimals0,
            pool.decimals1,
        ),
        params,
        position_stats: position_stats(&data.positions, pool.current_tick),
        distribution: liquidity_distribution(
            &data.positions,
            pool.current_tick,
            pool.token_scale(),
            params.tick_bound,
        ),
        ownership: analyze_ownership(&data.positions, config.top_owners),
        directions,
    })
}

fn spawn_direction(
    data: Arc<PoolData>,
    direction: SwapDirection,
    sizes: Vec<U256>,
    params: AnalysisParams,
) -> JoinHandle<Result<DirectionReport>> {
    tokio::task::spawn_blocking(move || analyze_direction(&data, direction, &sizes, &params))
}

/// Breakpoints, swap ladder and insights for one direction.
pub fn analyze_direction(
    data: &PoolData,
    direction: SwapDirection,
    sizes: &[U256],
    params: &AnalysisParams,
) -> Result<DirectionReport> {
    let curve = LiquidityCurve::build(&data.positions)?;
    let breakpoints = find_liquidity_breakpoints(&data.pool, &curve, direction, params)?;
    let swap_sizes = analyze_swap_sizes(&data.pool, &curve, direction, sizes, params)?;

    Ok(DirectionReport {
        direction,
        slippage_limits: slippage_limits(&breakpoints),
        liquidity_drops: significant_liquidity_drops(
            &breakpoints,
            &BigDecimal::from(DEFAULT_MIN_DROP_PERCENT),
        ),
        max_capacity: max_capacity(&breakpoints).cloned(),
        swap_sizes,
        breakpoints,
    })
}

/// Log a one-line digest per direction.
pub fn log_summary(report: &PoolReport) {
    tracing::info!(
        spot_price = %report.spot_price,
        positions = report.position_stats.total,
        active = report.position_stats.active,
        owners = report.ownership.total_owners,
        "[ANALYSIS] pool summary"
    );

    let scale = report.pool.token_scale();
    for dir in &report.directions {
        let capacity = dir
            .max_capacity
            .as_ref()
            .map(|b| add_decimal_point(b.cumulative_swap_in, scale.decimals_in(dir.direction)))
            .unwrap_or_else(|| "0".into());
        for diag in &dir.breakpoints.diagnostics {
            tracing::warn!(direction = dir.direction.label(), ?diag, "[ANALYSIS] walk diagnostic");
        }
        tracing::info!(
            direction = dir.direction.label(),
            breakpoints = dir.breakpoints.breakpoints.len(),
            max_capacity = %capacity,
            drops = dir.liquidity_drops.len(),
            exhausted = dir.breakpoints.liquidity_exhausted,
            "[ANALYSIS] direction summary"
        );
    }
}
