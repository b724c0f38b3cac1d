//! Summaries drawn from a breakpoint analysis.

use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::Serialize;

use crate::analysis::types::{BreakpointAnalysis, SwapBreakpoint};
use crate::clmm::price::PERCENT_SCALE;
use crate::utils::{dec_string, opt_dec_string};

pub const STANDARD_SLIPPAGE_TOLERANCES: [&str; 6] = ["0.1", "0.25", "0.5", "1", "2", "5"];
pub const DEFAULT_MIN_DROP_PERCENT: u32 = 20;

/// Largest input that keeps slippage below a tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlippageLimit {
    pub tolerance_percent: BigDecimal,
    /// `None` when no breakpoint reaches the tolerance.
    #[serde(serialize_with = "opt_dec_string::serialize")]
    pub max_amount_in: Option<U256>,
    pub tick: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityDrop {
    pub tick: i32,
    #[serde(with = "dec_string")]
    pub liquidity_before: u128,
    #[serde(with = "dec_string")]
    pub liquidity_after: u128,
    pub drop_percent: BigDecimal,
    #[serde(with = "dec_string")]
    pub cumulative_swap_in: U256,
}

/// Breakpoint of the largest swap the walk could express.
pub fn max_capacity(analysis: &BreakpointAnalysis) -> Option<&SwapBreakpoint> {
    analysis.breakpoints.iter().rev().find(|b| b.reachable)
}

/// Cumulative input of the first breakpoint whose slippage reaches
/// `tolerance_percent`.
pub fn size_limit_for_slippage(
    analysis: &BreakpointAnalysis,
    tolerance_percent: &BigDecimal,
) -> SlippageLimit {
    let hit = analysis
        .breakpoints
        .iter()
        .find(|b| &b.slippage_percent >= tolerance_percent);
    SlippageLimit {
        tolerance_percent: tolerance_percent.clone(),
        max_amount_in: hit.map(|b| b.cumulative_swap_in),
        tick: hit.map(|b| b.tick),
    }
}

/// [`size_limit_for_slippage`] for each of [`STANDARD_SLIPPAGE_TOLERANCES`].
pub fn slippage_limits(analysis: &BreakpointAnalysis) -> Vec<SlippageLimit> {
    STANDARD_SLIPPAGE_TOLERANCES
        .iter()
        .filter_map(|t| BigDecimal::from_str(t).ok())
        .map(|t| size_limit_for_slippage(analysis, &t))
        .collect()
}

/// Breakpoints where active liquidity falls by more than `min_drop_percent`.
pub fn significant_liquidity_drops(
    analysis: &BreakpointAnalysis,
    min_drop_percent: &BigDecimal,
) -> Vec<LiquidityDrop> {
    let hundred = BigDecimal::from(100);
    analysis
        .breakpoints
        .iter()
        .filter(|b| b.liquidity_after < b.liquidity_before)
        .filter_map(|b| {
            let before = BigDecimal::new(BigInt::from(b.liquidity_before), 0);
            let dropped = BigDecimal::new(BigInt::from(b.liquidity_before - b.liquidity_after), 0);
            let drop_percent = (dropped / before * &hundred).round(PERCENT_SCALE).normalized();
            (&drop_percent > min_drop_percent).then(|| LiquidityDrop {
                tick: b.tick,
                liquidity_before: b.liquidity_before,
                liquidity_after: b.liquidity_after,
                drop_percent,
                cumulative_swap_in: b.cumulative_swap_in,
            })
        })
        .collect()
}
