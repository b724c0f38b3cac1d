use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::clmm::{FeeConfig, TickBound};
use crate::models::SwapDirection;
use crate::utils::dec_string;

/// How an exact-input swap fills the segment it cannot fully cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFill {
    /// Output and price move in proportion to the input consumed.
    #[default]
    ProRata,
    /// Next sqrt price solved in closed form, output from the delta formulas.
    Exact,
}

impl FromStr for PartialFill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pro_rata" | "prorata" | "pro-rata" => Ok(PartialFill::ProRata),
            "exact" => Ok(PartialFill::Exact),
            other => Err(format!("unknown partial fill mode '{other}'")),
        }
    }
}

/// Knobs shared by the breakpoint walk and the exact swap simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisParams {
    /// Cap on emitted breakpoints per direction.
    pub max_breakpoints: usize,
    pub fees: FeeConfig,
    pub tick_bound: TickBound,
    pub partial_fill: PartialFill,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            max_breakpoints: 20,
            fees: FeeConfig::default(),
            tick_bound: TickBound::default(),
            partial_fill: PartialFill::default(),
        }
    }
}

/// Recoverable anomalies met while walking ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalkDiagnostic {
    TickSkipped {
        tick: i32,
        reason: String,
    },
    NegativeLiquidityDetected {
        tick: i32,
        #[serde(with = "dec_string")]
        liquidity_before: u128,
        #[serde(with = "dec_string")]
        liquidity_change: i128,
        #[serde(with = "dec_string")]
        deficit: u128,
    },
}

/// State of a swap that moves the price exactly onto an initialized tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapBreakpoint {
    pub tick: i32,
    #[serde(with = "dec_string")]
    pub liquidity_before: u128,
    #[serde(with = "dec_string")]
    pub liquidity_after: u128,
    #[serde(with = "dec_string")]
    pub liquidity_change: i128,
    /// Gross input, fee included.
    #[serde(with = "dec_string")]
    pub cumulative_swap_in: U256,
    #[serde(with = "dec_string")]
    pub cumulative_swap_out: U256,
    #[serde(with = "dec_string")]
    pub cumulative_fees: U256,
    pub price_at_tick: BigDecimal,
    pub execution_price: Option<BigDecimal>,
    /// Signed move of the pool price from spot to this tick.
    pub price_impact_percent: BigDecimal,
    /// Deviation of the average fill price from spot.
    pub slippage_percent: BigDecimal,
    pub ticks_crossed: usize,
    /// Cumulative input still fits a u64 token amount.
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakpointAnalysis {
    pub direction: SwapDirection,
    pub current_tick: i32,
    pub spot_price: BigDecimal,
    #[serde(with = "dec_string")]
    pub starting_liquidity: u128,
    pub breakpoints: Vec<SwapBreakpoint>,
    /// Walk stopped because active liquidity reached zero.
    pub liquidity_exhausted: bool,
    pub diagnostics: Vec<WalkDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactSwapResult {
    pub direction: SwapDirection,
    #[serde(with = "dec_string")]
    pub amount_in: U256,
    #[serde(with = "dec_string")]
    pub fee_amount: U256,
    #[serde(with = "dec_string")]
    pub net_amount_in: U256,
    /// Net input left over when liquidity ran out.
    #[serde(with = "dec_string")]
    pub amount_unspent: U256,
    #[serde(with = "dec_string")]
    pub amount_out: U256,
    /// Output per unit of the full gross input, unspent part included.
    pub execution_price: Option<BigDecimal>,
    /// Output per unit of the input actually consumed (`amount_in - amount_unspent`).
    pub filled_execution_price: Option<BigDecimal>,
    /// Signed move of the pool price from spot to the final sqrt price.
    pub price_impact_percent: BigDecimal,
    /// Absolute deviation of `execution_price` from spot.
    pub slippage_percent: BigDecimal,
    #[serde(with = "dec_string")]
    pub final_sqrt_price_x64: u128,
    pub final_tick: i32,
    pub ticks_crossed: usize,
    pub liquidity_exhausted: bool,
    pub diagnostics: Vec<WalkDiagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_fill_parsing() {
        assert_eq!("pro_rata".parse::<PartialFill>().unwrap(), PartialFill::ProRata);
        assert_eq!(" Exact ".parse::<PartialFill>().unwrap(), PartialFill::Exact);
        assert!("linear".parse::<PartialFill>().is_err());
    }

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let diag = WalkDiagnostic::NegativeLiquidityDetected {
            tick: 60,
            liquidity_before: 10,
            liquidity_change: -25,
            deficit: 15,
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "negative_liquidity_detected");
        assert_eq!(json["liquidity_change"], "-25");
        assert_eq!(json["deficit"], "15");
    }
}
