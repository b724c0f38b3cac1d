//! Swap analysis on top of a liquidity curve.

pub mod breakpoints;
pub mod exact_swap;
pub mod insights;
pub mod types;

pub use breakpoints::find_liquidity_breakpoints;
pub use exact_swap::{
    STANDARD_SWAP_SIZES, analyze_swap_sizes, simulate_exact_swap, standard_swap_sizes,
};
pub use insights::{
    DEFAULT_MIN_DROP_PERCENT, LiquidityDrop, STANDARD_SLIPPAGE_TOLERANCES, SlippageLimit,
    max_capacity, significant_liquidity_drops, size_limit_for_slippage, slippage_limits,
};
pub use types::{
    AnalysisParams, BreakpointAnalysis, ExactSwapResult, PartialFill, SwapBreakpoint,
    WalkDiagnostic,
};
