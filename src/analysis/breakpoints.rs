//! Walk initialized ticks and record the cumulative swap needed to reach each.

use alloy_primitives::U256;

use crate::analysis::types::{AnalysisParams, BreakpointAnalysis, SwapBreakpoint, WalkDiagnostic};
use crate::clmm::{
    LiquidityCurve, compute_segment, cross_tick, execution_price, percent_change,
    percent_deviation, sqrt_price_x64_to_price, tick_to_sqrt_price_x64_within,
};
use crate::errors::CurveError;
use crate::models::{PoolSnapshot, SwapDirection};

/// Swap sizes at which active liquidity changes, walking away from the
/// current tick in `direction`.
///
/// Each breakpoint carries the gross input (fee included) needed to move the
/// price exactly onto that tick, starting from the pool's current state.
pub fn find_liquidity_breakpoints(
    pool: &PoolSnapshot,
    curve: &LiquidityCurve<'_>,
    direction: SwapDirection,
    params: &AnalysisParams,
) -> Result<BreakpointAnalysis, CurveError> {
    params.fees.validate()?;
    let starting_liquidity = curve.liquidity_at(pool.current_tick)?;
    walk_breakpoints(pool, curve, direction, params, starting_liquidity)
}

fn walk_breakpoints(
    pool: &PoolSnapshot,
    curve: &LiquidityCurve<'_>,
    direction: SwapDirection,
    params: &AnalysisParams,
    starting_liquidity: u128,
) -> Result<BreakpointAnalysis, CurveError> {
    let scale = pool.token_scale();
    let spot_price =
        sqrt_price_x64_to_price(pool.current_sqrt_price_x64, scale.decimals0, scale.decimals1);

    let mut analysis = BreakpointAnalysis {
        direction,
        current_tick: pool.current_tick,
        spot_price,
        starting_liquidity,
        breakpoints: Vec::new(),
        liquidity_exhausted: starting_liquidity == 0,
        diagnostics: Vec::new(),
    };
    if starting_liquidity == 0 {
        return Ok(analysis);
    }

    let mut sqrt_price = pool.current_sqrt_price_x64;
    let mut liquidity = starting_liquidity;
    let mut cumulative_in = U256::ZERO;
    let mut cumulative_out = U256::ZERO;
    let mut cumulative_fees = U256::ZERO;
    let mut ticks_crossed = 0usize;
    let reachable_limit = U256::from(u64::MAX);

    for next in curve.ticks_in_direction(pool.current_tick, direction) {
        if analysis.breakpoints.len() >= params.max_breakpoints {
            break;
        }

        let target = match tick_to_sqrt_price_x64_within(next.tick, params.tick_bound) {
            Ok(sqrt) => sqrt,
            Err(err) => {
                analysis.diagnostics.push(WalkDiagnostic::TickSkipped {
                    tick: next.tick,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let segment = compute_segment(sqrt_price, target, liquidity, direction)?;
        let fee = params.fees.gross_up(segment.amount_in)?;
        cumulative_in = cumulative_in.saturating_add(fee.gross);
        cumulative_out = cumulative_out.saturating_add(segment.amount_out);
        cumulative_fees = cumulative_fees.saturating_add(fee.fee);

        let crossing = cross_tick(liquidity, next.liquidity_net, direction);
        if let Some(deficit) = crossing.deficit {
            analysis.diagnostics.push(WalkDiagnostic::NegativeLiquidityDetected {
                tick: next.tick,
                liquidity_before: liquidity,
                liquidity_change: crossing.liquidity_change,
                deficit,
            });
        }
        ticks_crossed += 1;

        let price_at_tick = sqrt_price_x64_to_price(target, scale.decimals0, scale.decimals1);
        let fill_price = execution_price(direction, cumulative_in, cumulative_out, scale);
        let slippage_percent = fill_price
            .as_ref()
            .map(|price| percent_deviation(&analysis.spot_price, price))
            .unwrap_or_default();

        analysis.breakpoints.push(SwapBreakpoint {
            tick: next.tick,
            liquidity_before: liquidity,
            liquidity_after: crossing.liquidity_after,
            liquidity_change: crossing.liquidity_change,
            cumulative_swap_in: cumulative_in,
            cumulative_swap_out: cumulative_out,
            cumulative_fees,
            price_impact_percent: percent_change(&analysis.spot_price, &price_at_tick),
            price_at_tick,
            execution_price: fill_price,
            slippage_percent,
            ticks_crossed,
            reachable: cumulative_in <= reachable_limit,
        });

        sqrt_price = target;
        liquidity = crossing.liquidity_after;
        if liquidity == 0 {
            analysis.liquidity_exhausted = true;
            break;
        }
    }

    Ok(analysis)
}
