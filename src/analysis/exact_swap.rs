//! Exact-input swap simulation across initialized ticks.

use alloy_primitives::U256;

use crate::analysis::types::{AnalysisParams, ExactSwapResult, PartialFill, WalkDiagnostic};
use crate::clmm::math::mul_div;
use crate::clmm::{
    LiquidityCurve, Q64, SegmentAmounts, compute_segment, cross_tick, execution_price,
    next_sqrt_price_from_input, percent_change, percent_deviation, sqrt_price_x64_to_price,
    sqrt_price_x64_to_tick, tick_to_sqrt_price_x64_within,
};
use crate::errors::{CurveError, MathError};
use crate::models::{PoolSnapshot, SwapDirection};
use crate::utils::parse_decimal_amount;

/// Whole-token sizes simulated for token0 input; token1 sizes are the same
/// notional converted at the spot price.
pub const STANDARD_SWAP_SIZES: [&str; 8] = ["0.1", "0.5", "1", "5", "10", "50", "100", "500"];

/// Simulate swapping exactly `amount_in` (gross, fee included) from the
/// pool's current state.
///
/// The fee is taken upfront; the remainder crosses whole segments while it
/// covers them and fills the last one partially according to
/// `params.partial_fill`. Input left over once liquidity runs out is reported
/// as `amount_unspent`.
pub fn simulate_exact_swap(
    pool: &PoolSnapshot,
    curve: &LiquidityCurve<'_>,
    amount_in: U256,
    direction: SwapDirection,
    params: &AnalysisParams,
) -> Result<ExactSwapResult, CurveError> {
    let starting_liquidity = curve.liquidity_at(pool.current_tick)?;
    swap_from(pool, curve, amount_in, direction, params, starting_liquidity)
}

fn swap_from(
    pool: &PoolSnapshot,
    curve: &LiquidityCurve<'_>,
    amount_in: U256,
    direction: SwapDirection,
    params: &AnalysisParams,
    starting_liquidity: u128,
) -> Result<ExactSwapResult, CurveError> {
    let fee = params.fees.deduct(amount_in)?;
    let scale = pool.token_scale();

    let mut remaining = fee.net;
    let mut liquidity = starting_liquidity;
    let mut sqrt_price = pool.current_sqrt_price_x64;
    let mut amount_out = U256::ZERO;
    let mut ticks_crossed = 0usize;
    let mut diagnostics = Vec::new();
    let mut ticks = curve.ticks_in_direction(pool.current_tick, direction);

    while !remaining.is_zero() && liquidity > 0 {
        let Some(next) = ticks.next() else {
            break;
        };
        let target = match tick_to_sqrt_price_x64_within(next.tick, params.tick_bound) {
            Ok(sqrt) => sqrt,
            Err(err) => {
                diagnostics.push(WalkDiagnostic::TickSkipped {
                    tick: next.tick,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let segment = compute_segment(sqrt_price, target, liquidity, direction)?;
        if remaining >= segment.amount_in {
            remaining -= segment.amount_in;
            amount_out = amount_out.saturating_add(segment.amount_out);
            sqrt_price = target;

            let crossing = cross_tick(liquidity, next.liquidity_net, direction);
            if let Some(deficit) = crossing.deficit {
                diagnostics.push(WalkDiagnostic::NegativeLiquidityDetected {
                    tick: next.tick,
                    liquidity_before: liquidity,
                    liquidity_change: crossing.liquidity_change,
                    deficit,
                });
            }
            liquidity = crossing.liquidity_after;
            ticks_crossed += 1;
        } else {
            let (out, next_sqrt) = fill_partially(
                params.partial_fill,
                sqrt_price,
                target,
                liquidity,
                remaining,
                segment,
                direction,
            )?;
            amount_out = amount_out.saturating_add(out);
            sqrt_price = next_sqrt;
            remaining = U256::ZERO;
        }
    }

    let final_tick = if sqrt_price == pool.current_sqrt_price_x64 {
        pool.current_tick
    } else {
        sqrt_price_x64_to_tick(sqrt_price, params.tick_bound)?
    };

    let spot_price =
        sqrt_price_x64_to_price(pool.current_sqrt_price_x64, scale.decimals0, scale.decimals1);
    let final_price = sqrt_price_x64_to_price(sqrt_price, scale.decimals0, scale.decimals1);
    let fill_price = execution_price(direction, amount_in, amount_out, scale);
    let filled_price = execution_price(direction, amount_in - remaining, amount_out, scale);
    let slippage_percent = fill_price
        .as_ref()
        .map(|price| percent_deviation(&spot_price, price))
        .unwrap_or_default();

    Ok(ExactSwapResult {
        direction,
        amount_in,
        fee_amount: fee.fee,
        net_amount_in: fee.net,
        amount_unspent: remaining,
        amount_out,
        execution_price: fill_price,
        filled_execution_price: filled_price,
        price_impact_percent: percent_change(&spot_price, &final_price),
        slippage_percent,
        final_sqrt_price_x64: sqrt_price,
        final_tick,
        ticks_crossed,
        liquidity_exhausted: !remaining.is_zero(),
        diagnostics,
    })
}

/// Output and resulting sqrt price for `remaining < segment.amount_in`.
fn fill_partially(
    mode: PartialFill,
    current: u128,
    target: u128,
    liquidity: u128,
    remaining: U256,
    segment: SegmentAmounts,
    direction: SwapDirection,
) -> Result<(U256, u128), MathError> {
    match mode {
        PartialFill::ProRata => {
            let out = mul_div(segment.amount_out, remaining, segment.amount_in)?;
            let distance = U256::from(current.abs_diff(target));
            let moved = mul_div(distance, remaining, segment.amount_in)?;
            let moved = u128::try_from(moved).map_err(|_| MathError::Overflow)?;
            let next = if direction.is_price_increasing() {
                current + moved
            } else {
                current - moved
            };
            Ok((out, next))
        }
        PartialFill::Exact => {
            let next = next_sqrt_price_from_input(current, liquidity, remaining, direction)?;
            // rounding never overshoots in theory; clamp to stay inside the segment
            let next = if direction.is_price_increasing() {
                next.min(target)
            } else {
                next.max(target)
            };
            let out = compute_segment(current, next, liquidity, direction)?.amount_out;
            Ok((out, next))
        }
    }
}

/// Standard ladder of input sizes for `direction`, in raw units.
///
/// Token1 sizes are the token0 ladder converted at the spot price, so both
/// directions cover the same notional. Sizes that round to zero are dropped.
pub fn standard_swap_sizes(pool: &PoolSnapshot, direction: SwapDirection) -> Vec<U256> {
    let token0_sizes = STANDARD_SWAP_SIZES
        .iter()
        .filter_map(|size| parse_decimal_amount(size, pool.decimals0).ok());

    match direction {
        SwapDirection::Token0ToToken1 => token0_sizes.filter(|size| !size.is_zero()).collect(),
        SwapDirection::Token1ToToken0 => {
            let sqrt = U256::from(pool.current_sqrt_price_x64);
            let q64 = U256::from(Q64);
            token0_sizes
                .filter_map(|size| {
                    // raw token1 = raw token0 * sqrt² / 2^128
                    let half = mul_div(size, sqrt, q64).ok()?;
                    mul_div(half, sqrt, q64).ok()
                })
                .filter(|size| !size.is_zero())
                .collect()
        }
    }
}

/// Simulate each size in `sizes` independently from the current pool state.
pub fn analyze_swap_sizes(
    pool: &PoolSnapshot,
    curve: &LiquidityCurve<'_>,
    direction: SwapDirection,
    sizes: &[U256],
    params: &AnalysisParams,
) -> Result<Vec<ExactSwapResult>, CurveError> {
    sizes
        .iter()
        .map(|size| simulate_exact_swap(pool, curve, *size, direction, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clmm::{
        FeeConfig, TickBound, get_delta_amount_0, get_delta_amount_1, tick_to_sqrt_price_x64,
    };
    use crate::models::Position;
    use bigdecimal::BigDecimal;
    use num_traits::Zero;

    fn mock_pool(current_tick: i32) -> PoolSnapshot {
        PoolSnapshot {
            current_tick,
            current_sqrt_price_x64: tick_to_sqrt_price_x64(current_tick).unwrap(),
            current_liquidity: 0,
            decimals0: 9,
            decimals1: 6,
            fee_rate_bps: 25,
        }
    }

    fn deep_positions() -> Vec<Position> {
        vec![
            Position::new(-3_000, 3_000, 2_000_000_000_000),
            Position::new(-1_000, 1_000, 5_000_000_000_000),
            Position::new(-200, 400, 1_000_000_000_000),
        ]
    }

    fn params(partial_fill: PartialFill) -> AnalysisParams {
        AnalysisParams {
            partial_fill,
            ..AnalysisParams::default()
        }
    }

    fn no_fee() -> AnalysisParams {
        AnalysisParams {
            fees: FeeConfig::flat(0),
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn zero_input_yields_zero_output() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let params = AnalysisParams::default();
        for direction in SwapDirection::BOTH {
            let result =
                simulate_exact_swap(&pool, &curve, U256::ZERO, direction, &params).unwrap();
            assert_eq!(result.amount_out, U256::ZERO);
            assert_eq!(result.fee_amount, U256::ZERO);
            assert!(result.execution_price.is_none());
            assert!(result.filled_execution_price.is_none());
            assert_eq!(result.price_impact_percent, BigDecimal::zero());
            assert_eq!(result.slippage_percent, BigDecimal::zero());
            assert_eq!(result.final_sqrt_price_x64, pool.current_sqrt_price_x64);
            assert_eq!(result.final_tick, 0);
            assert!(!result.liquidity_exhausted);
        }
    }

    #[test]
    fn empty_pool_returns_nothing() {
        let positions: Vec<Position> = Vec::new();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let amount = U256::from(1_000_000_000u64);
        let result = simulate_exact_swap(
            &mock_pool(0),
            &curve,
            amount,
            SwapDirection::Token0ToToken1,
            &AnalysisParams::default(),
        )
        .unwrap();
        assert_eq!(result.amount_out, U256::ZERO);
        assert!(result.liquidity_exhausted);
        assert_eq!(result.amount_unspent, result.net_amount_in);
    }

    #[test]
    fn fee_is_deducted_before_the_walk() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let amount = U256::from(1_000_000u64);
        let result = simulate_exact_swap(
            &mock_pool(0),
            &curve,
            amount,
            SwapDirection::Token1ToToken0,
            &AnalysisParams::default(),
        )
        .unwrap();
        assert_eq!(result.fee_amount, U256::from(2_500u64));
        assert_eq!(result.net_amount_in, U256::from(997_500u64));
        assert_eq!(result.amount_in, amount);
    }

    #[test]
    fn small_swap_stays_in_first_segment() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let liquidity = curve.liquidity_at(0).unwrap();

        for mode in [PartialFill::ProRata, PartialFill::Exact] {
            let result = simulate_exact_swap(
                &pool,
                &curve,
                U256::from(10_000_000u64),
                SwapDirection::Token0ToToken1,
                &params(mode),
            )
            .unwrap();
            assert_eq!(result.ticks_crossed, 0);
            assert!(result.amount_out > U256::ZERO);
            assert!(result.final_sqrt_price_x64 < pool.current_sqrt_price_x64);
            assert!(result.final_sqrt_price_x64 > tick_to_sqrt_price_x64(-200).unwrap());
            assert!(result.price_impact_percent < BigDecimal::zero());
            assert!(result.slippage_percent > BigDecimal::zero());
            assert!(result.final_tick < 0 && result.final_tick >= -200);

            // output can never exceed what the price move actually releases
            let released = get_delta_amount_1(
                result.final_sqrt_price_x64,
                pool.current_sqrt_price_x64,
                liquidity,
                false,
            )
            .unwrap();
            if mode == PartialFill::Exact {
                assert_eq!(result.amount_out, released);
            }
        }
    }

    #[test]
    fn price_impact_is_the_pool_price_move() {
        let positions = vec![Position::new(-1_000, 1_000, 5_000_000_000_000)];
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let amount = U256::from(10_000_000_000u64);
        let result =
            simulate_exact_swap(&pool, &curve, amount, SwapDirection::Token1ToToken0, &no_fee())
                .unwrap();
        assert_eq!(result.ticks_crossed, 0);

        let spot = sqrt_price_x64_to_price(pool.current_sqrt_price_x64, 9, 6);
        let final_price = sqrt_price_x64_to_price(result.final_sqrt_price_x64, 9, 6);
        assert_eq!(result.price_impact_percent, percent_change(&spot, &final_price));
        assert!(result.price_impact_percent > BigDecimal::zero());

        let fill = result.execution_price.clone().unwrap();
        assert_eq!(result.slippage_percent, percent_deviation(&spot, &fill));
        // the average fill sits between spot and the final price
        assert!(result.slippage_percent < result.price_impact_percent);
    }

    #[test]
    fn exact_and_pro_rata_agree_closely() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let amount = U256::from(50_000_000_000u64);
        let up = SwapDirection::Token1ToToken0;

        let pro_rata =
            simulate_exact_swap(&pool, &curve, amount, up, &params(PartialFill::ProRata)).unwrap();
        let exact =
            simulate_exact_swap(&pool, &curve, amount, up, &params(PartialFill::Exact)).unwrap();
        assert_eq!(pro_rata.ticks_crossed, exact.ticks_crossed);
        // output is concave in input, so interpolating along the segment understates it
        assert!(exact.amount_out >= pro_rata.amount_out);
        let gap = exact.amount_out - pro_rata.amount_out;
        assert!(gap * U256::from(25u8) < exact.amount_out);
        assert!(pro_rata.final_sqrt_price_x64 <= exact.final_sqrt_price_x64);
    }

    #[test]
    fn large_swap_crosses_ticks_and_runs_dry() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let down = SwapDirection::Token0ToToken1;

        // exactly enough token0 to walk down to -200
        let liquidity = curve.liquidity_at(0).unwrap();
        let to_first = get_delta_amount_0(
            tick_to_sqrt_price_x64(-200).unwrap(),
            pool.current_sqrt_price_x64,
            liquidity,
            true,
        )
        .unwrap();
        let result = simulate_exact_swap(&pool, &curve, to_first, down, &no_fee()).unwrap();
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(result.amount_unspent, U256::ZERO);
        assert_eq!(result.final_sqrt_price_x64, tick_to_sqrt_price_x64(-200).unwrap());
        assert_eq!(result.final_tick, -200);
        assert_eq!(result.filled_execution_price, result.execution_price);

        let huge = U256::from(u128::MAX);
        let result = simulate_exact_swap(&pool, &curve, huge, down, &no_fee()).unwrap();
        assert_eq!(result.ticks_crossed, 3);
        assert!(result.liquidity_exhausted);
        assert!(result.amount_unspent > U256::ZERO);
        assert_eq!(result.final_tick, -3_000);

        // only the consumed input prices the fill
        let filled = result.filled_execution_price.clone().unwrap();
        let spent = result.amount_in - result.amount_unspent;
        let expected = execution_price(down, spent, result.amount_out, pool.token_scale());
        assert_eq!(Some(filled.clone()), expected);
        assert!(filled > result.execution_price.unwrap());
    }

    #[test]
    fn out_of_bound_tick_is_skipped_during_swap() {
        let positions = vec![Position::new(-2_000, 2_000, 1_000_000)];
        let curve = LiquidityCurve::build(&positions).unwrap();
        let params = AnalysisParams {
            tick_bound: TickBound::new(1_000).unwrap(),
            ..no_fee()
        };
        let pool = mock_pool(0);
        let amount = U256::from(1_000_000_000u64);
        let result =
            simulate_exact_swap(&pool, &curve, amount, SwapDirection::Token1ToToken0, &params)
                .unwrap();

        assert_eq!(
            result.diagnostics,
            vec![WalkDiagnostic::TickSkipped {
                tick: 2_000,
                reason: MathError::TickOutOfRange { tick: 2_000, bound: 1_000 }.to_string(),
            }]
        );
        assert_eq!(result.ticks_crossed, 0);
        assert_eq!(result.amount_out, U256::ZERO);
        assert_eq!(result.amount_unspent, amount);
        assert!(result.liquidity_exhausted);
        assert_eq!(result.final_tick, 0);
    }

    #[test]
    fn negative_crossing_is_clamped_during_swap() {
        // starting liquidity below what the upper edge removes
        let positions = vec![Position::new(-100, 100, 500)];
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let to_edge = get_delta_amount_1(
            pool.current_sqrt_price_x64,
            tick_to_sqrt_price_x64(100).unwrap(),
            100,
            true,
        )
        .unwrap();
        let amount = to_edge + U256::from(1_000u64);

        let result =
            swap_from(&pool, &curve, amount, SwapDirection::Token1ToToken0, &no_fee(), 100)
                .unwrap();
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(
            result.diagnostics,
            vec![WalkDiagnostic::NegativeLiquidityDetected {
                tick: 100,
                liquidity_before: 100,
                liquidity_change: -500,
                deficit: 400,
            }]
        );
        assert!(result.liquidity_exhausted);
        assert_eq!(result.amount_unspent, U256::from(1_000u64));
        assert_eq!(result.final_tick, 100);
    }

    #[test]
    fn larger_swaps_have_larger_impact() {
        let positions = deep_positions();
        let curve = LiquidityCurve::build(&positions).unwrap();
        let pool = mock_pool(0);
        let down = SwapDirection::Token0ToToken1;
        let sizes = standard_swap_sizes(&pool, down);
        let results =
            analyze_swap_sizes(&pool, &curve, down, &sizes, &AnalysisParams::default()).unwrap();
        assert_eq!(results.len(), sizes.len());
        for pair in results.windows(2) {
            assert!(pair[0].amount_out <= pair[1].amount_out);
            assert!(pair[0].slippage_percent <= pair[1].slippage_percent);
            // selling token0 only ever pushes the price down
            assert!(pair[0].price_impact_percent >= pair[1].price_impact_percent);
        }
    }

    #[test]
    fn standard_sizes_follow_token_decimals_and_spot() {
        let pool = mock_pool(0);
        let token0 = standard_swap_sizes(&pool, SwapDirection::Token0ToToken1);
        assert_eq!(token0.len(), 8);
        assert_eq!(token0[0], U256::from(100_000_000u64));
        assert_eq!(token0[7], U256::from(500_000_000_000u64));

        // at tick 0 one raw token0 is worth one raw token1
        let token1 = standard_swap_sizes(&pool, SwapDirection::Token1ToToken0);
        assert_eq!(token1, token0);

        let mut coarse = mock_pool(0);
        coarse.decimals0 = 0;
        // 0.1 and 0.5 whole tokens round to nothing
        assert_eq!(standard_swap_sizes(&coarse, SwapDirection::Token0ToToken1).len(), 6);
    }
}
