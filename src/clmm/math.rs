//! Fixed-point primitives for Q64.64 concentrated-liquidity pools.
//!
//! Sqrt prices are `u128` values scaled by 2^64; token amounts are `U256`.
//! Floating point is used exactly once, for `1.0001^(tick/2)`; everything
//! downstream of that conversion is integer arithmetic.

use alloy_primitives::U256;
use serde::Serialize;

use crate::errors::MathError;
use crate::models::SwapDirection;

pub const RESOLUTION: u8 = 64;
pub const Q64: u128 = 1 << 64;

const Q64_U256: U256 = U256::from_limbs([0, 1, 0, 0]);
const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

const TICK_BASE: f64 = 1.0001;

/// Symmetric bound on usable tick indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TickBound(i32);

impl TickBound {
    /// Raydium CLMM range; the largest sqrt price stays below 2^97.
    pub const RAYDIUM: TickBound = TickBound(443_636);
    /// Uniswap V3 range. Sqrt prices near the top no longer fit Q64.64.
    pub const UNISWAP: TickBound = TickBound(887_272);

    pub fn new(limit: i32) -> Result<Self, MathError> {
        if limit <= 0 || limit > Self::UNISWAP.0 {
            return Err(MathError::InvalidTickBound(limit));
        }
        Ok(Self(limit))
    }

    pub fn limit(self) -> i32 {
        self.0
    }

    pub fn contains(self, tick: i32) -> bool {
        (-self.0..=self.0).contains(&tick)
    }
}

impl Default for TickBound {
    fn default() -> Self {
        Self::RAYDIUM
    }
}

/// `floor(sqrt(1.0001^tick) * 2^64)` using the default Raydium bound.
pub fn tick_to_sqrt_price_x64(tick: i32) -> Result<u128, MathError> {
    tick_to_sqrt_price_x64_within(tick, TickBound::default())
}

/// Like [`tick_to_sqrt_price_x64`] with an explicit tick bound.
pub fn tick_to_sqrt_price_x64_within(tick: i32, bound: TickBound) -> Result<u128, MathError> {
    let out_of_range = MathError::TickOutOfRange {
        tick,
        bound: bound.limit(),
    };
    if !bound.contains(tick) {
        return Err(out_of_range);
    }

    // sqrt(1.0001^tick) = 1.0001^(tick/2)
    let sqrt_price = TICK_BASE.powf(tick as f64 / 2.0);
    let scaled = (sqrt_price * 2.0_f64.powi(64)).floor();
    if !scaled.is_finite() || scaled < 1.0 || scaled >= 2.0_f64.powi(128) {
        return Err(out_of_range);
    }
    Ok(scaled as u128)
}

/// Greatest tick whose sqrt price is `<= sqrt_price_x64`.
///
/// The logarithm only provides an estimate; the result is then corrected
/// against [`tick_to_sqrt_price_x64_within`] so both conversions agree.
pub fn sqrt_price_x64_to_tick(sqrt_price_x64: u128, bound: TickBound) -> Result<i32, MathError> {
    let limit = bound.limit();
    let min_sqrt = tick_to_sqrt_price_x64_within(-limit, bound)?;
    if sqrt_price_x64 < min_sqrt {
        return Err(MathError::SqrtPriceOutOfRange(sqrt_price_x64));
    }

    let ratio = sqrt_price_x64 as f64 / 2.0_f64.powi(64);
    let estimate = (2.0 * ratio.ln() / TICK_BASE.ln()).floor();
    if !estimate.is_finite() {
        return Err(MathError::SqrtPriceOutOfRange(sqrt_price_x64));
    }
    let mut tick = (estimate as i64).clamp(-(limit as i64), limit as i64) as i32;

    while tick > -limit && tick_to_sqrt_price_x64_within(tick, bound)? > sqrt_price_x64 {
        tick -= 1;
    }
    while tick < limit {
        match tick_to_sqrt_price_x64_within(tick + 1, bound) {
            Ok(next) if next <= sqrt_price_x64 => tick += 1,
            _ => break,
        }
    }
    Ok(tick)
}

/// Token0 needed (or released) moving between two sqrt prices:
/// `L * 2^64 * (b - a) / (a * b)`.
///
/// Argument order does not matter. `round_up` selects the ceiling, used for
/// amounts the trader must pay; amounts paid out round down.
pub fn get_delta_amount_0(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    if liquidity == 0 || lower == upper {
        return Ok(U256::ZERO);
    }
    if lower == 0 {
        return Err(MathError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = U256::from(upper - lower);
    let lower = U256::from(lower);
    let upper = U256::from(upper);

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, upper)?,
            lower,
        ))
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Token1 needed (or released) moving between two sqrt prices:
/// `L * (b - a) / 2^64`.
pub fn get_delta_amount_1(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    if liquidity == 0 || lower == upper {
        return Ok(U256::ZERO);
    }

    let product = U256::from(liquidity) * U256::from(upper - lower);
    let (quotient, remainder) = product.div_rem(Q64_U256);
    if round_up && !remainder.is_zero() {
        Ok(quotient + U256::ONE)
    } else {
        Ok(quotient)
    }
}

/// Fee-free amounts for moving the price across one constant-liquidity segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentAmounts {
    /// Input required, rounded up.
    pub amount_in: U256,
    /// Output released, rounded down.
    pub amount_out: U256,
}

/// Amounts for swapping from `current` to `target` at constant `liquidity`.
///
/// A zero sqrt price degenerates to an empty segment instead of an error.
pub fn compute_segment(
    current_sqrt_price_x64: u128,
    target_sqrt_price_x64: u128,
    liquidity: u128,
    direction: SwapDirection,
) -> Result<SegmentAmounts, MathError> {
    let (amount_in, amount_out) = match direction {
        SwapDirection::Token0ToToken1 => (
            get_delta_amount_0(target_sqrt_price_x64, current_sqrt_price_x64, liquidity, true),
            get_delta_amount_1(target_sqrt_price_x64, current_sqrt_price_x64, liquidity, false),
        ),
        SwapDirection::Token1ToToken0 => (
            get_delta_amount_1(current_sqrt_price_x64, target_sqrt_price_x64, liquidity, true),
            get_delta_amount_0(current_sqrt_price_x64, target_sqrt_price_x64, liquidity, false),
        ),
    };
    Ok(SegmentAmounts {
        amount_in: zero_on_division_by_zero(amount_in)?,
        amount_out: zero_on_division_by_zero(amount_out)?,
    })
}

/// Sqrt price reached after feeding `amount_in` into a segment of constant
/// `liquidity`, solved in closed form.
///
/// token0 in rounds the new price up and token1 in rounds it down, so the
/// pool never releases more than the input pays for.
pub fn next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: U256,
    direction: SwapDirection,
) -> Result<u128, MathError> {
    if sqrt_price_x64 == 0 || liquidity == 0 {
        return Err(MathError::DivisionByZero);
    }
    if amount_in.is_zero() {
        return Ok(sqrt_price_x64);
    }

    let price = U256::from(sqrt_price_x64);
    let next = match direction {
        SwapDirection::Token0ToToken1 => {
            let numerator1 = U256::from(liquidity) << RESOLUTION;
            let denominator = amount_in
                .checked_mul(price)
                .and_then(|product| numerator1.checked_add(product));
            match denominator {
                Some(denominator) => mul_div_rounding_up(numerator1, price, denominator)?,
                None => div_rounding_up(numerator1, (numerator1 / price).saturating_add(amount_in)),
            }
        }
        SwapDirection::Token1ToToken0 => {
            let quotient = mul_div(amount_in, Q64_U256, U256::from(liquidity))?;
            price.checked_add(quotient).ok_or(MathError::Overflow)?
        }
    };
    u128::try_from(next).map_err(|_| MathError::Overflow)
}

/// Computes `a * b / denominator` with a full 512-bit intermediate product.
///
/// Port of Uniswap's `FullMath.mulDiv`; fails on division by zero or when the
/// quotient does not fit 256 bits.
pub fn mul_div(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);

    let (mut prod1, borrow1) = mm.overflowing_sub(prod0);
    if borrow1 {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0 / denominator);
    }
    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    let remainder = a.mul_mod(b, denominator);
    let (prod0_new, borrow2) = prod0.overflowing_sub(remainder);
    prod0 = prod0_new;
    if borrow2 {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    let twos = denominator & denominator.wrapping_neg();
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);

    let twos_adj = twos
        .wrapping_neg()
        .wrapping_div(twos)
        .wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(twos_adj);

    // Newton-Raphson inverse of the (now odd) denominator mod 2^256.
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], rounding up when the division leaves a remainder.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div(a, b, denominator)?;
    if a.mul_mod(b, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// `ceil(a / b)`. Panics on `b == 0` like primitive division.
pub fn div_rounding_up(a: U256, b: U256) -> U256 {
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::ONE
    }
}

fn ordered(a: u128, b: u128) -> (u128, u128) {
    if a <= b { (a, b) } else { (b, a) }
}

fn zero_on_division_by_zero(amount: Result<U256, MathError>) -> Result<U256, MathError> {
    match amount {
        Err(MathError::DivisionByZero) => Ok(U256::ZERO),
        other => other,
    }
}
