//! Human-readable prices derived from Q64.64 sqrt prices.
//!
//! Prices are quoted as token1 per token0 in whole-token units and carried as
//! `BigDecimal` so that no amount goes through a lossy float conversion.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::Serialize;

use crate::clmm::math::{TickBound, tick_to_sqrt_price_x64_within};
use crate::errors::MathError;
use crate::models::{SwapDirection, TokenScale};

/// Significant digits kept for prices.
pub const PRICE_PRECISION: u64 = 24;
/// Fractional digits kept for percentages.
pub const PERCENT_SCALE: i64 = 12;

/// Price band covered by a tick range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// `None` when the tick lies outside the configured bound.
    pub price_lower: Option<BigDecimal>,
    pub price_upper: Option<BigDecimal>,
    /// Range contains the current tick.
    pub active: bool,
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from(BigUint::from_bytes_be(&value.to_be_bytes::<32>()))
}

/// Raw token amount expressed in whole tokens.
pub fn to_decimal_units(amount: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_bigint(amount), decimals as i64)
}

/// `sqrt² / 2^128 * 10^(decimals0 - decimals1)`.
pub fn sqrt_price_x64_to_price(sqrt_price_x64: u128, decimals0: u8, decimals1: u8) -> BigDecimal {
    let sqrt = BigInt::from(sqrt_price_x64);
    let squared = &sqrt * &sqrt;
    // 10^(d0 - d1) folded into the scale: value = squared * 10^-(d1 - d0)
    let scaled = BigDecimal::new(squared, decimals1 as i64 - decimals0 as i64);
    let q128 = BigDecimal::new(BigInt::from(1u8) << 128usize, 0);
    (scaled / q128).with_prec(PRICE_PRECISION).normalized()
}

pub fn tick_to_price(
    tick: i32,
    scale: TokenScale,
    bound: TickBound,
) -> Result<BigDecimal, MathError> {
    let sqrt = tick_to_sqrt_price_x64_within(tick, bound)?;
    Ok(sqrt_price_x64_to_price(sqrt, scale.decimals0, scale.decimals1))
}

pub fn tick_range_to_price_range(
    tick_lower: i32,
    tick_upper: i32,
    scale: TokenScale,
    current_tick: i32,
    bound: TickBound,
) -> PriceRange {
    PriceRange {
        tick_lower,
        tick_upper,
        price_lower: tick_to_price(tick_lower, scale, bound).ok(),
        price_upper: tick_to_price(tick_upper, scale, bound).ok(),
        active: current_tick >= tick_lower && current_tick < tick_upper,
    }
}

/// Signed change from `from` to `to`, in percent. Zero when `from` is zero.
pub fn percent_change(from: &BigDecimal, to: &BigDecimal) -> BigDecimal {
    if from.is_zero() {
        return BigDecimal::zero();
    }
    let change = (to - from) / from * BigDecimal::from(100);
    change.round(PERCENT_SCALE).normalized()
}

/// Absolute deviation of `value` from `reference`, in percent.
pub fn percent_deviation(reference: &BigDecimal, value: &BigDecimal) -> BigDecimal {
    percent_change(reference, value).abs()
}

/// Average price of a fill, token1 per token0. `None` when either side is zero.
pub fn execution_price(
    direction: SwapDirection,
    amount_in: U256,
    amount_out: U256,
    scale: TokenScale,
) -> Option<BigDecimal> {
    if amount_in.is_zero() || amount_out.is_zero() {
        return None;
    }
    let (token0, token1) = match direction {
        SwapDirection::Token0ToToken1 => (amount_in, amount_out),
        SwapDirection::Token1ToToken0 => (amount_out, amount_in),
    };
    let price =
        to_decimal_units(token1, scale.decimals1) / to_decimal_units(token0, scale.decimals0);
    Some(price.with_prec(PRICE_PRECISION).normalized())
}
