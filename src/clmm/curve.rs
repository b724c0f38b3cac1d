//! Piecewise-constant liquidity curve reconstructed from positions.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use serde::Serialize;

use crate::errors::CurveError;
use crate::models::{Position, SwapDirection};

/// Net and gross liquidity referencing one initialized tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickLiquidity {
    pub tick: i32,
    /// Added when the price crosses the tick upwards, removed downwards.
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
}

/// Outcome of moving across one initialized tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub liquidity_after: u128,
    /// Signed change actually requested by the tick, before clamping.
    pub liquidity_change: i128,
    /// Liquidity missing when the requested drop exceeded what was active.
    pub deficit: Option<u128>,
}

#[derive(Debug, Clone)]
pub struct LiquidityCurve<'a> {
    ticks: BTreeMap<i32, TickLiquidity>,
    positions: &'a [Position],
}

impl<'a> LiquidityCurve<'a> {
    /// Accumulate `+L` at each lower tick and `-L` at each upper tick.
    pub fn build(positions: &'a [Position]) -> Result<Self, CurveError> {
        let mut ticks = BTreeMap::new();
        for position in positions {
            position.validate()?;
            if position.liquidity == 0 {
                continue;
            }
            let delta = i128::try_from(position.liquidity)
                .map_err(|_| CurveError::LiquidityOverflow(position.tick_lower))?;
            add_to_tick(&mut ticks, position.tick_lower, delta, position.liquidity)?;
            add_to_tick(&mut ticks, position.tick_upper, -delta, position.liquidity)?;
        }
        Ok(Self { ticks, positions })
    }

    /// Sum of liquidity of every position covering `tick`.
    pub fn liquidity_at(&self, tick: i32) -> Result<u128, CurveError> {
        self.positions
            .iter()
            .filter(|p| p.contains(tick))
            .try_fold(0u128, |acc, p| {
                acc.checked_add(p.liquidity)
                    .ok_or(CurveError::LiquidityOverflow(tick))
            })
    }

    /// Initialized ticks the price meets when swapping from `current_tick`:
    /// strictly below in descending order for token0 in, strictly above in
    /// ascending order for token1 in.
    pub fn ticks_in_direction(
        &self,
        current_tick: i32,
        direction: SwapDirection,
    ) -> Box<dyn Iterator<Item = &TickLiquidity> + '_> {
        match direction {
            SwapDirection::Token0ToToken1 => {
                Box::new(self.ticks.range(..current_tick).rev().map(|(_, t)| t))
            }
            SwapDirection::Token1ToToken0 => Box::new(
                self.ticks
                    .range((Excluded(current_tick), Unbounded))
                    .map(|(_, t)| t),
            ),
        }
    }

    /// Σ liquidity_net over all ticks; zero for any consistent position set.
    pub fn total_net(&self) -> i128 {
        // wrapping is exact whenever the true total fits i128
        self.ticks
            .values()
            .fold(0i128, |acc, t| acc.wrapping_add(t.liquidity_net))
    }

    pub fn get(&self, tick: i32) -> Option<&TickLiquidity> {
        self.ticks.get(&tick)
    }

    pub fn ticks(&self) -> impl Iterator<Item = &TickLiquidity> + '_ {
        self.ticks.values()
    }

    pub fn positions(&self) -> &'a [Position] {
        self.positions
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

fn add_to_tick(
    ticks: &mut BTreeMap<i32, TickLiquidity>,
    tick: i32,
    net: i128,
    gross: u128,
) -> Result<(), CurveError> {
    let entry = ticks.entry(tick).or_insert(TickLiquidity {
        tick,
        ..Default::default()
    });
    entry.liquidity_net = entry
        .liquidity_net
        .checked_add(net)
        .ok_or(CurveError::LiquidityOverflow(tick))?;
    entry.liquidity_gross = entry
        .liquidity_gross
        .checked_add(gross)
        .ok_or(CurveError::LiquidityOverflow(tick))?;
    Ok(())
}

/// Apply a tick's net liquidity for a swap in `direction`.
///
/// Price moving up adds `net`, moving down subtracts it. A result below zero
/// means the position set is inconsistent with the walk; liquidity is clamped
/// to zero and the shortfall reported.
pub fn cross_tick(liquidity: u128, liquidity_net: i128, direction: SwapDirection) -> Crossing {
    let change = if direction.is_price_increasing() {
        liquidity_net
    } else {
        liquidity_net.saturating_neg()
    };

    if change >= 0 {
        return Crossing {
            liquidity_after: liquidity.saturating_add(change as u128),
            liquidity_change: change,
            deficit: None,
        };
    }

    let drop = change.unsigned_abs();
    match liquidity.checked_sub(drop) {
        Some(after) => Crossing {
            liquidity_after: after,
            liquidity_change: change,
            deficit: None,
        },
        None => Crossing {
            liquidity_after: 0,
            liquidity_change: change,
            deficit: Some(drop - liquidity),
        },
    }
}
