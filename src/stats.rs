//! Position counts, liquidity distribution and ownership concentration.

use std::collections::HashMap;

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::clmm::price::{PERCENT_SCALE, to_decimal_units};
use crate::clmm::{PriceRange, TickBound, tick_range_to_price_range};
use crate::models::{Position, TokenScale};
use crate::utils::dec_string;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    #[serde(with = "dec_string")]
    pub total_liquidity: U256,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionShare {
    #[serde(flatten)]
    pub range: PriceRange,
    #[serde(with = "dec_string")]
    pub liquidity: u128,
    pub share_percent: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityDistribution {
    #[serde(with = "dec_string")]
    pub active_liquidity: U256,
    #[serde(with = "dec_string")]
    pub inactive_liquidity: U256,
    pub active_percent: BigDecimal,
    pub inactive_percent: BigDecimal,
    /// Largest positions first.
    pub positions: Vec<PositionShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    pub owner: String,
    pub position_count: usize,
    #[serde(with = "dec_string")]
    pub total_liquidity: U256,
    pub share_percent: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipAnalysis {
    pub total_owners: usize,
    pub positions_without_owner: usize,
    pub average_positions_per_owner: Option<BigDecimal>,
    pub top_owners: Vec<OwnerSummary>,
}

pub fn position_stats(positions: &[Position], current_tick: i32) -> PositionStats {
    let active = positions.iter().filter(|p| p.contains(current_tick)).count();
    PositionStats {
        total: positions.len(),
        active,
        inactive: positions.len() - active,
        total_liquidity: total_liquidity(positions.iter()),
    }
}

pub fn liquidity_distribution(
    positions: &[Position],
    current_tick: i32,
    scale: TokenScale,
    bound: TickBound,
) -> LiquidityDistribution {
    let total = total_liquidity(positions.iter());
    let active = total_liquidity(positions.iter().filter(|p| p.contains(current_tick)));
    let inactive = total - active;

    let mut shares: Vec<PositionShare> = positions
        .iter()
        .map(|p| PositionShare {
            range: tick_range_to_price_range(
                p.tick_lower,
                p.tick_upper,
                scale,
                current_tick,
                bound,
            ),
            liquidity: p.liquidity,
            share_percent: share_percent(U256::from(p.liquidity), total),
            owner: p.owner.clone(),
        })
        .collect();
    shares.sort_by(|a, b| b.liquidity.cmp(&a.liquidity));

    let unpriced = shares
        .iter()
        .filter(|s| s.range.price_lower.is_none() || s.range.price_upper.is_none())
        .count();
    if unpriced > 0 {
        tracing::warn!(
            unpriced,
            bound = bound.limit(),
            "[STATS] position edges outside tick bound left unpriced"
        );
    }

    LiquidityDistribution {
        active_liquidity: active,
        inactive_liquidity: inactive,
        active_percent: share_percent(active, total),
        inactive_percent: share_percent(inactive, total),
        positions: shares,
    }
}

/// Aggregate positions per owner and keep the `top_n` largest by liquidity.
pub fn analyze_ownership(positions: &[Position], top_n: usize) -> OwnershipAnalysis {
    let total = total_liquidity(positions.iter());
    let mut by_owner: HashMap<&str, (usize, U256)> = HashMap::new();
    let mut positions_without_owner = 0;

    for position in positions {
        match position.owner.as_deref() {
            Some(owner) => {
                let entry = by_owner.entry(owner).or_insert((0, U256::ZERO));
                entry.0 += 1;
                entry.1 += U256::from(position.liquidity);
            }
            None => positions_without_owner += 1,
        }
    }

    let total_owners = by_owner.len();
    let owned_positions = positions.len() - positions_without_owner;
    let average_positions_per_owner = (total_owners > 0).then(|| {
        let avg = BigDecimal::from(owned_positions as u64) / BigDecimal::from(total_owners as u64);
        avg.round(2).normalized()
    });

    let mut owners: Vec<OwnerSummary> = by_owner
        .into_iter()
        .map(|(owner, (position_count, liquidity))| OwnerSummary {
            owner: owner.to_string(),
            position_count,
            total_liquidity: liquidity,
            share_percent: share_percent(liquidity, total),
        })
        .collect();
    owners.sort_by(|a, b| {
        b.total_liquidity
            .cmp(&a.total_liquidity)
            .then_with(|| a.owner.cmp(&b.owner))
    });
    owners.truncate(top_n);

    OwnershipAnalysis {
        total_owners,
        positions_without_owner,
        average_positions_per_owner,
        top_owners: owners,
    }
}

fn total_liquidity<'a>(positions: impl Iterator<Item = &'a Position>) -> U256 {
    positions.fold(U256::ZERO, |acc, p| acc + U256::from(p.liquidity))
}

fn share_percent(part: U256, total: U256) -> BigDecimal {
    if total.is_zero() {
        return BigDecimal::default();
    }
    let ratio = to_decimal_units(part, 0) / to_decimal_units(total, 0) * BigDecimal::from(100);
    ratio.round(PERCENT_SCALE).normalized()
}
