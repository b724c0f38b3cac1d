//! Shared data structures used throughout the application.

use serde::{Deserialize, Serialize};

use crate::errors::CurveError;
use crate::utils::dec_string;

/// Direction of a simulated swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// token0 in → token1 out → price DOWN → √P decreases
    Token0ToToken1,
    /// token1 in → token0 out → price UP → √P increases
    Token1ToToken0,
}

impl SwapDirection {
    pub const BOTH: [SwapDirection; 2] =
        [SwapDirection::Token0ToToken1, SwapDirection::Token1ToToken0];

    /// True when the swap pushes the pool price (and tick) upwards.
    pub fn is_price_increasing(self) -> bool {
        matches!(self, SwapDirection::Token1ToToken0)
    }

    pub fn label(self) -> &'static str {
        match self {
            SwapDirection::Token0ToToken1 => "token0 → token1",
            SwapDirection::Token1ToToken0 => "token1 → token0",
        }
    }
}

/// A concentrated-liquidity position covering `[tick_lower, tick_upper)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
    #[serde(with = "dec_string")]
    pub liquidity: u128,
    /// Owner resolved upstream (wallet of the position NFT), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Position {
    pub fn new(tick_lower: i32, tick_upper: i32, liquidity: u128) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity,
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Whether the position provides liquidity at `tick`.
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick < self.tick_upper
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if self.tick_lower >= self.tick_upper {
            return Err(CurveError::InvalidPositionRange {
                lower: self.tick_lower,
                upper: self.tick_upper,
            });
        }
        Ok(())
    }
}

/// Point-in-time snapshot of the pool account, as decoded upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub current_tick: i32,
    /// Current sqrt(price1/price0) in Q64.64.
    #[serde(with = "dec_string")]
    pub current_sqrt_price_x64: u128,
    /// In-range liquidity reported by the pool account.
    #[serde(with = "dec_string")]
    pub current_liquidity: u128,
    pub decimals0: u8,
    pub decimals1: u8,
    /// Trade fee reported by the pool's fee config, in basis points.
    pub fee_rate_bps: u32,
}

impl PoolSnapshot {
    pub fn token_scale(&self) -> TokenScale {
        TokenScale {
            decimals0: self.decimals0,
            decimals1: self.decimals1,
        }
    }
}

/// Mint decimals of both pool tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenScale {
    pub decimals0: u8,
    pub decimals1: u8,
}

impl TokenScale {
    pub fn new(decimals0: u8, decimals1: u8) -> Self {
        Self {
            decimals0,
            decimals1,
        }
    }

    pub fn decimals_in(self, direction: SwapDirection) -> u8 {
        match direction {
            SwapDirection::Token0ToToken1 => self.decimals0,
            SwapDirection::Token1ToToken0 => self.decimals1,
        }
    }

    pub fn decimals_out(self, direction: SwapDirection) -> u8 {
        match direction {
            SwapDirection::Token0ToToken1 => self.decimals1,
            SwapDirection::Token1ToToken0 => self.decimals0,
        }
    }
}

/// Pool snapshot plus every position opened against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolData {
    pub pool: PoolSnapshot,
    #[serde(default)]
    pub positions: Vec<Position>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_range_is_half_open() {
        let pos = Position::new(-10, 10, 1);
        assert!(pos.contains(-10));
        assert!(pos.contains(9));
        assert!(!pos.contains(10));
        assert!(!pos.contains(-11));
    }

    #[test]
    fn inverted_position_is_rejected() {
        let err = Position::new(5, 5, 1).validate().unwrap_err();
        assert_eq!(err, CurveError::InvalidPositionRange { lower: 5, upper: 5 });
    }

    #[test]
    fn snapshot_accepts_string_and_number_integers() {
        let json = r#"{
            "pool": {
                "current_tick": -12,
                "current_sqrt_price_x64": "18446744073709551616",
                "current_liquidity": 1000,
                "decimals0": 9,
                "decimals1": 6,
                "fee_rate_bps": 25
            },
            "positions": [
                {
                    "tick_lower": -100,
                    "tick_upper": 100,
                    "liquidity": "340282366920938463463374607431768211455",
                    "owner": "alice"
                }
            ]
        }"#;
        let data: PoolData = serde_json::from_str(json).unwrap();
        assert_eq!(data.pool.current_sqrt_price_x64, 1u128 << 64);
        assert_eq!(data.pool.current_liquidity, 1000);
        assert_eq!(data.positions[0].liquidity, u128::MAX);
        assert_eq!(data.positions[0].owner.as_deref(), Some("alice"));
    }

    #[test]
    fn direction_decimals_follow_token_sides() {
        let scale = TokenScale::new(9, 6);
        assert_eq!(scale.decimals_in(SwapDirection::Token0ToToken1), 9);
        assert_eq!(scale.decimals_out(SwapDirection::Token0ToToken1), 6);
        assert_eq!(scale.decimals_in(SwapDirection::Token1ToToken0), 6);
        assert_eq!(scale.decimals_out(SwapDirection::Token1ToToken0), 9);
    }
}
