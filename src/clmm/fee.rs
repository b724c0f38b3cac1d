//! Trade fee arithmetic in basis points.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::clmm::math::{mul_div, mul_div_rounding_up};
use crate::errors::MathError;

pub const FEE_DENOMINATOR_BPS: u32 = 10_000;

/// Pool fee split into the base trade fee and an additional surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub base_rate_bps: u32,
    pub additional_rate_bps: u32,
}

impl Default for FeeConfig {
    /// 0.20% base + 0.05% additional.
    fn default() -> Self {
        Self {
            base_rate_bps: 20,
            additional_rate_bps: 5,
        }
    }
}

/// Result of applying the fee to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    /// Amount the trader pays, fee included.
    pub gross: U256,
    /// Amount that actually moves the price.
    pub net: U256,
    pub fee: U256,
}

impl FeeConfig {
    pub fn new(base_rate_bps: u32, additional_rate_bps: u32) -> Self {
        Self {
            base_rate_bps,
            additional_rate_bps,
        }
    }

    /// Single-rate fee with no surcharge.
    pub fn flat(rate_bps: u32) -> Self {
        Self::new(rate_bps, 0)
    }

    pub fn total_rate_bps(&self) -> u32 {
        self.base_rate_bps.saturating_add(self.additional_rate_bps)
    }

    pub fn validate(&self) -> Result<(), MathError> {
        let rate = self.total_rate_bps();
        if rate >= FEE_DENOMINATOR_BPS {
            return Err(MathError::InvalidFeeRate(rate));
        }
        Ok(())
    }

    /// Gross input needed so that `theoretical` remains after the fee:
    /// `ceil(theoretical * 10000 / (10000 - rate))`.
    pub fn gross_up(&self, theoretical: U256) -> Result<FeeSplit, MathError> {
        self.validate()?;
        let kept = U256::from(FEE_DENOMINATOR_BPS - self.total_rate_bps());
        let gross = mul_div_rounding_up(theoretical, U256::from(FEE_DENOMINATOR_BPS), kept)?;
        Ok(FeeSplit {
            gross,
            net: theoretical,
            fee: gross - theoretical,
        })
    }

    /// Fee taken out of a gross input: `floor(amount * rate / 10000)`.
    pub fn deduct(&self, amount_in: U256) -> Result<FeeSplit, MathError> {
        self.validate()?;
        let fee = mul_div(
            amount_in,
            U256::from(self.total_rate_bps()),
            U256::from(FEE_DENOMINATOR_BPS),
        )?;
        Ok(FeeSplit {
            gross: amount_in,
            net: amount_in - fee,
            fee,
        })
    }
}
