//! Miscellaneous helper utilities.

use alloy_primitives::U256;
use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::{AppError, Result};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Render a raw token amount with its decimal point, trimming trailing zeros.
///
/// `add_decimal_point(1_500_000_000, 9)` → `"1.5"`.
pub fn add_decimal_point(value: impl std::fmt::Display, decimals: u8) -> String {
    let raw = value.to_string();
    if decimals == 0 {
        return raw;
    }
    let decimals = decimals as usize;
    let padded = format!("{:0>width$}", raw, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parse a human decimal amount (`"1,234.5"`) into raw units with `decimals`
/// places. Extra fractional digits are truncated, not rounded.
pub fn parse_decimal_amount(value: &str, decimals: u8) -> Result<U256> {
    let clean: String = value.trim().chars().filter(|c| *c != ',').collect();
    let (whole, fraction) = match clean.split_once('.') {
        Some((w, f)) => (w, f),
        None => (clean.as_str(), ""),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AppError::Amount(value.to_string()));
    }

    let decimals = decimals as usize;
    let mut fraction: String = fraction.chars().take(decimals).collect();
    while fraction.len() < decimals {
        fraction.push('0');
    }
    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AppError::Amount(value.to_string()))
}

/// Serde adapter for big integers: written as decimal strings, read from
/// either decimal strings or JSON numbers.
pub mod dec_string {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Unsigned(u64),
        Signed(i64),
    }

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Unsigned(n) => n.to_string(),
            Raw::Signed(n) => n.to_string(),
        };
        text.trim().parse().map_err(de::Error::custom)
    }
}

/// Optional counterpart of [`dec_string`], serialize only.
pub mod opt_dec_string {
    use serde::Serializer;
    use std::fmt::Display;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }
}
