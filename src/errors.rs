use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the fixed-point primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Tick {tick} outside supported range ±{bound}")]
    TickOutOfRange { tick: i32, bound: i32 },

    #[error("Tick bound {0} must be in 1..=887272")]
    InvalidTickBound(i32),

    #[error("Sqrt price {0} outside supported range")]
    SqrtPriceOutOfRange(u128),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Fee rate {0} bps must be below 10000")]
    InvalidFeeRate(u32),
}

/// Failures while turning a position set into a liquidity curve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("Invalid position range: tick_lower {lower} must be below tick_upper {upper}")]
    InvalidPositionRange { lower: i32, upper: i32 },

    #[error("Liquidity overflow at tick {0}")]
    LiquidityOverflow(i32),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Invalid amount: {0}")]
    Amount(String),
}
