pub mod curve;
pub mod fee;
pub mod math;
pub mod price;

pub use curve::{Crossing, LiquidityCurve, TickLiquidity, cross_tick};
pub use fee::{FEE_DENOMINATOR_BPS, FeeConfig, FeeSplit};
pub use math::{
    Q64, SegmentAmounts, TickBound, compute_segment, get_delta_amount_0, get_delta_amount_1,
    next_sqrt_price_from_input, sqrt_price_x64_to_tick, tick_to_sqrt_price_x64,
    tick_to_sqrt_price_x64_within,
};
pub use price::{
    PriceRange, execution_price, percent_change, percent_deviation, sqrt_price_x64_to_price,
    tick_range_to_price_range, tick_to_price, to_decimal_units,
};
