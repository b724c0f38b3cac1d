//! Core library for the clmm-pool-inspector project.
//!
//! `clmm` holds the fixed-point math and the liquidity curve, `analysis`
//! walks that curve to simulate swaps, and `stats` summarizes the position
//! set. The remaining modules load snapshots and wire everything together
//! for the binary (`main.rs`).

pub mod aggregator;
pub mod analysis;
pub mod clmm;
pub mod config;
pub mod errors;
pub mod models;
pub mod snapshot;
pub mod stats;
pub mod utils;
