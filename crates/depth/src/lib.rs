//! Per-tick liquidity distribution for a concentrated-liquidity pool: given
//! one pool snapshot and its initialized ticks, derive the bar-chart records
//! (active liquidity, locked reserves, display prices) for a window of tick
//! buckets around the current price.

pub mod depth;

pub use depth::{
    BarChartTick, ProcessedTick, build_depth_chart, locked::SwapSimulationError,
    tick_index::TickIndex
};
