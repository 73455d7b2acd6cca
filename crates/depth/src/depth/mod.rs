//! The depth pipeline: index the supplied ticks, locate the active bucket,
//! walk the window outward in both directions, then recover the reserves
//! locked in each bucket's interval by simulated swap.

use depth_types::{DepthConfig, DepthError, PoolSnapshot, TickData};

pub mod locked;
pub mod price;
pub mod tick_index;
pub mod walker;

pub use locked::BarChartTick;
pub use walker::ProcessedTick;

use tick_index::TickIndex;

/// Computes the bar-chart records for one pool snapshot and its tick set.
///
/// Pure batch transformation: one call, one snapshot in, one ascending
/// record list out. Malformed numeric input and an empty tick set abort;
/// everything else degrades per bucket.
pub fn build_depth_chart(
    pool: &PoolSnapshot,
    ticks: &[TickData],
    config: &DepthConfig
) -> Result<Vec<BarChartTick>, DepthError> {
    let index = TickIndex::from_data(ticks)?;
    tracing::trace!(
        ticks = index.len(),
        min_tick = index.min_tick(),
        max_tick = index.max_tick(),
        "built tick index"
    );

    let window = walker::process_ticks(pool, &index, config);
    tracing::trace!(buckets = window.len(), "walked liquidity window");

    Ok(locked::attach_locked_amounts(pool, &window))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::Once;

    use alloy_primitives::Address;
    use depth_types::{FeeTier, PoolSnapshot, SqrtPriceX96, TickData, TokenMeta};
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    pub fn setup_tracing() {
        INIT.call_once(|| {
            let _ = fmt()
                .with_env_filter(
                    EnvFilter::from_default_env()
                        .add_directive("liquidity_depth=debug".parse().unwrap())
                        .add_directive("test=debug".parse().unwrap())
                )
                .try_init();
        });
    }

    pub fn pool_snapshot(current_tick: i32, liquidity: u128, fee_tier: FeeTier) -> PoolSnapshot {
        PoolSnapshot {
            current_tick,
            liquidity,
            tick_spacing: fee_tier.tick_spacing(),
            fee_tier,
            token0: TokenMeta {
                address:  Address::from_slice(&[1u8; 20]),
                symbol:   "WETH".to_string(),
                decimals: 18
            },
            token1: TokenMeta {
                address:  Address::from_slice(&[2u8; 20]),
                symbol:   "USDC".to_string(),
                decimals: 18
            },
            sqrt_price_x96: SqrtPriceX96::at_tick(current_tick).unwrap()
        }
    }

    pub fn tick_entry(tick: i32, gross: u128, net: i128) -> TickData {
        TickData {
            tick_idx:        tick.to_string(),
            liquidity_gross: gross.to_string(),
            liquidity_net:   net.to_string()
        }
    }
}
