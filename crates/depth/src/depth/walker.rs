use depth_types::{DepthConfig, PoolSnapshot, Tick};
use uniswap_v3_math::tick_math::{MAX_TICK, MIN_TICK};

use super::{price, tick_index::TickIndex};

/// One bucket of the depth window: the liquidity usable for swaps while the
/// price is inside it, plus the display prices at its boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTick {
    pub tick_idx:         Tick,
    pub liquidity_active: u128,
    pub liquidity_net:    i128,
    pub price0:           f64,
    pub price1:           f64,
    pub is_current:       bool
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum WalkDirection {
    Ascending,
    Descending
}

/// The tick-spacing-aligned bucket containing the pool's current price.
/// A result at or below the protocol minimum snaps to the protocol maximum,
/// mirroring the upstream fallback for that edge.
pub fn active_tick_index(current_tick: Tick, tick_spacing: i32) -> Tick {
    let aligned = current_tick.div_euclid(tick_spacing) * tick_spacing;
    if aligned <= MIN_TICK { MAX_TICK } else { aligned }
}

/// The full depth window: the descending walk (reversed), the active bucket,
/// then the ascending walk, as one strictly ascending sequence containing
/// exactly one current tick.
pub fn process_ticks(
    pool: &PoolSnapshot,
    index: &TickIndex,
    config: &DepthConfig
) -> Vec<ProcessedTick> {
    let seed = seed_tick(pool, index, config);
    let ascending = walk(pool, index, &seed, config, WalkDirection::Ascending);

    let mut window = walk(pool, index, &seed, config, WalkDirection::Descending);
    window.reverse();
    window.push(seed);
    window.extend(ascending);
    window
}

fn seed_tick(pool: &PoolSnapshot, index: &TickIndex, config: &DepthConfig) -> ProcessedTick {
    let tick_idx = active_tick_index(pool.current_tick, pool.tick_spacing);
    let (price0, price1) = price::tick_prices(tick_idx, &pool.token0, &pool.token1, config);

    ProcessedTick {
        tick_idx,
        liquidity_active: pool.liquidity,
        liquidity_net: index.liquidity_net(tick_idx),
        price0,
        price1,
        is_current: true
    }
}

/// Walks up to `index.len()` buckets away from the seed, one tick spacing at
/// a time, accumulating signed liquidity deltas. The walk ends early the
/// moment the next index would leave the bounds of the supplied tick set.
///
/// `liquidity_net` is defined as the delta applied when the price crosses a
/// tick moving up, so the two directions are asymmetric: an ascending step
/// applies the net of the tick it arrives at, while a descending step
/// reverses the net of the tick it just left. A tick's own net is therefore
/// not applied on the way down until the step below it.
fn walk(
    pool: &PoolSnapshot,
    index: &TickIndex,
    seed: &ProcessedTick,
    config: &DepthConfig,
    direction: WalkDirection
) -> Vec<ProcessedTick> {
    let num_steps = index.len();
    let mut out = Vec::with_capacity(num_steps);
    let mut previous = seed.clone();

    for _ in 0..num_steps {
        let tick_idx = match direction {
            WalkDirection::Ascending => previous.tick_idx + pool.tick_spacing,
            WalkDirection::Descending => previous.tick_idx - pool.tick_spacing
        };
        if !index.in_bounds(tick_idx) {
            break;
        }

        let liquidity_net = index.liquidity_net(tick_idx);
        let liquidity_active = match direction {
            WalkDirection::Ascending if index.contains(tick_idx) => {
                apply_net(previous.liquidity_active, liquidity_net)
            }
            WalkDirection::Descending if previous.liquidity_net != 0 => {
                reverse_net(previous.liquidity_active, previous.liquidity_net)
            }
            _ => previous.liquidity_active
        };

        let (price0, price1) = price::tick_prices(tick_idx, &pool.token0, &pool.token1, config);
        let current = ProcessedTick {
            tick_idx,
            liquidity_active,
            liquidity_net,
            price0,
            price1,
            is_current: false
        };
        out.push(current.clone());
        previous = current;
    }

    out
}

/// Adds a signed net to the running liquidity. Valid inputs never drive the
/// running value negative; if they do, clamp at zero and keep walking.
fn apply_net(liquidity: u128, net: i128) -> u128 {
    if net < 0 {
        liquidity.checked_sub(net.unsigned_abs()).unwrap_or_else(|| {
            tracing::warn!(liquidity, net, "active liquidity underflow, clamping to zero");
            0
        })
    } else {
        liquidity.saturating_add(net.unsigned_abs())
    }
}

/// Removes a previously-applied signed net from the running liquidity.
fn reverse_net(liquidity: u128, net: i128) -> u128 {
    if net < 0 {
        liquidity.saturating_add(net.unsigned_abs())
    } else {
        liquidity.checked_sub(net.unsigned_abs()).unwrap_or_else(|| {
            tracing::warn!(liquidity, net, "active liquidity underflow, clamping to zero");
            0
        })
    }
}
