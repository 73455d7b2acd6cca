use std::collections::HashMap;

use alloy_primitives::{I256, U256};
use depth_types::{PoolSnapshot, Tick, TickInfo};
use malachite::{
    Natural, Rational,
    num::{arithmetic::traits::Pow, conversion::traits::RoundingInto}
};
use serde::Serialize;
use thiserror::Error;
use uniswap_v3_math::{
    error::UniswapV3MathError,
    swap_math::compute_swap_step,
    tick_bitmap::{next_initialized_tick_within_one_word, position},
    tick_math::{MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio}
};

use super::walker::ProcessedTick;

/// Final chart record: one bucket of the depth window plus the token
/// reserves a swap would lock or unlock traversing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChartTick {
    pub tick_idx:                Tick,
    pub liquidity_active:        f64,
    pub liquidity_locked_token0: f64,
    pub liquidity_locked_token1: f64,
    pub price0:                  f64,
    pub price1:                  f64,
    pub is_current:              bool
}

#[derive(Error, Debug)]
pub enum SwapSimulationError {
    #[error(transparent)]
    UniswapV3MathError(#[from] UniswapV3MathError),
    #[error("liquidity underflow crossing tick")]
    LiquidityUnderflow,
    #[error("interval bound {0} outside the valid tick range")]
    IntervalOutOfRange(Tick),
    #[error("tick {0} is not aligned to spacing {1}")]
    MisalignedTick(Tick, i32)
}

/// Builds the chart records from the processed window.
///
/// Every bucket's reserves are estimated independently first; the output is
/// then assembled by pairing each record with the estimate of the bucket
/// above it, since the swap simulated at tick `i` traverses the interval
/// that precedes it. The last record keeps its own estimate.
pub fn attach_locked_amounts(pool: &PoolSnapshot, ticks: &[ProcessedTick]) -> Vec<BarChartTick> {
    let estimates: Vec<_> = ticks.iter().map(|t| estimate_locked(pool, t)).collect();

    ticks
        .iter()
        .enumerate()
        .map(|(i, tick)| {
            let (locked_token0, locked_token1) =
                estimates.get(i + 1).copied().unwrap_or(estimates[i]);

            BarChartTick {
                tick_idx:                tick.tick_idx,
                liquidity_active:        tick.liquidity_active as f64,
                liquidity_locked_token0: locked_token0,
                liquidity_locked_token1: locked_token1,
                price0:                  tick.price0,
                price1:                  tick.price1,
                is_current:              tick.is_current
            }
        })
        .collect()
}

/// Reserves implied by one bucket's active liquidity, recovered by swapping
/// the maximum token0 input across the interval ending at the bucket's tick.
/// Failures degrade to zero so a single bad bucket never aborts the batch.
fn estimate_locked(pool: &PoolSnapshot, tick: &ProcessedTick) -> (f64, f64) {
    match try_estimate(pool, tick) {
        Ok(amount1_out) => {
            let locked_token1 = token_amount_to_f64(amount1_out, pool.token1.decimals);
            (locked_token1 * tick.price1, locked_token1)
        }
        Err(err) => {
            tracing::warn!(tick = tick.tick_idx, %err, "locked reserve estimate degraded to zero");
            (0.0, 0.0)
        }
    }
}

fn try_estimate(pool: &PoolSnapshot, tick: &ProcessedTick) -> Result<U256, SwapSimulationError> {
    let sim = IntervalPool::for_tick(tick, pool.tick_spacing, pool.fee_tier.fee())?;
    let sqrt_price_limit_x96 = get_sqrt_ratio_at_tick(tick.tick_idx - pool.tick_spacing)?;
    sim.max_token0_swap_output(sqrt_price_limit_x96)
}

/// Ephemeral one-interval pool used for the reserve recovery. Its synthetic
/// tick table spans `[tick - spacing, tick]`, mirroring the real net at the
/// lower bound so a downward crossing restores it.
struct IntervalPool {
    sqrt_price:   U256,
    tick:         Tick,
    tick_spacing: i32,
    liquidity:    u128,
    fee:          u32,
    ticks:        HashMap<Tick, TickInfo>,
    tick_bitmap:  HashMap<i16, U256>
}

impl IntervalPool {
    fn for_tick(
        tick: &ProcessedTick,
        tick_spacing: i32,
        fee: u32
    ) -> Result<Self, SwapSimulationError> {
        let lower = tick.tick_idx - tick_spacing;
        if lower < MIN_TICK {
            return Err(SwapSimulationError::IntervalOutOfRange(lower));
        }
        if tick.tick_idx > MAX_TICK {
            return Err(SwapSimulationError::IntervalOutOfRange(tick.tick_idx));
        }
        // the bitmap grid only represents ticks on the spacing lattice; the
        // wrapped-to-maximum seed bucket can land off it
        if tick.tick_idx % tick_spacing != 0 {
            return Err(SwapSimulationError::MisalignedTick(tick.tick_idx, tick_spacing));
        }

        let gross = tick.liquidity_net.unsigned_abs();
        let mut ticks = HashMap::with_capacity(2);
        ticks.insert(
            lower,
            TickInfo {
                liquidity_gross: gross,
                liquidity_net:   -tick.liquidity_net,
                initialized:     true
            }
        );
        ticks.insert(
            tick.tick_idx,
            TickInfo {
                liquidity_gross: gross,
                liquidity_net:   tick.liquidity_net,
                initialized:     true
            }
        );

        let mut pool = Self {
            sqrt_price: get_sqrt_ratio_at_tick(tick.tick_idx)?,
            tick: tick.tick_idx,
            tick_spacing,
            liquidity: tick.liquidity_active,
            fee,
            ticks,
            tick_bitmap: HashMap::new()
        };
        pool.flip_tick(lower);
        pool.flip_tick(tick.tick_idx);
        Ok(pool)
    }

    fn flip_tick(&mut self, tick: Tick) {
        let (word_pos, bit_pos) = position(tick / self.tick_spacing);
        let mask = U256::from(1) << bit_pos;

        if let Some(word) = self.tick_bitmap.get_mut(&word_pos) {
            *word ^= mask;
        } else {
            self.tick_bitmap.insert(word_pos, mask);
        }
    }

    /// Swaps the maximum possible token0 input (exact in, price moving down)
    /// until `sqrt_price_limit_x96` is reached, returning the token1 output
    /// produced on the way. One-directional cut of a full swap simulation:
    /// direction and input amount are fixed by construction.
    fn max_token0_swap_output(
        &self,
        sqrt_price_limit_x96: U256
    ) -> Result<U256, SwapSimulationError> {
        let mut amount_specified_remaining = I256::from_raw(U256::from(u128::MAX));
        let mut amount_calculated = I256::ZERO;
        let mut sqrt_price_x_96 = self.sqrt_price;
        let mut tick = self.tick;
        let mut liquidity = self.liquidity;

        while amount_specified_remaining != I256::ZERO && sqrt_price_x_96 != sqrt_price_limit_x96 {
            let sqrt_price_start_x_96 = sqrt_price_x_96;
            let (tick_next, initialized) = next_initialized_tick_within_one_word(
                &self.tick_bitmap,
                tick,
                self.tick_spacing,
                true
            )?;

            let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
            let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next)?;

            let target_sqrt_ratio = if sqrt_price_next_x96 < sqrt_price_limit_x96 {
                sqrt_price_limit_x96
            } else {
                sqrt_price_next_x96
            };

            let (new_sqrt_price_x_96, amount_in, amount_out, fee_amount) = compute_swap_step(
                sqrt_price_x_96,
                target_sqrt_ratio,
                liquidity,
                amount_specified_remaining,
                self.fee
            )?;

            sqrt_price_x_96 = new_sqrt_price_x_96;
            amount_specified_remaining -= I256::from_raw(amount_in + fee_amount);
            amount_calculated -= I256::from_raw(amount_out);

            if sqrt_price_x_96 == sqrt_price_next_x96 {
                if initialized {
                    // price moving down: the upward-defined net reverses
                    let liquidity_net = self
                        .ticks
                        .get(&tick_next)
                        .map(|info| -info.liquidity_net)
                        .unwrap_or_default();

                    liquidity = if liquidity_net < 0 {
                        liquidity
                            .checked_sub(liquidity_net.unsigned_abs())
                            .ok_or(SwapSimulationError::LiquidityUnderflow)?
                    } else {
                        liquidity + liquidity_net.unsigned_abs()
                    };
                }

                tick = tick_next - 1;
            } else if sqrt_price_x_96 != sqrt_price_start_x_96 {
                tick = get_tick_at_sqrt_ratio(sqrt_price_x_96)?;
            }

            tracing::trace!(
                ?sqrt_price_x_96,
                ?amount_in,
                ?amount_out,
                ?fee_amount,
                tick_next,
                "swap step completed"
            );
        }

        Ok((-amount_calculated).into_raw())
    }
}

/// Converts a raw token amount into display units, flattening to a float
/// only after the exact decimal division.
fn token_amount_to_f64(amount: U256, decimals: u8) -> f64 {
    let value = Rational::from(Natural::from_limbs_asc(amount.as_limbs()))
        / Rational::from(10u32).pow(decimals as u64);
    let (value, _) = value.rounding_into(malachite::rounding_modes::RoundingMode::Floor);
    value
}

#[cfg(test)]
mod tests {
    use depth_types::{DepthConfig, FeeTier};
    use uniswap_v3_math::sqrt_price_math::_get_amount_1_delta;

    use super::*;
    use crate::depth::{
        test_utils::{pool_snapshot, setup_tracing, tick_entry},
        tick_index::TickIndex,
        walker
    };

    fn window_for(
        pool: &PoolSnapshot,
        entries: &[depth_types::TickData]
    ) -> Vec<ProcessedTick> {
        let index = TickIndex::from_data(entries).unwrap();
        walker::process_ticks(pool, &index, &DepthConfig::default())
    }

    #[test]
    fn locked_amounts_shift_backward_one_bucket() {
        setup_tracing();
        let liquidity = 1_000_000_000_000_u128;
        let pool = pool_snapshot(0, liquidity, FeeTier::Medium);
        let entries = vec![
            tick_entry(-60, 500_000_000_000, 500_000_000_000),
            tick_entry(60, 500_000_000_000, -500_000_000_000),
        ];
        let window = window_for(&pool, &entries);
        let bars = attach_locked_amounts(&pool, &window);

        assert_eq!(bars.len(), 3);
        // The last two records both carry the raw estimate of the final
        // bucket's interval; the first record carries the middle one's.
        assert_eq!(
            bars[1].liquidity_locked_token1, bars[2].liquidity_locked_token1,
            "second-to-last must receive the last bucket's raw estimate"
        );
        assert!(bars[0].liquidity_locked_token1 > 0.0);
        assert_ne!(bars[0].liquidity_locked_token1, bars[1].liquidity_locked_token1);

        // The middle bucket's own interval [-60, 0] holds the full active
        // liquidity, which pins the first record's shifted value exactly.
        let sqrt_lower = get_sqrt_ratio_at_tick(-60).unwrap();
        let sqrt_upper = get_sqrt_ratio_at_tick(0).unwrap();
        let expected =
            _get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, false).unwrap();
        let expected = token_amount_to_f64(expected, pool.token1.decimals);
        let got = bars[0].liquidity_locked_token1;
        assert!((got - expected).abs() <= expected * 1e-9, "got {got}, expected {expected}");
    }

    #[test]
    fn locked_token0_is_token1_amount_at_display_price() {
        setup_tracing();
        let pool = pool_snapshot(0, 1_000_000_000_000, FeeTier::Medium);
        let window = window_for(&pool, &[tick_entry(-60, 1, 0), tick_entry(60, 1, 0)]);
        let bars = attach_locked_amounts(&pool, &window);

        for (bar, next) in bars.iter().zip(bars.iter().skip(1)) {
            // each record's token0 side is the shifted token1 amount repriced
            // at the *next* bucket's price1 (where the estimate was made)
            let expected = bar.liquidity_locked_token1 * next.price1;
            assert!((bar.liquidity_locked_token0 - expected).abs() <= expected * 1e-12);
        }
    }

    #[test]
    fn crossing_underflow_degrades_to_zero() {
        setup_tracing();
        // The seed tick claims a net far larger than the pool's liquidity;
        // crossing it in the simulation underflows and the estimate must
        // degrade to zero instead of failing the batch.
        let pool = pool_snapshot(0, 500, FeeTier::Medium);
        let window =
            window_for(&pool, &[tick_entry(-60, 100, 100), tick_entry(0, 2_000_000, 2_000_000)]);
        let bars = attach_locked_amounts(&pool, &window);

        let last = bars.last().unwrap();
        assert!(last.is_current);
        assert_eq!(last.liquidity_locked_token0, 0.0);
        assert_eq!(last.liquidity_locked_token1, 0.0);
    }

    #[test]
    fn interval_below_protocol_range_degrades_to_zero() {
        setup_tracing();
        let pool = pool_snapshot(MIN_TICK + 5, 1_000_000, FeeTier::Low);
        let window = window_for(&pool, &[tick_entry(-887270, 10, 10)]);
        let bars = attach_locked_amounts(&pool, &window);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].tick_idx, -887270);
        assert_eq!(bars[0].liquidity_locked_token0, 0.0);
        assert_eq!(bars[0].liquidity_locked_token1, 0.0);
    }

    #[test]
    fn zero_liquidity_interval_locks_nothing() {
        setup_tracing();
        let pool = pool_snapshot(0, 0, FeeTier::Medium);
        let window = window_for(&pool, &[tick_entry(-60, 1, 0), tick_entry(60, 1, 0)]);
        let bars = attach_locked_amounts(&pool, &window);

        assert!(bars.iter().all(|b| b.liquidity_locked_token1 == 0.0));
        assert!(bars.iter().all(|b| b.liquidity_locked_token0 == 0.0));
    }
}
