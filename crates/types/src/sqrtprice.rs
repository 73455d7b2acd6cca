use std::ops::Deref;

use alloy_primitives::{U160, U256, Uint, aliases::U320};
use serde::{Deserialize, Serialize};
use uniswap_v3_math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};

/// A pool price expressed as `sqrt(token1/token0)` in Q96 fixed point, the
/// same representation the protocol stores on-chain.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SqrtPriceX96(U160);

impl SqrtPriceX96 {
    /// Produces the SqrtPriceX96 precisely at a given tick
    pub fn at_tick(tick: i32) -> eyre::Result<Self> {
        Ok(Self::from(get_sqrt_ratio_at_tick(tick)?))
    }

    /// Produces the maximum SqrtPriceX96 valid for a given tick before we
    /// step forward into the next tick
    pub fn max_at_tick(tick: i32) -> eyre::Result<Self> {
        Ok(Self::from(get_sqrt_ratio_at_tick(tick + 1)?.saturating_sub(U256::from(1))))
    }

    pub fn to_tick(&self) -> eyre::Result<i32> {
        Ok(get_tick_at_sqrt_ratio(U256::from(self.0))?)
    }

    /// Squares this value with no loss of precision, returning a U320 that
    /// contains PriceX192
    pub fn as_price_x192(&self) -> U320 {
        self.0.widening_mul(self.0)
    }
}

impl Deref for SqrtPriceX96 {
    type Target = U160;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SqrtPriceX96> for U256 {
    fn from(value: SqrtPriceX96) -> Self {
        Uint::from(value.0)
    }
}

impl From<U256> for SqrtPriceX96 {
    fn from(value: U256) -> Self {
        Self(Uint::from(value))
    }
}

impl From<U160> for SqrtPriceX96 {
    fn from(value: U160) -> Self {
        Self(value)
    }
}

impl From<SqrtPriceX96> for U160 {
    fn from(value: SqrtPriceX96) -> Self {
        value.0
    }
}
