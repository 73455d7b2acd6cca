use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sqrtprice::SqrtPriceX96;

/// Token metadata needed to express prices and amounts in display units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub address:  Address,
    pub symbol:   String,
    pub decimals: u8
}

/// The fixed set of fee tiers a pool can be deployed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    Lowest,
    Low,
    Medium,
    High
}

impl FeeTier {
    /// Swap fee in hundredths of a bip.
    pub const fn fee(&self) -> u32 {
        match self {
            Self::Lowest => 100,
            Self::Low => 500,
            Self::Medium => 3000,
            Self::High => 10000
        }
    }

    /// Canonical tick spacing for this tier.
    pub const fn tick_spacing(&self) -> i32 {
        match self {
            Self::Lowest => 1,
            Self::Low => 10,
            Self::Medium => 60,
            Self::High => 200
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = UnknownFeeTier;

    fn try_from(pips: u32) -> Result<Self, UnknownFeeTier> {
        match pips {
            100 => Ok(Self::Lowest),
            500 => Ok(Self::Low),
            3000 => Ok(Self::Medium),
            10000 => Ok(Self::High),
            other => Err(UnknownFeeTier(other))
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown fee tier: {0} pips")]
pub struct UnknownFeeTier(pub u32);

/// Read-only view of a pool's state at the moment a depth computation runs.
/// Built by the data-fetching collaborator and never mutated here; one
/// snapshot feeds exactly one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub current_tick:   i32,
    /// Liquidity active at `current_tick`, uint128 range.
    pub liquidity:      u128,
    pub tick_spacing:   i32,
    pub fee_tier:       FeeTier,
    pub token0:         TokenMeta,
    pub token1:         TokenMeta,
    pub sqrt_price_x96: SqrtPriceX96
}

/// The caller's policy for the displayed prices on each bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthConfig {
    /// Report prices in the pool's own token units.
    pub use_native_units:    bool,
    /// Linear factor applied to displayed prices when native units are off.
    pub unit_rescale_factor: Option<f64>,
    /// Significant decimal digits retained before the float conversion.
    pub significant_digits:  u64
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self { use_native_units: true, unit_rescale_factor: None, significant_digits: 18 }
    }
}

impl DepthConfig {
    pub fn rescale(&self, price: f64) -> f64 {
        if self.use_native_units {
            return price;
        }
        self.unit_rescale_factor.map(|f| price * f).unwrap_or(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_tier_spacing_and_pips() {
        assert_eq!(FeeTier::Lowest.tick_spacing(), 1);
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.tick_spacing(), 200);

        assert_eq!(FeeTier::try_from(3000).unwrap(), FeeTier::Medium);
        assert_eq!(FeeTier::Medium.fee(), 3000);
        assert!(FeeTier::try_from(1234).is_err());
    }

    #[test]
    fn rescale_policy() {
        let native = DepthConfig::default();
        assert_eq!(native.rescale(2.5), 2.5);

        let rescaled = DepthConfig {
            use_native_units:    false,
            unit_rescale_factor: Some(3000.0),
            ..Default::default()
        };
        assert_eq!(rescaled.rescale(2.0), 6000.0);

        // No factor supplied falls back to pass-through.
        let missing_factor =
            DepthConfig { use_native_units: false, unit_rescale_factor: None, ..Default::default() };
        assert_eq!(missing_factor.rescale(2.0), 2.0);
    }
}
