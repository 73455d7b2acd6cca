use depth_types::{DepthConfig, SqrtPriceX96, Tick, TokenMeta};
use malachite::{
    Natural, Rational,
    num::{
        arithmetic::traits::{Pow, PowerOf2, Reciprocal},
        conversion::{string::options::ToSciOptions, traits::ToSci}
    }
};

/// Display prices at a tick boundary under both token orderings.
///
/// The geometric-grid price at tick `t` is carried as the exact Q192 ratio
/// from the canonical sqrt-price table (never as a float power), scaled for
/// the token decimals, rounded to the configured number of significant
/// decimal digits, and only then flattened to `f64` for the chart.
pub fn tick_prices(
    tick: Tick,
    token0: &TokenMeta,
    token1: &TokenMeta,
    config: &DepthConfig
) -> (f64, f64) {
    let Ok(sqrt_price) = SqrtPriceX96::at_tick(tick) else {
        tracing::warn!(tick, "tick outside the representable price range");
        return (0.0, 0.0);
    };

    let ratio_x192 = Natural::from_limbs_asc(sqrt_price.as_price_x192().as_limbs());
    let raw = Rational::from(ratio_x192) / Rational::from(Natural::power_of_2(192u64));

    let shift = token0.decimals as i64 - token1.decimals as i64;
    let price0 = raw * Rational::from(10u32).pow(shift);
    let price1 = (&price0).reciprocal();

    (
        config.rescale(to_significant_f64(&price0, config.significant_digits)),
        config.rescale(to_significant_f64(&price1, config.significant_digits))
    )
}

/// Rounds to `digits` significant decimal digits before converting to a
/// float, the display precision the chart is rendered at.
fn to_significant_f64(value: &Rational, digits: u64) -> f64 {
    let mut options = ToSciOptions::default();
    options.set_precision(digits.max(1));

    value
        .to_sci_with_options(options)
        .to_string()
        .parse()
        .unwrap_or_default()
}
