use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DepthError;

pub type Tick = i32;

/// Parsed record for one initialized tick. `liquidity_net` is the signed
/// change in active liquidity when the price crosses this tick moving up;
/// `liquidity_gross` is the total liquidity referencing the tick regardless
/// of direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    pub liquidity_gross: u128,
    pub liquidity_net:   i128,
    pub initialized:     bool
}

/// Wire form of one tick as delivered by the indexing collaborator. Every
/// numeric field arrives string-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickData {
    pub tick_idx:        String,
    pub liquidity_gross: String,
    pub liquidity_net:   String
}

impl TickData {
    pub fn parse(&self) -> Result<(Tick, TickInfo), DepthError> {
        let tick_idx = parse_field("tickIdx", &self.tick_idx)?;
        let liquidity_gross = parse_field("liquidityGross", &self.liquidity_gross)?;
        let liquidity_net = parse_field("liquidityNet", &self.liquidity_net)?;

        Ok((tick_idx, TickInfo { liquidity_gross, liquidity_net, initialized: true }))
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, DepthError> {
    value
        .trim()
        .parse()
        .map_err(|_| DepthError::MalformedNumericInput(field, value.to_string()))
}
