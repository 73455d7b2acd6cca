use std::collections::HashMap;

use depth_types::{DepthError, Tick, TickData, TickInfo};
use itertools::Itertools;

/// Sparse lookup over the initialized ticks supplied for one computation.
/// The window bounds come from the extremes of the supplied set, not from
/// the protocol's theoretical tick range.
#[derive(Debug, Clone)]
pub struct TickIndex {
    ticks:    HashMap<Tick, TickInfo>,
    min_tick: Tick,
    max_tick: Tick
}

impl TickIndex {
    /// Parses and indexes the wire ticks. The first malformed field aborts
    /// the batch. Duplicate indices are not expected from the data source;
    /// on collision the last entry wins.
    pub fn from_data(data: &[TickData]) -> Result<Self, DepthError> {
        let mut ticks = HashMap::with_capacity(data.len());
        for entry in data {
            let (tick, info) = entry.parse()?;
            ticks.insert(tick, info);
        }

        let Some((min_tick, max_tick)) = ticks.keys().copied().minmax().into_option() else {
            return Err(DepthError::EmptyTickSet);
        };

        Ok(Self { ticks, min_tick, max_tick })
    }

    pub fn get(&self, tick: Tick) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Signed liquidity delta crossing up through `tick`, zero when the tick
    /// is not initialized.
    pub fn liquidity_net(&self, tick: Tick) -> i128 {
        self.ticks
            .get(&tick)
            .map(|info| info.liquidity_net)
            .unwrap_or_default()
    }

    pub fn contains(&self, tick: Tick) -> bool {
        self.ticks.contains_key(&tick)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn min_tick(&self) -> Tick {
        self.min_tick
    }

    pub fn max_tick(&self) -> Tick {
        self.max_tick
    }

    pub fn in_bounds(&self, tick: Tick) -> bool {
        (self.min_tick..=self.max_tick).contains(&tick)
    }
}
