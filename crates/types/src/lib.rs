//! Data model shared across the depth engine: the pool snapshot and tick
//! records handed over by the data-fetching collaborator, the numeric
//! newtypes they carry, and the input-validation error taxonomy.

pub mod error;
pub mod pool;
pub mod sqrtprice;
pub mod tick;

pub use error::DepthError;
pub use pool::{DepthConfig, FeeTier, PoolSnapshot, TokenMeta, UnknownFeeTier};
pub use sqrtprice::SqrtPriceX96;
pub use tick::{Tick, TickData, TickInfo};
