//! Concentrated-liquidity positions

use crate::common::errors::ValidationError;
use crate::common::identifiers::PoolId;
use serde::{Deserialize, Serialize};

/// Liquidity provided over `[tick_lower, tick_upper)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub pool_id: PoolId,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    pub fn new(
        pool_id: PoolId,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<Self, ValidationError> {
        if tick_lower >= tick_upper {
            return Err(ValidationError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        Ok(Self {
            pool_id,
            tick_lower,
            tick_upper,
            liquidity,
        })
    }

    /// Whether the position earns fees at `current_tick`
    pub fn is_active_at(&self, current_tick: i32) -> bool {
        self.liquidity > 0 && self.tick_lower <= current_tick && current_tick < self.tick_upper
    }
}
