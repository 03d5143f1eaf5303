use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

use crate::error::{Result, SimError};

/// Run parameters for the tick scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cycles handed to the core per tick
    pub cycles_per_tick: u64,
    pub clock_hz: u64,
    /// Digital pins read after each batch, starting at D0
    pub digital_pins: u8,
    /// Delay between ticks; 0 only yields to the runtime
    pub tick_interval_ms: u64,
    pub board: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles_per_tick: 500_000,
            clock_hz: 16_000_000,
            digital_pins: 14,
            tick_interval_ms: 0,
            board: "uno".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|source| SimError::Json {
            path: path.to_string(),
            source,
        })?;
        info!(path, cycles_per_tick = config.cycles_per_tick, "loaded simulation config");
        Ok(config)
    }

    /// Simulated time covered by one tick, in microseconds.
    pub fn tick_micros(&self) -> u64 {
        if self.clock_hz == 0 {
            return 0;
        }
        self.cycles_per_tick.saturating_mul(1_000_000) / self.clock_hz
    }
}
