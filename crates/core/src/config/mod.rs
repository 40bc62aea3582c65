//! Engine tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configurable engine behaviour.
/// Persisted as JSON in the local settings table and restored on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Quiescence window before a character save is issued (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// XP granted by the caller after a successful daily streak claim
    #[serde(default = "default_streak_bonus_xp")]
    pub streak_bonus_xp: u64,
    /// Energy pool size for newly created characters
    #[serde(default = "default_energy_max")]
    pub default_energy_max: u32,
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_streak_bonus_xp() -> u64 {
    25
}

fn default_energy_max() -> u32 {
    100
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            streak_bonus_xp: default_streak_bonus_xp(),
            default_energy_max: default_energy_max(),
        }
    }
}
