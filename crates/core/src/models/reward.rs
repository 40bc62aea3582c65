//! Reward generation models (candidates and context)

use super::Rarity;
use crate::types::Energy;
use serde::{Deserialize, Serialize};

/// A reward proposed by the generation engine. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCandidate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
}

/// Character context handed to the generation engine; opaque to the engine core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub level: u32,
    #[serde(default)]
    pub energy: Energy,
    #[serde(default)]
    pub active_goals: Vec<String>,
    #[serde(default)]
    pub recent_activity: Vec<String>,
}

/// Response body from the generation endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub rewards: Vec<RewardCandidate>,
}
