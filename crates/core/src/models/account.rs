//! Remote account record shapes

use super::{Character, Gift};
use serde::{Deserialize, Serialize};

/// Everything the remote store keeps for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(default)]
    pub character: Option<Character>,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub gifts: Vec<Gift>,
}

/// Partial write of the user's record; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_onboarded: Option<bool>,
}

impl AccountPatch {
    /// Patch carrying the full character and its onboarding flag
    pub fn from_character(character: &Character) -> Self {
        AccountPatch {
            character: Some(character.clone()),
            is_onboarded: Some(character.is_onboarded),
        }
    }
}
