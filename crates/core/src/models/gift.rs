//! Gift (reward inventory) models

use crate::types::{GiftId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status. Normal flow only moves forward: locked → unlocked → used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GiftStatus {
    #[default]
    Locked,
    Unlocked,
    Used,
}

impl GiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftStatus::Locked => "locked",
            GiftStatus::Unlocked => "unlocked",
            GiftStatus::Used => "used",
        }
    }
}

impl fmt::Display for GiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(GiftStatus::Locked),
            "unlocked" => Ok(GiftStatus::Unlocked),
            "used" => Ok(GiftStatus::Used),
            other => Err(crate::Error::InvalidData(format!("Unknown gift status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Icon used when a gift is authored without one
    pub fn default_icon(&self) -> &'static str {
        match self {
            Rarity::Common => "🎁",
            Rarity::Rare => "💎",
            Rarity::Epic => "🔮",
            Rarity::Legendary => "👑",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(crate::Error::InvalidData(format!("Unknown rarity '{}'", other))),
        }
    }
}

/// A reward owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: GiftId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level_required: u32,
    #[serde(default)]
    pub status: GiftStatus,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
}

impl Gift {
    /// Build a new gift from an authoring draft. Status defaults to locked.
    pub fn from_draft(owner_id: UserId, draft: GiftDraft) -> Self {
        let icon = draft
            .icon
            .filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| draft.rarity.default_icon().to_string());

        Gift {
            id: GiftId::generate(),
            owner_id,
            name: draft.name,
            description: draft.description,
            level_required: draft.level_required.max(1),
            status: draft.status.unwrap_or_default(),
            rarity: draft.rarity,
            icon,
            created_at: Utc::now(),
            used_at: None,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &GiftPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(level_required) = patch.level_required {
            self.level_required = level_required.max(1);
        }
        if let Some(status) = patch.status {
            self.status = status;
            if status != GiftStatus::Used {
                self.used_at = None;
            }
        }
        if let Some(rarity) = patch.rarity {
            self.rarity = rarity;
        }
        if let Some(ref icon) = patch.icon {
            self.icon = icon.clone();
        }
        if let Some(used_at) = patch.used_at {
            if self.status == GiftStatus::Used {
                self.used_at = Some(used_at);
            }
        }
    }

    /// Whether a character at `level` meets the gate
    pub fn is_eligible_at(&self, level: u32) -> bool {
        level >= self.level_required
    }
}

/// Authoring input for a new gift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level_required: u32,
    #[serde(default)]
    pub status: Option<GiftStatus>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: Option<String>,
}

impl GiftDraft {
    pub fn new(name: impl Into<String>, level_required: u32) -> Self {
        GiftDraft {
            name: name.into(),
            description: String::new(),
            level_required,
            status: None,
            rarity: Rarity::Common,
            icon: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: GiftStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }
}

/// Partial update for a gift. Status may be set to anything (edit override).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GiftStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl GiftPatch {
    pub fn status(status: GiftStatus) -> Self {
        GiftPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GiftPatch::default()
    }
}
