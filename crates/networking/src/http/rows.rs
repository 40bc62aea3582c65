//! Wire rows as the REST backend stores them (snake_case columns)

use ascend_core::{Character, Gift, GiftId, GiftPatch, GiftStatus, Rarity, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProfileRow {
    #[serde(default)]
    pub character: Option<Character>,
    #[serde(default)]
    pub is_onboarded: bool,
}

/// Upsert body for the `profiles` table; `None` fields are omitted so the
/// backend keeps their stored values
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProfileUpsert<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<&'a Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_onboarded: Option<bool>,
}

/// Row of the `gifts` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GiftRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level_required: u32,
    pub status: GiftStatus,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
}

impl From<GiftRow> for Gift {
    fn from(row: GiftRow) -> Self {
        Gift {
            id: GiftId::new(row.id),
            owner_id: UserId::new(row.user_id),
            name: row.name,
            description: row.description,
            level_required: row.level_required.max(1),
            status: row.status,
            rarity: row.rarity,
            icon: row.icon,
            created_at: row.created_at,
            used_at: row.used_at,
        }
    }
}

impl From<&Gift> for GiftRow {
    fn from(gift: &Gift) -> Self {
        GiftRow {
            id: gift.id.0.clone(),
            user_id: gift.owner_id.0.clone(),
            name: gift.name.clone(),
            description: gift.description.clone(),
            level_required: gift.level_required,
            status: gift.status,
            rarity: gift.rarity,
            icon: gift.icon.clone(),
            created_at: gift.created_at,
            used_at: gift.used_at,
        }
    }
}

/// PATCH body for a gift row
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GiftRowPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GiftStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
    /// `Some(None)` clears the column (sent as `null`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<Option<DateTime<Utc>>>,
}

impl<'a> From<&'a GiftPatch> for GiftRowPatch<'a> {
    fn from(patch: &'a GiftPatch) -> Self {
        GiftRowPatch {
            name: patch.name.as_deref(),
            description: patch.description.as_deref(),
            level_required: patch.level_required.map(|level| level.max(1)),
            status: patch.status,
            rarity: patch.rarity,
            icon: patch.icon.as_deref(),
            used_at: match patch.status {
                Some(status) if status != GiftStatus::Used => Some(None),
                _ => patch.used_at.map(Some),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::GiftDraft;

    #[test]
    fn test_gift_row_uses_snake_case_columns() {
        let gift = Gift::from_draft(UserId::new("u1"), GiftDraft::new("Tea", 2));
        let json = serde_json::to_value(GiftRow::from(&gift)).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["level_required"], 2);
        assert_eq!(json["status"], "locked");
    }

    #[test]
    fn test_patch_omits_unset_columns() {
        let patch = GiftPatch::status(GiftStatus::Used);
        let json = serde_json::to_string(&GiftRowPatch::from(&patch)).unwrap();
        assert_eq!(json, r#"{"status":"used"}"#);
    }

    #[test]
    fn test_patch_leaving_used_nulls_used_at() {
        let patch = GiftPatch::status(GiftStatus::Unlocked);
        let json = serde_json::to_string(&GiftRowPatch::from(&patch)).unwrap();
        assert_eq!(json, r#"{"status":"unlocked","used_at":null}"#);
    }

    #[test]
    fn test_profile_row_tolerates_null_character() {
        let row: ProfileRow =
            serde_json::from_str(r#"{"character":null,"is_onboarded":true}"#).unwrap();
        assert!(row.character.is_none());
        assert!(row.is_onboarded);
    }
}
