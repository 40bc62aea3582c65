//! Account record operations (character JSON + onboarding flag)

use ascend_core::{AccountPatch, Character, Error, Result, UserId};
use sqlx::SqlitePool;

/// Database row for an account
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    character: Option<String>,
    is_onboarded: i32,
}

/// Stored character and onboarding flag for a user, if the account exists
pub async fn get_account(
    pool: &SqlitePool,
    user_id: &UserId,
) -> Result<Option<(Option<Character>, bool)>> {
    let row: Option<AccountRow> = sqlx::query_as(
        r#"
        SELECT character, is_onboarded
        FROM accounts
        WHERE user_id = ?
        "#,
    )
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    match row {
        Some(row) => {
            let character = row
                .character
                .as_deref()
                .map(|json| serde_json::from_str::<Character>(json))
                .transpose()?;
            Ok(Some((character, row.is_onboarded != 0)))
        }
        None => Ok(None),
    }
}

/// Upsert the fields present in `patch`; absent fields keep their stored value
pub async fn save_account(pool: &SqlitePool, user_id: &UserId, patch: &AccountPatch) -> Result<()> {
    let character_json = patch
        .character
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let onboarded = patch.is_onboarded.map(i32::from);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    sqlx::query("INSERT OR IGNORE INTO accounts (user_id) VALUES (?)")
        .bind(user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    sqlx::query(
        r#"
        UPDATE accounts
        SET character = COALESCE(?, character),
            is_onboarded = COALESCE(?, is_onboarded),
            updated_at = CURRENT_TIMESTAMP
        WHERE user_id = ?
        "#,
    )
    .bind(character_json)
    .bind(onboarded)
    .bind(user_id.as_str())
    .execute(&mut *tx)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::Database;
    use ascend_core::CharacterClass;

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(get_account(db.pool(), &UserId::new("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_save_keeps_other_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = UserId::new("u1");
        let mut character = Character::new(CharacterClass::Ranger, 100);
        character.gain_experience(120);

        save_account(db.pool(), &user, &AccountPatch::from_character(&character))
            .await
            .unwrap();

        let onboard_only = AccountPatch {
            character: None,
            is_onboarded: Some(true),
        };
        save_account(db.pool(), &user, &onboard_only).await.unwrap();

        let (stored, onboarded) = get_account(db.pool(), &user).await.unwrap().unwrap();
        assert!(onboarded);
        let stored = stored.unwrap();
        assert_eq!(stored.experience, 120);
        assert_eq!(stored.level, 2);
        assert_eq!(stored.character_class, CharacterClass::Ranger);
    }
}
