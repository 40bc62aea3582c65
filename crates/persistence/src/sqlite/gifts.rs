//! Gift CRUD operations

use ascend_core::{Error, Gift, GiftId, GiftPatch, Result, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Database row for a gift
#[derive(Debug, sqlx::FromRow)]
struct GiftRow {
    id: String,
    owner_id: String,
    name: String,
    description: String,
    level_required: i64,
    status: String,
    rarity: String,
    icon: String,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl TryFrom<GiftRow> for Gift {
    type Error = Error;

    fn try_from(row: GiftRow) -> Result<Self> {
        Ok(Gift {
            id: GiftId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            name: row.name,
            description: row.description,
            level_required: u32::try_from(row.level_required.max(1)).unwrap_or(u32::MAX),
            status: row.status.parse()?,
            rarity: row.rarity.parse()?,
            icon: row.icon,
            created_at: row.created_at,
            used_at: row.used_at,
        })
    }
}

/// Insert a gift row
pub async fn insert_gift(pool: &SqlitePool, gift: &Gift) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO gifts (id, owner_id, name, description, level_required, status, rarity, icon, created_at, used_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(gift.id.as_str())
    .bind(gift.owner_id.as_str())
    .bind(&gift.name)
    .bind(&gift.description)
    .bind(i64::from(gift.level_required))
    .bind(gift.status.as_str())
    .bind(gift.rarity.as_str())
    .bind(&gift.icon)
    .bind(gift.created_at)
    .bind(gift.used_at)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Get a specific gift by ID
pub async fn get_gift(pool: &SqlitePool, id: &GiftId) -> Result<Option<Gift>> {
    let row: Option<GiftRow> = sqlx::query_as(
        r#"
        SELECT id, owner_id, name, description, level_required, status, rarity, icon, created_at, used_at
        FROM gifts
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(Gift::try_from).transpose()
}

/// List all gifts owned by a user
pub async fn list_gifts(pool: &SqlitePool, owner_id: &UserId) -> Result<Vec<Gift>> {
    let rows: Vec<GiftRow> = sqlx::query_as(
        r#"
        SELECT id, owner_id, name, description, level_required, status, rarity, icon, created_at, used_at
        FROM gifts
        WHERE owner_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(owner_id.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(Gift::try_from).collect()
}

/// Apply a partial update and return the stored gift
pub async fn update_gift(pool: &SqlitePool, id: &GiftId, patch: &GiftPatch) -> Result<Gift> {
    let mut gift = get_gift(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("gift {}", id)))?;
    gift.apply(patch);

    sqlx::query(
        r#"
        UPDATE gifts
        SET name = ?, description = ?, level_required = ?, status = ?, rarity = ?, icon = ?, used_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&gift.name)
    .bind(&gift.description)
    .bind(i64::from(gift.level_required))
    .bind(gift.status.as_str())
    .bind(gift.rarity.as_str())
    .bind(&gift.icon)
    .bind(gift.used_at)
    .bind(id.as_str())
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(gift)
}

/// Delete a gift. Returns `NotFound` when no row matched.
pub async fn delete_gift(pool: &SqlitePool, id: &GiftId) -> Result<()> {
    let result = sqlx::query("DELETE FROM gifts WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("gift {}", id)));
    }

    Ok(())
}
