//! Key/value settings table: durable scalars and engine config

use super::Database;
use ascend_core::{EngineConfig, Error, Result, ScalarStore};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;

const ENGINE_CONFIG_KEY: &str = "engine_config";

/// Read a single setting
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))
}

/// Insert or overwrite a single setting
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Load the persisted engine config, falling back to defaults when absent or unreadable
pub async fn load_engine_config(pool: &SqlitePool) -> EngineConfig {
    let json = match get_setting(pool, ENGINE_CONFIG_KEY).await {
        Ok(Some(json)) => json,
        Ok(None) => return EngineConfig::default(),
        Err(e) => {
            warn!("Failed to read engine config: {}", e);
            return EngineConfig::default();
        }
    };

    serde_json::from_str(&json).unwrap_or_else(|e| {
        warn!("Stored engine config is invalid ({}), using defaults", e);
        EngineConfig::default()
    })
}

/// Persist the engine config
pub async fn save_engine_config(pool: &SqlitePool, config: &EngineConfig) -> Result<()> {
    let json = serde_json::to_string(config)?;
    set_setting(pool, ENGINE_CONFIG_KEY, &json).await
}

/// `ScalarStore` backed by the settings table.
///
/// Each `set` is a single-row upsert, so a value written under one key is
/// replaced atomically.
#[derive(Clone)]
pub struct SqliteScalarStore {
    db: Database,
}

impl SqliteScalarStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScalarStore for SqliteScalarStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        get_setting(self.db.pool(), key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        set_setting(self.db.pool(), key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scalar_store_roundtrip_and_overwrite() {
        let db = Database::connect_in_memory().await.unwrap();
        let store = SqliteScalarStore::new(db);

        assert_eq!(store.get("streak").await.unwrap(), None);
        store.set("streak", "1").await.unwrap();
        store.set("streak", "2").await.unwrap();
        assert_eq!(store.get("streak").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_engine_config_defaults_then_persisted() {
        let db = Database::connect_in_memory().await.unwrap();
        assert_eq!(load_engine_config(db.pool()).await, EngineConfig::default());

        let config = EngineConfig {
            debounce_ms: 400,
            ..EngineConfig::default()
        };
        save_engine_config(db.pool(), &config).await.unwrap();
        assert_eq!(load_engine_config(db.pool()).await.debounce_ms, 400);
    }

    #[tokio::test]
    async fn test_corrupt_engine_config_falls_back() {
        let db = Database::connect_in_memory().await.unwrap();
        set_setting(db.pool(), ENGINE_CONFIG_KEY, "not json").await.unwrap();
        assert_eq!(load_engine_config(db.pool()).await, EngineConfig::default());
    }
}
