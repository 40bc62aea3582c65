//! SQLite-backed `AccountStore` for offline runs
//!
//! Mirrors the remote account store contract on top of the local
//! `accounts` and `gifts` tables.

use crate::sqlite::{self, Database};
use ascend_core::{
    AccountPatch, AccountRecord, AccountStore, Error, Gift, GiftId, GiftPatch, Result, UserId,
};
use async_trait::async_trait;
use tracing::debug;

#[derive(Clone)]
pub struct LocalAccountStore {
    db: Database,
}

impl LocalAccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for LocalAccountStore {
    async fn load(&self, user_id: &UserId) -> Result<AccountRecord> {
        let pool = self.db.pool();
        let (character, is_onboarded) = sqlite::get_account(pool, user_id)
            .await?
            .unwrap_or((None, false));
        let gifts = sqlite::list_gifts(pool, user_id).await?;

        debug!("Loaded local account {} ({} gifts)", user_id, gifts.len());
        Ok(AccountRecord {
            character,
            is_onboarded,
            gifts,
        })
    }

    async fn save(&self, user_id: &UserId, patch: &AccountPatch) -> Result<()> {
        sqlite::save_account(self.db.pool(), user_id, patch).await
    }

    async fn create_gift(&self, user_id: &UserId, gift: &Gift) -> Result<Gift> {
        if &gift.owner_id != user_id {
            return Err(Error::InvalidData(format!(
                "gift owner {} does not match {}",
                gift.owner_id, user_id
            )));
        }
        sqlite::insert_gift(self.db.pool(), gift).await?;
        Ok(gift.clone())
    }

    async fn update_gift(&self, gift_id: &GiftId, patch: &GiftPatch) -> Result<Gift> {
        sqlite::update_gift(self.db.pool(), gift_id, patch).await
    }

    async fn delete_gift(&self, gift_id: &GiftId) -> Result<()> {
        sqlite::delete_gift(self.db.pool(), gift_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{Character, GiftDraft};

    #[tokio::test]
    async fn test_unknown_user_loads_default_record() {
        let store = LocalAccountStore::new(Database::connect_in_memory().await.unwrap());
        let record = store.load(&UserId::new("new-user")).await.unwrap();
        assert_eq!(record, AccountRecord::default());
    }

    #[tokio::test]
    async fn test_record_includes_character_and_gifts() {
        let store = LocalAccountStore::new(Database::connect_in_memory().await.unwrap());
        let user = UserId::new("u1");
        let mut character = Character::default();
        character.is_onboarded = true;
        store
            .save(&user, &AccountPatch::from_character(&character))
            .await
            .unwrap();
        let gift = Gift::from_draft(user.clone(), GiftDraft::new("Hike", 2));
        store.create_gift(&user, &gift).await.unwrap();

        let record = store.load(&user).await.unwrap();
        assert!(record.is_onboarded);
        assert_eq!(record.character, Some(character));
        assert_eq!(record.gifts.len(), 1);
        assert_eq!(record.gifts[0].id, gift.id);
        assert_eq!(record.gifts[0].name, "Hike");
    }

    #[tokio::test]
    async fn test_create_gift_rejects_foreign_owner() {
        let store = LocalAccountStore::new(Database::connect_in_memory().await.unwrap());
        let gift = Gift::from_draft(UserId::new("someone-else"), GiftDraft::new("X", 1));
        let err = store.create_gift(&UserId::new("u1"), &gift).await.unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
