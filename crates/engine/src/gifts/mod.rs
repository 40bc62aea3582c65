//! Gift lifecycle manager
//!
//! Owns create/update/delete/claim for a user's gifts. Every write goes to
//! the account store first; the in-memory index is only updated after the
//! store accepted it.

use ascend_core::{
    AccountStore, Error, Gift, GiftDraft, GiftId, GiftPatch, GiftStatus, Result, UserId,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle notifications for the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "gift", rename_all = "camelCase")]
pub enum GiftEvent {
    Created(Gift),
    Updated(Gift),
    Deleted(GiftId),
    /// Level gate reached; gift became usable
    Unlocked(Gift),
    /// Gift redeemed; drives the celebration cue
    Claimed(Gift),
}

pub struct GiftManager<A: AccountStore> {
    store: Arc<A>,
    gifts: RwLock<HashMap<GiftId, Gift>>,
    events: broadcast::Sender<GiftEvent>,
}

impl<A: AccountStore> GiftManager<A> {
    pub fn new(store: Arc<A>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            gifts: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GiftEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: GiftEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Replace the index entries owned by `owner_id` with `gifts`
    pub async fn hydrate(&self, owner_id: &UserId, gifts: Vec<Gift>) {
        let mut index = self.gifts.write().await;
        index.retain(|_, g| &g.owner_id != owner_id);
        for gift in gifts {
            index.insert(gift.id.clone(), gift);
        }
        debug!("Gift index hydrated for {} ({} total)", owner_id, index.len());
    }

    /// Reload a user's gifts from the store
    pub async fn refresh(&self, owner_id: &UserId) -> Result<Vec<Gift>> {
        let record = self
            .store
            .load(owner_id)
            .await
            .map_err(Error::into_persistence)?;
        self.hydrate(owner_id, record.gifts.clone()).await;
        Ok(record.gifts)
    }

    /// Author a new gift. Status defaults to locked unless the draft sets one.
    pub async fn create(&self, owner_id: &UserId, draft: GiftDraft) -> Result<Gift> {
        let gift = Gift::from_draft(owner_id.clone(), draft);
        let stored = self
            .store
            .create_gift(owner_id, &gift)
            .await
            .map_err(Error::into_persistence)?;

        self.gifts
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());

        info!("Gift created: {} '{}' ({})", stored.id, stored.name, stored.status);
        self.emit(GiftEvent::Created(stored.clone()));
        Ok(stored)
    }

    /// Partial update, including direct status override
    pub async fn update(&self, gift_id: &GiftId, patch: GiftPatch) -> Result<Gift> {
        let updated = self
            .store
            .update_gift(gift_id, &patch)
            .await
            .map_err(Error::into_persistence)?;

        self.gifts
            .write()
            .await
            .insert(updated.id.clone(), updated.clone());

        debug!("Gift updated: {}", gift_id);
        self.emit(GiftEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// Remove a gift; unknown ids are `NotFound`
    pub async fn delete(&self, gift_id: &GiftId) -> Result<()> {
        self.store
            .delete_gift(gift_id)
            .await
            .map_err(Error::into_persistence)?;

        self.gifts.write().await.remove(gift_id);

        info!("Gift deleted: {}", gift_id);
        self.emit(GiftEvent::Deleted(gift_id.clone()));
        Ok(())
    }

    /// Redeem an unlocked gift (unlocked → used, stamps `used_at`)
    pub async fn claim(&self, gift_id: &GiftId) -> Result<Gift> {
        // Held across the store write so two claims of one gift cannot both pass the check
        let mut index = self.gifts.write().await;
        let current = index
            .get(gift_id)
            .ok_or_else(|| Error::NotFound(format!("gift {}", gift_id)))?;

        match current.status {
            GiftStatus::Unlocked => {}
            GiftStatus::Locked => {
                return Err(Error::InvalidState(format!(
                    "gift {} is locked (requires level {})",
                    gift_id, current.level_required
                )));
            }
            GiftStatus::Used => {
                return Err(Error::InvalidState(format!(
                    "gift {} was already used",
                    gift_id
                )));
            }
        }

        let patch = GiftPatch {
            status: Some(GiftStatus::Used),
            used_at: Some(Utc::now()),
            ..Default::default()
        };
        let claimed = self
            .store
            .update_gift(gift_id, &patch)
            .await
            .map_err(Error::into_persistence)?;

        index.insert(claimed.id.clone(), claimed.clone());
        drop(index);

        info!("🎉 Gift claimed: '{}' ({})", claimed.name, claimed.rarity);
        self.emit(GiftEvent::Claimed(claimed.clone()));
        Ok(claimed)
    }

    /// All gifts for a user, in no particular order
    pub async fn list_for_user(&self, owner_id: &UserId) -> Vec<Gift> {
        self.gifts
            .read()
            .await
            .values()
            .filter(|g| &g.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub async fn get(&self, gift_id: &GiftId) -> Option<Gift> {
        self.gifts.read().await.get(gift_id).cloned()
    }

    /// Unlock every locked gift whose level gate is met at `level`
    pub async fn unlock_eligible(&self, owner_id: &UserId, level: u32) -> Result<Vec<Gift>> {
        let candidates: Vec<GiftId> = self
            .gifts
            .read()
            .await
            .values()
            .filter(|g| &g.owner_id == owner_id)
            .filter(|g| g.status == GiftStatus::Locked && g.is_eligible_at(level))
            .map(|g| g.id.clone())
            .collect();

        let mut unlocked = Vec::with_capacity(candidates.len());
        for gift_id in candidates {
            let gift = match self
                .store
                .update_gift(&gift_id, &GiftPatch::status(GiftStatus::Unlocked))
                .await
            {
                Ok(gift) => gift,
                Err(e) => {
                    warn!("Failed to unlock gift {}: {}", gift_id, e);
                    return Err(e.into_persistence());
                }
            };

            self.gifts.write().await.insert(gift.id.clone(), gift.clone());
            info!("Gift unlocked at level {}: '{}'", level, gift.name);
            self.emit(GiftEvent::Unlocked(gift.clone()));
            unlocked.push(gift);
        }

        Ok(unlocked)
    }
}
