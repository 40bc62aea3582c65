//! Interfaces to the external collaborators
//!
//! The engine only talks to the remote account store, the reward generation
//! engine, and the local scalar store through these traits. Transport is the
//! implementor's concern.

use crate::{
    AccountPatch, AccountRecord, GenerationContext, Gift, GiftId, GiftPatch, Result,
    RewardCandidate, UserId,
};
use async_trait::async_trait;

/// Remote per-user record plus gift rows
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch the user's record. A user with no stored record yields the default record.
    async fn load(&self, user_id: &UserId) -> Result<AccountRecord>;

    /// Write the given fields of the user's record (last write wins)
    async fn save(&self, user_id: &UserId, patch: &AccountPatch) -> Result<()>;

    /// Insert a fully built gift and return the stored row
    async fn create_gift(&self, user_id: &UserId, gift: &Gift) -> Result<Gift>;

    /// Apply a partial update; `NotFound` for unknown ids
    async fn update_gift(&self, gift_id: &GiftId, patch: &GiftPatch) -> Result<Gift>;

    /// Remove a gift; `NotFound` for unknown ids
    async fn delete_gift(&self, gift_id: &GiftId) -> Result<()>;
}

/// External reward generation engine
#[async_trait]
pub trait RewardGenerator: Send + Sync {
    async fn generate(&self, context: &GenerationContext) -> Result<Vec<RewardCandidate>>;
}

/// Durable local key/value store for small scalars
#[async_trait]
pub trait ScalarStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
