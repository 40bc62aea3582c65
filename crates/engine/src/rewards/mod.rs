//! Mystery reward gateway
//!
//! Asks the generation engine for reward candidates, draws one uniformly at
//! random and turns it into an unlocked gift. Only one generation may be in
//! flight at a time; overlapping requests are rejected, never queued.

use crate::gifts::GiftManager;
use ascend_core::{
    AccountStore, Error, GenerationContext, Gift, GiftDraft, GiftStatus, Result, RewardCandidate,
    RewardGenerator, UserId,
};
use rand::Rng;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Outcome of opening a mystery reward
#[derive(Debug, Clone, PartialEq)]
pub enum MysteryOutcome {
    /// A gift was generated and stored (already unlocked)
    Opened(Gift),
    /// The engine answered but had nothing to offer
    EmptyChest,
    /// The engine failed; shown to the user as "try again later"
    GenerationUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Pending,
}

/// Resets the gateway to `Idle` when the request finishes or is dropped
struct PendingGuard<'a> {
    state: &'a Mutex<GenerationState>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            *state = GenerationState::Idle;
        }
    }
}

pub struct RewardGateway<G: RewardGenerator, A: AccountStore> {
    generator: Arc<G>,
    gifts: Arc<GiftManager<A>>,
    state: Mutex<GenerationState>,
}

impl<G: RewardGenerator, A: AccountStore> RewardGateway<G, A> {
    pub fn new(generator: Arc<G>, gifts: Arc<GiftManager<A>>) -> Self {
        Self {
            generator,
            gifts,
            state: Mutex::new(GenerationState::Idle),
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(GenerationState::Idle)
    }

    fn begin(&self) -> Result<PendingGuard<'_>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::InvalidState("generation state poisoned".to_string()))?;
        if *state == GenerationState::Pending {
            return Err(Error::InvalidState(
                "a mystery reward is already being generated".to_string(),
            ));
        }
        *state = GenerationState::Pending;
        Ok(PendingGuard { state: &self.state })
    }

    /// Open one mystery reward for `owner_id`. A single attempt per call.
    ///
    /// Errors: `InvalidState` when another request is pending,
    /// `PersistenceFailure` when the drawn gift could not be stored.
    pub async fn open_mystery_reward(
        &self,
        owner_id: &UserId,
        context: &GenerationContext,
    ) -> Result<MysteryOutcome> {
        let _pending = self.begin()?;
        debug!("Requesting mystery reward for {} at level {}", owner_id, context.level);

        let mut candidates = match self.generator.generate(context).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Reward generation unavailable: {}", e);
                return Ok(MysteryOutcome::GenerationUnavailable(e.to_string()));
            }
        };

        if candidates.is_empty() {
            info!("Mystery chest for {} was empty", owner_id);
            return Ok(MysteryOutcome::EmptyChest);
        }

        let pick = rand::thread_rng().gen_range(0..candidates.len());
        let candidate = candidates.swap_remove(pick);
        let gift = self
            .gifts
            .create(owner_id, Self::draft_from(candidate, context))
            .await?;

        info!("Mystery reward opened: '{}' ({})", gift.name, gift.rarity);
        Ok(MysteryOutcome::Opened(gift))
    }

    fn draft_from(candidate: RewardCandidate, context: &GenerationContext) -> GiftDraft {
        GiftDraft::new(candidate.name, context.level.max(1))
            .with_description(candidate.description)
            .with_rarity(candidate.rarity)
            .with_status(GiftStatus::Unlocked)
    }
}
