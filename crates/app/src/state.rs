//! Application state shared by the runner and its command handlers

use anyhow::Result;
use ascend_core::{
    AccountStore, Character, EngineConfig, ExperienceGain, GenerationContext, Gift, StreakClaim,
    UserId,
};
use ascend_engine::{GiftManager, MysteryOutcome, ProgressionSync, RewardGateway, StreakTracker};
use ascend_networking::GeneratorClient;
use ascend_persistence::{Database, SqliteScalarStore};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Engine components wired around one account store
pub struct AppState<S: AccountStore + 'static> {
    pub user_id: UserId,
    pub config: EngineConfig,
    pub db: Database,
    pub gifts: Arc<GiftManager<S>>,
    pub sync: ProgressionSync<S>,
    pub streak: Mutex<StreakTracker<SqliteScalarStore>>,
    /// `None` without a generation backend
    pub rewards: Option<RewardGateway<GeneratorClient, S>>,
}

impl<S: AccountStore + 'static> AppState<S> {
    pub async fn new(
        user_id: UserId,
        db: Database,
        store: Arc<S>,
        generator: Option<GeneratorClient>,
    ) -> Result<Self> {
        let config = ascend_persistence::sqlite::load_engine_config(db.pool()).await;
        let streak =
            StreakTracker::load(SqliteScalarStore::new(db.clone()), Local::now().date_naive())
                .await?;

        let gifts = Arc::new(GiftManager::new(store.clone()));
        let rewards = generator.map(|g| RewardGateway::new(Arc::new(g), gifts.clone()));
        let sync = ProgressionSync::new(store, &config);

        Ok(Self {
            user_id,
            config,
            db,
            gifts,
            sync,
            streak: Mutex::new(streak),
            rewards,
        })
    }

    /// Sign in, hydrate gifts, claim the daily streak and unlock what the
    /// current level allows
    pub async fn start_session(&self) -> Result<()> {
        if let Some(record) = self.sync.sign_in(self.user_id.clone()).await? {
            self.gifts.hydrate(&self.user_id, record.gifts).await;
        }

        if let Err(e) = self.claim_streak().await {
            warn!("Daily streak not claimed: {}", e);
        }

        let level = self.sync.character().await.level;
        self.gifts.unlock_eligible(&self.user_id, level).await?;
        Ok(())
    }

    /// Claim today's streak and grant the configured bonus XP
    pub async fn claim_streak(&self) -> Result<StreakClaim> {
        let claim = {
            let mut streak = self.streak.lock().await;
            streak.refresh(Local::now().date_naive());
            streak.claim_today().await?
        };

        if self.config.streak_bonus_xp > 0 {
            self.grant_experience(self.config.streak_bonus_xp).await;
        }
        Ok(claim)
    }

    /// Grant XP through the synchronizer and unlock newly reachable gifts.
    /// A failed unlock is logged; the XP stays granted and the next level-up
    /// or session start retries it.
    pub async fn grant_experience(&self, amount: u64) -> ExperienceGain {
        let gain = self.sync.grant_experience(amount).await;
        if gain.leveled_up() {
            info!("Level up: {} -> {}", gain.previous_level, gain.new_level);
            if let Err(e) = self
                .gifts
                .unlock_eligible(&self.user_id, gain.new_level)
                .await
            {
                warn!("Gift unlock after level {} failed: {}", gain.new_level, e);
            }
        }
        gain
    }

    pub async fn character(&self) -> Character {
        self.sync.character().await
    }

    pub async fn gifts(&self) -> Vec<Gift> {
        let mut gifts = self.gifts.list_for_user(&self.user_id).await;
        gifts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        gifts
    }

    pub async fn open_mystery_reward(&self) -> Result<MysteryOutcome> {
        let Some(rewards) = &self.rewards else {
            return Ok(MysteryOutcome::GenerationUnavailable(
                "no generation backend configured".to_string(),
            ));
        };

        let character = self.sync.character().await;
        let context = GenerationContext {
            level: character.level,
            energy: character.energy,
            ..Default::default()
        };
        Ok(rewards.open_mystery_reward(&self.user_id, &context).await?)
    }

    /// Persist pending progression before exit
    pub async fn shutdown(&self) {
        if let Err(e) = self.sync.flush().await {
            warn!("Final progression save failed: {}", e);
        }
        info!("Session closed for {}", self.user_id);
    }
}
