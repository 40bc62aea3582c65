//! Daily streak tracker
//!
//! Keeps the streak record in memory, derives `can_claim_today`, and writes
//! the record back to the durable scalar store as one JSON value so the
//! count and the last claim date always change together.

use ascend_core::{Error, Result, ScalarStore, StreakClaim, StreakRecord};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

/// Settings key holding the serialized `StreakRecord`
pub const STREAK_RECORD_KEY: &str = "streak_record";

pub struct StreakTracker<S: ScalarStore> {
    store: S,
    record: StreakRecord,
    can_claim_today: bool,
}

impl<S: ScalarStore> StreakTracker<S> {
    /// Restore the record from the store and evaluate claimability for `today`.
    /// An unreadable stored value starts a fresh record.
    pub async fn load(store: S, today: NaiveDate) -> Result<Self> {
        let record = match store.get(STREAK_RECORD_KEY).await? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Stored streak record is invalid ({}), starting fresh", e);
                StreakRecord::default()
            }),
            None => StreakRecord::default(),
        };

        debug!(
            "Streak loaded: count={}, last_claim={:?}",
            record.streak_count, record.last_claim_date
        );

        Ok(Self {
            store,
            can_claim_today: record.can_claim_on(today),
            record,
        })
    }

    pub fn record(&self) -> StreakRecord {
        self.record
    }

    pub fn can_claim_today(&self) -> bool {
        self.can_claim_today
    }

    /// Re-evaluate claimability after the calendar day changed
    pub fn refresh(&mut self, today: NaiveDate) {
        self.can_claim_today = self.record.can_claim_on(today);
    }

    /// Streak as displayed on `today` (0 once the chain is already broken)
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        self.record.effective_streak(today)
    }

    /// Claim for `today`.
    ///
    /// Fails with `InvalidState` if already claimed today, leaving the record
    /// unchanged. If the write fails the in-memory record is unchanged too.
    pub async fn claim(&mut self, today: NaiveDate) -> Result<StreakClaim> {
        if !self.can_claim_today {
            return Err(Error::InvalidState(format!(
                "streak already claimed for {}",
                today
            )));
        }

        let mut next = self.record;
        let Some(claim) = next.claim(today) else {
            self.can_claim_today = false;
            return Err(Error::InvalidState(format!(
                "streak already claimed for {}",
                today
            )));
        };

        let json = serde_json::to_string(&next)?;
        self.store
            .set(STREAK_RECORD_KEY, &json)
            .await
            .map_err(Error::into_persistence)?;

        self.record = next;
        self.can_claim_today = false;

        info!(
            "Daily streak claimed: {} day(s) ({:?})",
            claim.streak_count, claim.change
        );
        Ok(claim)
    }

    /// Claim using the local calendar date
    pub async fn claim_today(&mut self) -> Result<StreakClaim> {
        self.claim(Local::now().date_naive()).await
    }
}
