//! Progression synchronizer
//!
//! Loads the signed-in user's record once, then mirrors local character
//! changes back to the account store through a debounced save.
//!
//! Phases: `Idle → Loading → Synced`, with `Saving` reported while a write
//! is in flight. Saves are never issued while `Loading`, and load/save never
//! overlap: both run under the same I/O lock, always taken before the state
//! lock.

use ascend_core::{
    AccountPatch, AccountRecord, AccountStore, Character, CharacterClass, EngineConfig, Error,
    Result, UserId,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Loading(UserId),
    Synced(UserId),
    /// Synced with at least one write in flight
    Saving(UserId),
}

/// Observability sink for sync activity
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    Loaded { user_id: UserId, is_onboarded: bool },
    LoadFailed { user_id: UserId, error: String },
    Saved { user_id: UserId },
    SaveFailed { user_id: UserId, error: String },
    Onboarded { user_id: UserId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Session {
    Idle,
    Loading(UserId),
    Synced(UserId),
}

struct SyncState {
    session: Session,
    character: Character,
    /// Last character known to be stored remotely
    persisted: Option<Character>,
    /// Armed debounce timer (cleared once its save starts)
    pending: Option<JoinHandle<()>>,
    /// Bumped whenever a scheduled save is superseded
    epoch: u64,
    saves_in_flight: u32,
    /// Character creation save in flight
    creating: bool,
}

impl SyncState {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn synced_user(&self) -> Option<&UserId> {
        match &self.session {
            Session::Synced(user) => Some(user),
            _ => None,
        }
    }
}

/// Handle to the synchronizer; clones share the same session
pub struct ProgressionSync<S: AccountStore + 'static> {
    store: Arc<S>,
    state: Arc<Mutex<SyncState>>,
    io: Arc<Mutex<()>>,
    debounce: Duration,
    energy_max: u32,
    events: broadcast::Sender<SyncEvent>,
}

impl<S: AccountStore + 'static> Clone for ProgressionSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            state: self.state.clone(),
            io: self.io.clone(),
            debounce: self.debounce,
            energy_max: self.energy_max,
            events: self.events.clone(),
        }
    }
}

impl<S: AccountStore + 'static> ProgressionSync<S> {
    pub fn new(store: Arc<S>, config: &EngineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            state: Arc::new(Mutex::new(SyncState {
                session: Session::Idle,
                character: Character::new(CharacterClass::default(), config.default_energy_max),
                persisted: None,
                pending: None,
                epoch: 0,
                saves_in_flight: 0,
                creating: false,
            })),
            io: Arc::new(Mutex::new(())),
            debounce: config.debounce(),
            energy_max: config.default_energy_max,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.events.send(event);
    }

    fn blank_character(&self) -> Character {
        Character::new(CharacterClass::default(), self.energy_max)
    }

    pub async fn phase(&self) -> SyncPhase {
        let state = self.state.lock().await;
        match &state.session {
            Session::Idle => SyncPhase::Idle,
            Session::Loading(user) => SyncPhase::Loading(user.clone()),
            Session::Synced(user) if state.saves_in_flight > 0 => SyncPhase::Saving(user.clone()),
            Session::Synced(user) => SyncPhase::Synced(user.clone()),
        }
    }

    /// Snapshot of the local character
    pub async fn character(&self) -> Character {
        self.state.lock().await.character.clone()
    }

    pub async fn is_onboarded(&self) -> bool {
        self.state.lock().await.character.is_onboarded
    }

    /// Whether local state has changes the store has not acknowledged
    pub async fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock().await;
        state.synced_user().is_some() && state.persisted.as_ref() != Some(&state.character)
    }

    /// Load the user's record and enter `Synced`.
    ///
    /// Returns `Ok(None)` when this user is already loading or synced.
    /// Switching from another synced user first saves that user's unsaved
    /// changes (best effort). A load failure returns the session to `Idle`
    /// with `PersistenceFailure`.
    pub async fn sign_in(&self, user_id: UserId) -> Result<Option<AccountRecord>> {
        let previous = {
            let mut state = self.state.lock().await;
            let previous = match &state.session {
                Session::Loading(current) | Session::Synced(current) if *current == user_id => {
                    debug!("Sign-in for {} ignored, session already active", user_id);
                    return Ok(None);
                }
                Session::Synced(current) if state.persisted.as_ref() != Some(&state.character) => {
                    Some((current.clone(), state.character.clone()))
                }
                _ => None,
            };
            state.cancel_pending();
            state.session = Session::Loading(user_id.clone());
            state.character = self.blank_character();
            state.persisted = None;
            previous
        };
        info!("Loading progression for {}", user_id);

        let loaded = {
            let _io = self.io.lock().await;
            if let Some((previous_user, snapshot)) = previous {
                info!("Saving progression for {} before switching users", previous_user);
                if let Err(e) = self.save_locked(&previous_user, snapshot).await {
                    warn!("Save before switching from {} failed: {}", previous_user, e);
                }
            }
            self.store.load(&user_id).await
        };

        let mut state = self.state.lock().await;
        if state.session != Session::Loading(user_id.clone()) {
            warn!("Session changed while loading {}, discarding result", user_id);
            return Err(Error::InvalidState(format!(
                "session for {} ended during load",
                user_id
            )));
        }

        match loaded {
            Ok(record) => {
                let mut character = record
                    .character
                    .clone()
                    .unwrap_or_else(|| self.blank_character());
                character.is_onboarded = record.is_onboarded;

                state.character = character.clone();
                state.persisted = Some(character);
                state.session = Session::Synced(user_id.clone());
                drop(state);

                info!(
                    "Progression synced for {} (onboarded: {}, gifts: {})",
                    user_id,
                    record.is_onboarded,
                    record.gifts.len()
                );
                self.emit(SyncEvent::Loaded {
                    user_id,
                    is_onboarded: record.is_onboarded,
                });
                Ok(Some(record))
            }
            Err(e) => {
                state.session = Session::Idle;
                drop(state);

                error!("Failed to load progression for {}: {}", user_id, e);
                self.emit(SyncEvent::LoadFailed {
                    user_id,
                    error: e.to_string(),
                });
                Err(e.into_persistence())
            }
        }
    }

    /// Flush unsaved changes (best effort) and return to `Idle`
    pub async fn sign_out(&self) {
        if let Err(e) = self.flush().await {
            warn!("Final save before sign-out failed: {}", e);
        }

        let mut state = self.state.lock().await;
        state.cancel_pending();
        state.session = Session::Idle;
        state.character = self.blank_character();
        state.persisted = None;
        info!("Signed out, progression state cleared");
    }

    /// Mutate the local character. When synced and a persisted field changed,
    /// the debounced save is (re)armed; while loading or idle nothing is saved.
    ///
    /// Creation wins: while `create_character` is saving, mutations run
    /// against a scratch copy and are discarded.
    pub async fn update_character<R>(&self, mutate: impl FnOnce(&mut Character) -> R) -> R {
        let mut state = self.state.lock().await;
        if state.creating {
            let mut scratch = state.character.clone();
            warn!("Character change discarded, creation in progress");
            return mutate(&mut scratch);
        }

        let before = state.character.clone();
        let out = mutate(&mut state.character);

        if !state.character.sync_fields_differ(&before) {
            return out;
        }

        match state.session.clone() {
            Session::Synced(user) => self.schedule_save(&mut state, user),
            Session::Loading(user) => {
                debug!("Save suppressed for {}: record still loading", user);
            }
            Session::Idle => {
                debug!("Save suppressed: no signed-in user");
            }
        }
        out
    }

    /// Grant XP through the synchronizer; returns the level change
    pub async fn grant_experience(&self, amount: u64) -> ascend_core::ExperienceGain {
        self.update_character(|c| c.gain_experience(amount)).await
    }

    /// Cancel the armed timer and start a new one for the latest state
    fn schedule_save(&self, state: &mut SyncState, user: UserId) {
        state.cancel_pending();
        let epoch = state.epoch;
        let this = self.clone();
        debug!("Save for {} scheduled in {:?}", user, self.debounce);

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(this.debounce).await;
            this.run_scheduled_save(user, epoch).await;
        }));
    }

    async fn run_scheduled_save(&self, user: UserId, epoch: u64) {
        let _io = self.io.lock().await;
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.epoch != epoch || state.synced_user() != Some(&user) {
                return;
            }
            // From here on the save must not be aborted
            state.pending = None;
            state.character.clone()
        };

        // Failures are already reported to the event sink
        let _ = self.save_locked(&user, snapshot).await;
    }

    /// Persist `snapshot`. Caller holds the I/O lock.
    async fn save_locked(&self, user: &UserId, snapshot: Character) -> Result<()> {
        self.state.lock().await.saves_in_flight += 1;
        let result = self
            .store
            .save(user, &AccountPatch::from_character(&snapshot))
            .await;

        let mut state = self.state.lock().await;
        state.saves_in_flight = state.saves_in_flight.saturating_sub(1);

        match result {
            Ok(()) => {
                if state.synced_user() == Some(user) {
                    state.persisted = Some(snapshot);
                }
                drop(state);
                debug!("Progression saved for {}", user);
                self.emit(SyncEvent::Saved {
                    user_id: user.clone(),
                });
                Ok(())
            }
            Err(e) => {
                drop(state);
                // Local state stays authoritative; the next mutation retries
                error!("Progression save failed for {}: {}", user, e);
                self.emit(SyncEvent::SaveFailed {
                    user_id: user.clone(),
                    error: e.to_string(),
                });
                Err(e.into_persistence())
            }
        }
    }

    /// Save unsaved changes now instead of waiting for the debounce
    pub async fn flush(&self) -> Result<()> {
        let _io = self.io.lock().await;
        let (user, snapshot) = {
            let mut state = self.state.lock().await;
            let Some(user) = state.synced_user().cloned() else {
                return Ok(());
            };
            state.cancel_pending();
            if state.persisted.as_ref() == Some(&state.character) {
                return Ok(());
            }
            (user, state.character.clone())
        };

        self.save_locked(&user, snapshot).await
    }

    /// Create the character and mark the user onboarded with an immediate save.
    ///
    /// The onboarding flag only becomes visible locally after the store
    /// accepted the write; on failure local state is untouched.
    pub async fn create_character(&self, character_class: CharacterClass) -> Result<Character> {
        let _io = self.io.lock().await;
        let (user, character) = {
            let mut state = self.state.lock().await;
            let Some(user) = state.synced_user().cloned() else {
                return Err(Error::InvalidState(
                    "character creation requires a synced session".to_string(),
                ));
            };
            state.cancel_pending();
            state.creating = true;

            let mut character = Character::new(character_class, self.energy_max);
            character.is_onboarded = true;
            (user, character)
        };

        self.state.lock().await.saves_in_flight += 1;
        let result = self
            .store
            .save(&user, &AccountPatch::from_character(&character))
            .await;

        let mut state = self.state.lock().await;
        state.saves_in_flight = state.saves_in_flight.saturating_sub(1);
        state.creating = false;

        match result {
            Ok(()) => {
                if state.synced_user() == Some(&user) {
                    state.character = character.clone();
                    state.persisted = Some(character.clone());
                }
                drop(state);
                info!("Character created for {} ({:?})", user, character_class);
                self.emit(SyncEvent::Onboarded { user_id: user });
                Ok(character)
            }
            Err(e) => {
                drop(state);
                error!("Character creation failed for {}: {}", user, e);
                Err(e.into_persistence())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{Gift, GiftId, GiftPatch};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockStore {
        record: std::sync::Mutex<AccountRecord>,
        saves: std::sync::Mutex<Vec<(UserId, AccountPatch)>>,
        loads: AtomicUsize,
        load_gate: Option<Arc<Notify>>,
        save_gate: Option<Arc<Notify>>,
        fail_load: AtomicBool,
        fail_save: AtomicBool,
    }

    impl MockStore {
        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }

        fn last_saved(&self) -> Option<Character> {
            self.saves
                .lock()
                .unwrap()
                .last()
                .and_then(|(_, patch)| patch.character.clone())
        }
    }

    #[async_trait]
    impl AccountStore for MockStore {
        async fn load(&self, _user_id: &UserId) -> Result<AccountRecord> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.load_gate {
                gate.notified().await;
            }
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(Error::NetworkError("timeout".to_string()));
            }
            Ok(self.record.lock().unwrap().clone())
        }

        async fn save(&self, user_id: &UserId, patch: &AccountPatch) -> Result<()> {
            if let Some(gate) = &self.save_gate {
                gate.notified().await;
            }
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(Error::ApiError("HTTP 500".to_string()));
            }
            self.saves
                .lock()
                .unwrap()
                .push((user_id.clone(), patch.clone()));
            Ok(())
        }

        async fn create_gift(&self, _user_id: &UserId, gift: &Gift) -> Result<Gift> {
            Ok(gift.clone())
        }

        async fn update_gift(&self, gift_id: &GiftId, _patch: &GiftPatch) -> Result<Gift> {
            Err(Error::NotFound(gift_id.to_string()))
        }

        async fn delete_gift(&self, gift_id: &GiftId) -> Result<()> {
            Err(Error::NotFound(gift_id.to_string()))
        }
    }

    fn user() -> UserId {
        UserId::new("user-1")
    }

    fn stored_record(level: u32, experience: u64) -> AccountRecord {
        AccountRecord {
            character: Some(Character {
                level,
                experience,
                ..Character::default()
            }),
            is_onboarded: true,
            gifts: vec![],
        }
    }

    fn sync_with(store: MockStore) -> (ProgressionSync<MockStore>, Arc<MockStore>) {
        let store = Arc::new(store);
        (ProgressionSync::new(store.clone(), &EngineConfig::default()), store)
    }

    async fn settle() {
        // Past the 1s debounce window; paused clock auto-advances
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_populates_state_without_saving() {
        let store = MockStore {
            record: std::sync::Mutex::new(stored_record(3, 450)),
            ..Default::default()
        };
        let (sync, store) = sync_with(store);

        let record = sync.sign_in(user()).await.unwrap();
        assert!(record.is_some());
        assert_eq!(sync.phase().await, SyncPhase::Synced(user()));

        let character = sync.character().await;
        assert_eq!(character.level, 3);
        assert_eq!(character.experience, 450);
        assert!(character.is_onboarded);

        settle().await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_sign_in_is_ignored() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();
        assert!(sync.sign_in(user()).await.unwrap().is_none());
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_while_loading_does_not_save() {
        let gate = Arc::new(Notify::new());
        let (sync, store) = sync_with(MockStore {
            record: std::sync::Mutex::new(stored_record(2, 150)),
            load_gate: Some(gate.clone()),
            ..Default::default()
        });

        let loading = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.sign_in(user()).await })
        };
        while sync.phase().await != SyncPhase::Loading(user()) {
            tokio::task::yield_now().await;
        }

        sync.update_character(|c| {
            c.gain_experience(999);
        })
        .await;
        settle().await;
        assert_eq!(store.save_count(), 0);

        gate.notify_one();
        loading.await.unwrap().unwrap();
        settle().await;

        assert_eq!(store.save_count(), 0);
        // Remote record wins over the pre-load mutation
        assert_eq!(sync.character().await.experience, 150);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mutations_coalesce_into_one_save() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();

        for _ in 0..5 {
            sync.grant_experience(30).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(store.save_count(), 0);

        settle().await;
        assert_eq!(store.save_count(), 1);
        let saved = store.last_saved().unwrap();
        assert_eq!(saved.experience, 150);
        assert_eq!(saved.level, 2);
        assert!(!sync.has_unsaved_changes().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_fields_do_not_arm_save() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();

        sync.update_character(|c| c.level).await;
        settle().await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_is_reported_and_next_mutation_retries() {
        let (sync, store) = sync_with(MockStore::default());
        let mut events = sync.subscribe();
        sync.sign_in(user()).await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), SyncEvent::Loaded { .. }));

        store.fail_save.store(true, Ordering::SeqCst);
        sync.grant_experience(10).await;
        settle().await;

        assert!(matches!(events.recv().await.unwrap(), SyncEvent::SaveFailed { .. }));
        assert_eq!(sync.character().await.experience, 10);
        assert!(sync.has_unsaved_changes().await);

        store.fail_save.store(false, Ordering::SeqCst);
        settle().await;
        assert_eq!(store.save_count(), 0, "no automatic retry");

        sync.grant_experience(5).await;
        settle().await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.last_saved().unwrap().experience, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_returns_to_idle() {
        let store = MockStore::default();
        store.fail_load.store(true, Ordering::SeqCst);
        let (sync, _store) = sync_with(store);

        let err = sync.sign_in(user()).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceFailure(_)));
        assert_eq!(sync.phase().await, SyncPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_character_saves_immediately() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();
        assert!(!sync.is_onboarded().await);

        let character = sync.create_character(CharacterClass::Healer).await.unwrap();
        assert!(character.is_onboarded);
        assert_eq!(store.save_count(), 1);

        let (_, patch) = store.saves.lock().unwrap()[0].clone();
        assert_eq!(patch.is_onboarded, Some(true));
        assert_eq!(patch.character.unwrap().character_class, CharacterClass::Healer);
        assert!(sync.is_onboarded().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_character_failure_keeps_onboarding_hidden() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();
        store.fail_save.store(true, Ordering::SeqCst);

        let err = sync.create_character(CharacterClass::Mage).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceFailure(_)));
        assert!(!sync.is_onboarded().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_character_requires_session() {
        let (sync, _store) = sync_with(MockStore::default());
        let err = sync.create_character(CharacterClass::Mage).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_flushes_and_resets() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();
        sync.grant_experience(40).await;

        sync.sign_out().await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.last_saved().unwrap().experience, 40);
        assert_eq!(sync.phase().await, SyncPhase::Idle);
        assert_eq!(sync.character().await.experience, 0);

        settle().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_users_saves_previous_progress() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(UserId::new("a")).await.unwrap();
        sync.grant_experience(500).await;

        sync.sign_in(UserId::new("b")).await.unwrap();
        assert_eq!(sync.phase().await, SyncPhase::Synced(UserId::new("b")));
        assert_eq!(sync.character().await.experience, 0);

        settle().await;
        let saves = store.saves.lock().unwrap().clone();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, UserId::new("a"));
        assert_eq!(saves[0].1.character.as_ref().unwrap().experience, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_users_without_changes_skips_save() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(UserId::new("a")).await.unwrap();
        sync.sign_in(UserId::new("b")).await.unwrap();

        settle().await;
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_superseded_during_load() {
        let gate = Arc::new(Notify::new());
        let (sync, store) = sync_with(MockStore {
            load_gate: Some(gate.clone()),
            ..Default::default()
        });

        let first = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.sign_in(UserId::new("a")).await })
        };
        while store.loads.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        let second = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.sign_in(UserId::new("b")).await })
        };
        while sync.phase().await != SyncPhase::Loading(UserId::new("b")) {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        let err = first.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(sync.phase().await, SyncPhase::Loading(UserId::new("b")));

        gate.notify_one();
        assert!(second.await.unwrap().unwrap().is_some());
        assert_eq!(sync.phase().await, SyncPhase::Synced(UserId::new("b")));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_during_creation_are_discarded() {
        let gate = Arc::new(Notify::new());
        let (sync, store) = sync_with(MockStore {
            save_gate: Some(gate.clone()),
            ..Default::default()
        });
        sync.sign_in(user()).await.unwrap();

        let creating = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.create_character(CharacterClass::Ranger).await })
        };
        while sync.phase().await != SyncPhase::Saving(user()) {
            tokio::task::yield_now().await;
        }

        sync.grant_experience(50).await;
        gate.notify_one();
        let created = creating.await.unwrap().unwrap();

        assert_eq!(sync.character().await, created);
        assert_eq!(created.experience, 0);
        settle().await;
        assert_eq!(store.save_count(), 1);
        assert!(!sync.has_unsaved_changes().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_without_changes_is_noop() {
        let (sync, store) = sync_with(MockStore::default());
        sync.sign_in(user()).await.unwrap();
        sync.flush().await.unwrap();
        assert_eq!(store.save_count(), 0);
    }
}
