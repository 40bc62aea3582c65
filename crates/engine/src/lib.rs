//! Ascend Engine - Streaks, gift lifecycle, mystery rewards, and progression sync

pub mod gifts;
pub mod rewards;
pub mod streak;
pub mod sync;

pub use gifts::{GiftEvent, GiftManager};
pub use rewards::{MysteryOutcome, RewardGateway};
pub use streak::StreakTracker;
pub use sync::{ProgressionSync, SyncEvent, SyncPhase};
