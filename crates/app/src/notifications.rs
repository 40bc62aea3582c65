//! Console notifications for engine events
//!
//! Subscribes to gift lifecycle and sync broadcasts and reports them; the
//! gift claim is the celebration cue.

use ascend_engine::{GiftEvent, SyncEvent};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Text shown to the user for an event, if any
pub fn gift_message(event: &GiftEvent) -> Option<String> {
    match event {
        GiftEvent::Unlocked(gift) => Some(format!("{} '{}' unlocked!", gift.icon, gift.name)),
        GiftEvent::Claimed(gift) => Some(format!("🎉 Enjoy '{}'!", gift.name)),
        _ => None,
    }
}

pub fn spawn_gift_notifier(mut events: broadcast::Receiver<GiftEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!("Gift event: {:?}", event);
                    if let Some(message) = gift_message(&event) {
                        println!("{}", message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Gift notifier lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

pub fn spawn_sync_notifier(mut events: broadcast::Receiver<SyncEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SyncEvent::SaveFailed { user_id, error: e }) => {
                    error!("Progress for {} not saved: {}", user_id, e);
                    println!("⚠ progress could not be saved, it will retry on the next change");
                }
                Ok(SyncEvent::LoadFailed { user_id, error: e }) => {
                    error!("Progress for {} could not be loaded: {}", user_id, e);
                }
                Ok(SyncEvent::Onboarded { user_id }) => {
                    info!("{} finished onboarding", user_id);
                }
                Ok(event) => debug!("Sync event: {:?}", event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Sync notifier lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{Gift, GiftDraft, GiftId, UserId};

    fn gift() -> Gift {
        Gift::from_draft(UserId::new("user-1"), GiftDraft::new("Spa day", 2))
    }

    #[test]
    fn test_claim_and_unlock_have_messages() {
        assert!(gift_message(&GiftEvent::Claimed(gift()))
            .unwrap()
            .contains("Spa day"));
        assert!(gift_message(&GiftEvent::Unlocked(gift())).is_some());
        assert!(gift_message(&GiftEvent::Deleted(GiftId::new("g"))).is_none());
        assert!(gift_message(&GiftEvent::Created(gift())).is_none());
    }
}
