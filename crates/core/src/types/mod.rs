//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a signed-in user (supplied by the identity provider)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique gift identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftId(pub String);

impl GiftId {
    pub fn new(id: impl Into<String>) -> Self {
        GiftId(id.into())
    }

    /// Fresh random id (UUID v4)
    pub fn generate() -> Self {
        GiftId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Energy pool (current never exceeds max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Energy {
    pub current: u32,
    pub max: u32,
}

impl Energy {
    pub fn new(current: u32, max: u32) -> Self {
        Energy {
            current: current.min(max),
            max,
        }
    }

    /// Full pool of the given size
    pub fn full(max: u32) -> Self {
        Energy { current: max, max }
    }

    /// Spend energy; returns false (and leaves the pool alone) if not enough
    pub fn spend(&mut self, amount: u32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Restore energy, capped at max
    pub fn restore(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl Default for Energy {
    fn default() -> Self {
        Energy::full(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_spend_and_restore() {
        let mut energy = Energy::full(10);
        assert!(energy.spend(4));
        assert_eq!(energy.current, 6);
        assert!(!energy.spend(7));
        assert_eq!(energy.current, 6);
        energy.restore(50);
        assert_eq!(energy.current, 10);
    }

    #[test]
    fn test_energy_new_caps_current() {
        assert_eq!(Energy::new(120, 100).current, 100);
    }

    #[test]
    fn test_gift_ids_are_unique() {
        assert_ne!(GiftId::generate(), GiftId::generate());
    }
}
