//! Character model and leveling math

use crate::types::Energy;
use serde::{Deserialize, Serialize};

/// XP needed per squared level step
pub const XP_PER_LEVEL_STEP: u64 = 100;

/// Cumulative experience required to reach `level`: `(level - 1)^2 * 100`.
///
/// Level 0 is treated as level 1.
pub fn xp_threshold(level: u32) -> u64 {
    let steps = u64::from(level.max(1) - 1);
    steps
        .saturating_mul(steps)
        .saturating_mul(XP_PER_LEVEL_STEP)
}

/// Fraction of the way from `current_level` to the next level, clamped to `[0, 1]`.
///
/// XP below the current band clamps to 0, XP past the next threshold clamps to 1.
pub fn progress_fraction(current_level: u32, current_xp: u64) -> f64 {
    let level = current_level.max(1);
    let floor = xp_threshold(level);
    let ceiling = xp_threshold(level.saturating_add(1));
    let span = ceiling.saturating_sub(floor);
    if span == 0 {
        return 1.0;
    }

    let gained = current_xp as f64 - floor as f64;
    (gained / span as f64).clamp(0.0, 1.0)
}

/// `xp_threshold` without saturation; `None` once the threshold leaves `u64`
fn checked_xp_threshold(level: u32) -> Option<u64> {
    let steps = u64::from(level.max(1) - 1);
    steps.checked_mul(steps)?.checked_mul(XP_PER_LEVEL_STEP)
}

/// Highest level whose threshold is covered by `experience`
pub fn level_for_experience(experience: u64) -> u32 {
    let covered = |level: u32| checked_xp_threshold(level).is_some_and(|t| t <= experience);

    let mut level = ((experience / XP_PER_LEVEL_STEP) as f64).sqrt() as u32 + 1;
    // Float sqrt can land one off on large inputs
    while level > 1 && !covered(level) {
        level -= 1;
    }
    while level < u32::MAX && covered(level + 1) {
        level += 1;
    }
    level
}

/// Character archetype picked at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    #[default]
    Warrior,
    Mage,
    Ranger,
    Healer,
}

impl CharacterClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "warrior",
            CharacterClass::Mage => "mage",
            CharacterClass::Ranger => "ranger",
            CharacterClass::Healer => "healer",
        }
    }
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CharacterClass {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warrior" => Ok(CharacterClass::Warrior),
            "mage" => Ok(CharacterClass::Mage),
            "ranger" => Ok(CharacterClass::Ranger),
            "healer" => Ok(CharacterClass::Healer),
            other => Err(crate::Error::InvalidData(format!("Unknown character class '{}'", other))),
        }
    }
}

/// Persistent progress character owned by the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub level: u32,
    pub experience: u64,
    #[serde(default)]
    pub energy: Energy,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub character_class: CharacterClass,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            energy: Energy::default(),
            is_onboarded: false,
            character_class: CharacterClass::default(),
        }
    }
}

/// Result of granting experience
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    pub previous_level: u32,
    pub new_level: u32,
}

impl ExperienceGain {
    pub fn levels_gained(&self) -> u32 {
        self.new_level.saturating_sub(self.previous_level)
    }

    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

impl Character {
    /// Fresh level-1 character of the given class
    pub fn new(character_class: CharacterClass, energy_max: u32) -> Self {
        Self {
            character_class,
            energy: Energy::full(energy_max),
            ..Self::default()
        }
    }

    /// Progress toward the next level in `[0, 1]`
    pub fn progress(&self) -> f64 {
        progress_fraction(self.level, self.experience)
    }

    /// Add experience and advance the level to match the banding.
    ///
    /// An externally advanced level is never lowered here.
    pub fn gain_experience(&mut self, amount: u64) -> ExperienceGain {
        let previous_level = self.level;
        self.experience = self.experience.saturating_add(amount);
        self.level = self.level.max(level_for_experience(self.experience));
        ExperienceGain {
            previous_level,
            new_level: self.level,
        }
    }

    /// Explicit reset back to level 1 with no experience
    pub fn reset_progress(&mut self) {
        self.level = 1;
        self.experience = 0;
    }

    /// Whether the persisted fields differ (level, experience, energy, onboarding)
    pub fn sync_fields_differ(&self, other: &Character) -> bool {
        self.level != other.level
            || self.experience != other.experience
            || self.energy != other.energy
            || self.is_onboarded != other.is_onboarded
            || self.character_class != other.character_class
    }
}
