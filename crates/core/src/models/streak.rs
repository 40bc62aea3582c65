//! Daily streak record and its claim transition

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak state. Both fields are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub last_claim_date: Option<NaiveDate>,
}

/// How a successful claim affected the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreakChange {
    /// First claim ever
    Started,
    /// Claimed the day after the previous claim
    Continued,
    /// Gap of more than one day; streak restarted at 1
    Restarted,
}

/// Outcome of a successful daily claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakClaim {
    pub streak_count: u32,
    pub change: StreakChange,
    pub claimed_on: NaiveDate,
}

impl StreakRecord {
    /// A claim is allowed when nothing was claimed on (or after) `today`
    pub fn can_claim_on(&self, today: NaiveDate) -> bool {
        match self.last_claim_date {
            None => true,
            Some(last) => today > last,
        }
    }

    /// Apply a claim for `today`. Returns `None` (record untouched) when the
    /// claim is not allowed.
    pub fn claim(&mut self, today: NaiveDate) -> Option<StreakClaim> {
        let change = match self.last_claim_date {
            None => StreakChange::Started,
            Some(last) => match (today - last).num_days() {
                days if days <= 0 => return None,
                1 => StreakChange::Continued,
                _ => StreakChange::Restarted,
            },
        };

        self.streak_count = match change {
            StreakChange::Continued => self.streak_count.saturating_add(1),
            StreakChange::Started | StreakChange::Restarted => 1,
        };
        self.last_claim_date = Some(today);

        Some(StreakClaim {
            streak_count: self.streak_count,
            change,
            claimed_on: today,
        })
    }

    /// Streak as it stands on `today`: 0 once more than a day has passed
    /// since the last claim, even though the stored count resets only on the
    /// next claim.
    pub fn effective_streak(&self, today: NaiveDate) -> u32 {
        match self.last_claim_date {
            Some(last) if (today - last).num_days() <= 1 => self.streak_count,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_first_claim_starts_streak() {
        let mut record = StreakRecord::default();
        let claim = record.claim(day(1)).unwrap();
        assert_eq!(claim.streak_count, 1);
        assert_eq!(claim.change, StreakChange::Started);
        assert_eq!(record.last_claim_date, Some(day(1)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        let mut record = StreakRecord::default();
        record.claim(day(1)).unwrap();
        let claim = record.claim(day(2)).unwrap();
        assert_eq!(claim.streak_count, 2);
        assert_eq!(claim.change, StreakChange::Continued);
    }

    #[test]
    fn test_gap_restarts_streak() {
        let mut record = StreakRecord {
            streak_count: 6,
            last_claim_date: Some(day(1)),
        };
        let claim = record.claim(day(4)).unwrap();
        assert_eq!(claim.streak_count, 1);
        assert_eq!(claim.change, StreakChange::Restarted);
    }

    #[test]
    fn test_same_day_is_refused() {
        let mut record = StreakRecord::default();
        record.claim(day(1)).unwrap();
        let before = record;
        assert!(record.claim(day(1)).is_none());
        assert_eq!(record, before);
        assert!(!record.can_claim_on(day(1)));
    }

    #[test]
    fn test_clock_moving_backwards_is_refused() {
        let mut record = StreakRecord {
            streak_count: 3,
            last_claim_date: Some(day(10)),
        };
        assert!(!record.can_claim_on(day(9)));
        assert!(record.claim(day(9)).is_none());
        assert_eq!(record.streak_count, 3);
    }

    #[test]
    fn test_effective_streak_breaks_after_gap() {
        let record = StreakRecord {
            streak_count: 4,
            last_claim_date: Some(day(5)),
        };
        assert_eq!(record.effective_streak(day(5)), 4);
        assert_eq!(record.effective_streak(day(6)), 4);
        assert_eq!(record.effective_streak(day(7)), 0);
    }

    #[test]
    fn test_record_json_shape() {
        let record = StreakRecord {
            streak_count: 2,
            last_claim_date: Some(day(3)),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"streakCount":2,"lastClaimDate":"2026-03-03"}"#);
    }
}
