//! Leaderboard records and their ranking order.
//!
//! A [`Record`] is one player's latest submission. Records sort best-first:
//!
//! 1. Higher score first.
//! 2. On equal score, the earlier timestamp first.
//! 3. On equal score and timestamp, by player id. This only separates
//!    distinct players that would otherwise compare equal, so the index
//!    never holds two equal records.

use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// One player's score as of a point in time. Immutable; a new submission
/// replaces the whole record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub player_id: String,
    pub score: i64,
    pub timestamp: SystemTime,
}

impl Record {
    pub fn new(player_id: impl Into<String>, score: i64, timestamp: SystemTime) -> Record {
        return Record {
            player_id: player_id.into(),
            score,
            timestamp,
        };
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        return other
            .score
            .cmp(&self.score)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.player_id.cmp(&other.player_id));
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        return Some(self.cmp(other));
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp.duration_since(UNIX_EPOCH) {
            Ok(since) => write!(f, "{}({}@{})", self.player_id, self.score, since.as_secs()),
            Err(_) => write!(f, "{}({}@pre-epoch)", self.player_id, self.score),
        }
    }
}

/// A record together with its 1-based rank at query time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankInfo {
    pub rank: usize,
    pub record: Record,
}

impl RankInfo {
    pub fn player_id(&self) -> &str {
        return &self.record.player_id;
    }

    pub fn score(&self) -> i64 {
        return self.record.score;
    }

    pub fn timestamp(&self) -> SystemTime {
        return self.record.timestamp;
    }
}

impl fmt::Display for RankInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.rank, self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn higher_score_first() {
        let low = Record::new("a", 100, at(10));
        let high = Record::new("b", 200, at(10));
        assert!(high < low);
    }

    #[test]
    fn earlier_timestamp_breaks_tie() {
        let early = Record::new("late-name", 100, at(9));
        let late = Record::new("early-name", 100, at(10));
        assert!(early < late);
    }

    #[test]
    fn player_id_separates_exact_ties() {
        let a = Record::new("a", 100, at(10));
        let b = Record::new("b", 100, at(10));
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn negative_scores_order() {
        let zero = Record::new("z", 0, at(0));
        let negative = Record::new("n", -5, at(0));
        assert!(zero < negative);
    }

    #[test]
    fn display() {
        let record = Record::new("alice", 42, at(1_700_000_000));
        assert_eq!(record.to_string(), "alice(42@1700000000)");
        let info = RankInfo { rank: 3, record };
        assert_eq!(info.to_string(), "#3 alice(42@1700000000)");
    }
}
