//! Leaderboard service.
//!
//! Composes a [`RankedSkipList`] of [`Record`]s with a player id → record
//! table. The index answers rank questions; the table turns a player id
//! into the exact record to ask about. Both sit behind one mutex, and every
//! operation holds it for its full duration, so a rank lookup and the range
//! scan that follows it always see the same standings.

mod error;
mod record;

pub use error::{LeaderboardError, Result};
pub use record::{RankInfo, Record};

use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::index::{IndexConfig, RankedSkipList};

/// The four leaderboard queries.
pub trait RankingService {
    /// Record a new score for a player, replacing any previous one.
    fn update_score(&self, player_id: &str, score: i64, timestamp: SystemTime) -> Result<()>;

    /// A player's current rank and record.
    fn player_rank(&self, player_id: &str) -> Result<RankInfo>;

    /// The best `n` records, best first. Shorter when fewer players exist.
    fn top_n(&self, n: usize) -> Result<Vec<RankInfo>>;

    /// Up to `range_num` records around a player, starting
    /// `(range_num - 1) / 2` ranks above them (but never above rank 1).
    fn player_rank_range(&self, player_id: &str, range_num: usize) -> Result<Vec<RankInfo>>;
}

/// Everything guarded by the leaderboard lock.
struct Standings {
    index: RankedSkipList<Record>,
    players: FxHashMap<String, Record>,
}

impl Standings {
    fn from_index(mut index: RankedSkipList<Record>) -> Standings {
        let mut players = FxHashMap::default();
        let mut duplicates = Vec::new();
        for record in index.iter() {
            if players.contains_key(&record.player_id) {
                duplicates.push(record.clone());
            } else {
                players.insert(record.player_id.clone(), record.clone());
            }
        }
        // Keep each player's best-ranked record.
        for record in duplicates {
            warn!(player = %record.player_id, "dropping duplicate record from injected index");
            index.remove(&record);
        }
        Standings { index, players }
    }

    fn update(&mut self, record: Record) -> usize {
        if let Some(old) = self.players.insert(record.player_id.clone(), record.clone()) {
            let removed = self.index.remove(&old);
            debug_assert!(removed.is_some(), "stale record for {} missing from index", old.player_id);
        }
        self.index.insert(record)
    }

    fn remove(&mut self, player_id: &str) -> Option<Record> {
        let old = self.players.remove(player_id)?;
        self.index.remove(&old)
    }

    fn rank_info(&self, player_id: &str) -> Result<RankInfo> {
        let Some(record) = self.players.get(player_id) else {
            return Err(LeaderboardError::UnknownPlayer(player_id.to_owned()));
        };
        match self.index.rank(record) {
            Some(rank) => Ok(RankInfo {
                rank,
                record: record.clone(),
            }),
            None => unreachable!("player {player_id} is tracked but not indexed"),
        }
    }

    fn collect_range(&self, start: usize, count: usize) -> Vec<RankInfo> {
        let mut out = Vec::with_capacity(count.min(self.index.len()));
        self.index.range_by_rank(start, count, |rank, record| {
            out.push(RankInfo {
                rank,
                record: record.clone(),
            });
            ControlFlow::Continue(())
        });
        out
    }
}

/// A thread-safe, in-memory leaderboard.
pub struct Leaderboard {
    standings: Mutex<Standings>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self::from_index(RankedSkipList::with_config(config))
    }

    /// Build a leaderboard around an existing index. The player table is
    /// rebuilt from the index; if a player appears more than once, only
    /// their best-ranked record is kept.
    pub fn from_index(index: RankedSkipList<Record>) -> Self {
        Leaderboard {
            standings: Mutex::new(Standings::from_index(index)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Standings>> {
        self.standings.lock().map_err(|_| {
            warn!("leaderboard lock poisoned");
            LeaderboardError::Poisoned
        })
    }

    /// Number of ranked players.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.index.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.index.is_empty())
    }

    /// A player's current record.
    pub fn record(&self, player_id: &str) -> Result<Record> {
        self.lock()?
            .players
            .get(player_id)
            .cloned()
            .ok_or_else(|| LeaderboardError::UnknownPlayer(player_id.to_owned()))
    }

    /// Drop a player from the standings, returning their last record.
    pub fn remove_player(&self, player_id: &str) -> Result<Option<Record>> {
        let removed = self.lock()?.remove(player_id);
        if removed.is_some() {
            debug!(player = player_id, "removed player");
        }
        Ok(removed)
    }

    /// Level-by-level dump of the underlying index.
    pub fn snapshot(&self) -> Result<String> {
        Ok(self.lock()?.index.to_string())
    }
}

impl RankingService for Leaderboard {
    fn update_score(&self, player_id: &str, score: i64, timestamp: SystemTime) -> Result<()> {
        let mut standings = self.lock()?;
        let rank = standings.update(Record::new(player_id, score, timestamp));
        debug!(player = player_id, score, rank, "updated score");
        Ok(())
    }

    fn player_rank(&self, player_id: &str) -> Result<RankInfo> {
        self.lock()?.rank_info(player_id)
    }

    fn top_n(&self, n: usize) -> Result<Vec<RankInfo>> {
        Ok(self.lock()?.collect_range(1, n))
    }

    fn player_rank_range(&self, player_id: &str, range_num: usize) -> Result<Vec<RankInfo>> {
        let standings = self.lock()?;
        let centre = standings.rank_info(player_id)?;
        if range_num == 0 {
            return Ok(Vec::new());
        }
        let half = (range_num - 1) / 2;
        let start = centre.rank.saturating_sub(half).max(1);
        Ok(standings.collect_range(start, range_num))
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaderboard")
            .field("players", &self.len().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn board() -> Leaderboard {
        Leaderboard::with_config(IndexConfig::seeded(42))
    }

    fn ids(infos: &[RankInfo]) -> Vec<(usize, &str)> {
        infos.iter().map(|info| (info.rank, info.player_id())).collect()
    }

    #[test]
    fn tie_broken_by_timestamp() {
        let lb = board();
        lb.update_score("a", 100, at(1000)).unwrap();
        lb.update_score("b", 200, at(1000)).unwrap();
        lb.update_score("c", 100, at(999)).unwrap();

        let top = lb.top_n(10).unwrap();
        assert_eq!(ids(&top), vec![(1, "b"), (2, "c"), (3, "a")]);
        assert_eq!(lb.player_rank("a").unwrap().rank, 3);
    }

    #[test]
    fn update_replaces_old_record() {
        let lb = board();
        lb.update_score("a", 10, at(1)).unwrap();
        lb.update_score("b", 20, at(1)).unwrap();
        lb.update_score("a", 30, at(2)).unwrap();

        assert_eq!(lb.len().unwrap(), 2);
        let a = lb.player_rank("a").unwrap();
        assert_eq!(a.rank, 1);
        assert_eq!(a.score(), 30);
        assert_eq!(a.timestamp(), at(2));
        assert_eq!(lb.player_rank("b").unwrap().rank, 2);
    }

    #[test]
    fn unknown_player_is_an_error() {
        let lb = board();
        lb.update_score("a", 1, at(1)).unwrap();
        assert_eq!(
            lb.player_rank("ghost"),
            Err(LeaderboardError::UnknownPlayer("ghost".to_string()))
        );
        assert!(matches!(
            lb.player_rank_range("ghost", 5),
            Err(LeaderboardError::UnknownPlayer(_))
        ));
        assert!(lb.record("ghost").is_err());
    }

    #[test]
    fn zero_range_is_empty() {
        let lb = board();
        lb.update_score("a", 1, at(1)).unwrap();
        assert!(lb.player_rank_range("a", 0).unwrap().is_empty());
        assert!(lb.top_n(0).unwrap().is_empty());
    }

    #[test]
    fn remove_player_renumbers() {
        let lb = board();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            lb.update_score(id, 100 - i as i64, at(1)).unwrap();
        }
        let removed = lb.remove_player("b").unwrap();
        assert_eq!(removed.map(|r| r.score), Some(99));
        assert_eq!(lb.remove_player("b").unwrap(), None);
        assert_eq!(ids(&lb.top_n(10).unwrap()), vec![(1, "a"), (2, "c"), (3, "d")]);
    }

    #[test]
    fn from_index_rebuilds_table() {
        let mut index = RankedSkipList::with_config(IndexConfig::seeded(1));
        index.insert(Record::new("a", 5, at(1)));
        index.insert(Record::new("b", 7, at(1)));
        index.insert(Record::new("a", 3, at(1)));

        let lb = Leaderboard::from_index(index);
        assert_eq!(lb.len().unwrap(), 2);
        assert_eq!(lb.record("a").unwrap().score, 5);
        assert_eq!(ids(&lb.top_n(5).unwrap()), vec![(1, "b"), (2, "a")]);
    }

    #[test]
    fn snapshot_lists_players() {
        let lb = Leaderboard::with_config(IndexConfig::seeded(3).with_max_level(1));
        lb.update_score("x", 2, UNIX_EPOCH).unwrap();
        lb.update_score("y", 1, UNIX_EPOCH).unwrap();
        assert_eq!(lb.snapshot().unwrap(), "Level 0: x(2@0) y(1@0)\n");
    }
}
