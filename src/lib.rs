//! Ladder - an in-memory leaderboard backed by a rank-aware skip list.
//!
//! # Quick Start
//!
//! ```
//! use std::time::{Duration, UNIX_EPOCH};
//! use ladder::{Leaderboard, RankingService};
//!
//! let board = Leaderboard::new();
//! let t0 = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
//!
//! board.update_score("a", 100, t0).unwrap();
//! board.update_score("b", 200, t0).unwrap();
//! board.update_score("c", 100, t0 - Duration::from_secs(1)).unwrap();
//!
//! // Higher score first, then the earlier submission.
//! let top: Vec<_> = board.top_n(3).unwrap().into_iter().map(|r| r.record.player_id).collect();
//! assert_eq!(top, ["b", "c", "a"]);
//! assert_eq!(board.player_rank("a").unwrap().rank, 3);
//! ```
//!
//! The index is usable on its own for any [`Ord`] type:
//!
//! ```
//! use ladder::index::RankedSkipList;
//!
//! let mut list = RankedSkipList::new();
//! for value in [30, 10, 20] {
//!     list.insert(value);
//! }
//! assert_eq!(list.rank(&20), Some(2));
//! let window: Vec<_> = list.range(2, 5).collect();
//! assert_eq!(window, [(2, &20), (3, &30)]);
//! ```

pub mod index;
pub mod leaderboard;

pub use index::{IndexConfig, RankedSkipList};
pub use leaderboard::{Leaderboard, LeaderboardError, RankInfo, RankingService, Record};
