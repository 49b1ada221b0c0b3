use thiserror::Error;

/// Errors returned by [`Leaderboard`](super::Leaderboard) queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    /// The player has never submitted a score (or was removed).
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    /// A thread panicked while holding the leaderboard lock, so the
    /// standings may be half-updated.
    #[error("leaderboard lock poisoned")]
    Poisoned,
}

pub type Result<T, E = LeaderboardError> = std::result::Result<T, E>;
