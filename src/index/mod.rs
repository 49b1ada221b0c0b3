//! Rank-aware ordered index.
//!
//! The only structure here is [`RankedSkipList`], a skip list whose links
//! carry spans so that the absolute position of any value can be recovered
//! while descending. See the module docs of [`ranked_skip_list`] for the
//! layout.

pub mod range;
pub mod ranked_skip_list;

pub use range::RankRange;
pub use ranked_skip_list::RankedSkipList;

/// Hard cap on the number of levels a list may ever grow to.
///
/// A new node's level is capped against this constant (or the smaller
/// [`IndexConfig::max_level`]), never against the list's current level.
pub const MAX_LEVEL: usize = 32;

/// Construction parameters for a [`RankedSkipList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum number of levels, clamped to `1..=MAX_LEVEL`.
    pub max_level: usize,
    /// Seed for level draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl IndexConfig {
    /// Config with a fixed seed, so level draws are reproducible.
    pub fn seeded(seed: u64) -> Self {
        IndexConfig {
            seed: Some(seed),
            ..IndexConfig::default()
        }
    }

    /// Override the level cap.
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub(crate) fn clamped_max_level(&self) -> usize {
        self.max_level.clamp(1, MAX_LEVEL)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            max_level: MAX_LEVEL,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_level_is_clamped() {
        assert_eq!(IndexConfig::default().clamped_max_level(), MAX_LEVEL);
        assert_eq!(IndexConfig::default().with_max_level(0).clamped_max_level(), 1);
        assert_eq!(IndexConfig::default().with_max_level(1000).clamped_max_level(), MAX_LEVEL);
        assert_eq!(IndexConfig::seeded(7).with_max_level(4).clamped_max_level(), 4);
    }
}
