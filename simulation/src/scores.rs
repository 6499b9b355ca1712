//! Best victory score per level, kept for the session only.

use std::collections::BTreeMap;

use tile_defence_core::LevelId;

/// Best victory score recorded for each level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighScores {
    best: BTreeMap<LevelId, u64>,
}

impl HighScores {
    /// Creates an empty score table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a score, keeping it only when it beats the previous best.
    ///
    /// Returns `true` when the score became the new best.
    pub fn record(&mut self, level: LevelId, score: u64) -> bool {
        match self.best.get(&level) {
            Some(&best) if score <= best => false,
            _ => {
                let _ = self.best.insert(level, score);
                true
            }
        }
    }

    /// Best score recorded for the level.
    #[must_use]
    pub fn best(&self, level: LevelId) -> Option<u64> {
        self.best.get(&level).copied()
    }

    /// Iterator over every level with a recorded score.
    pub fn iter(&self) -> impl Iterator<Item = (LevelId, u64)> + '_ {
        self.best.iter().map(|(level, score)| (*level, *score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strictly_greater_scores_replace_the_best() {
        let mut scores = HighScores::new();
        let level = LevelId::new(1);

        assert!(scores.record(level, 9_000));
        assert!(!scores.record(level, 9_000));
        assert!(!scores.record(level, 8_000));
        assert!(scores.record(level, 9_001));
        assert_eq!(scores.best(level), Some(9_001));
        assert_eq!(scores.best(LevelId::new(2)), None);
    }

    #[test]
    fn levels_are_tracked_independently() {
        let mut scores = HighScores::new();
        let _ = scores.record(LevelId::new(2), 50);
        let _ = scores.record(LevelId::new(1), 70);

        let recorded: Vec<_> = scores.iter().collect();
        assert_eq!(recorded, vec![(LevelId::new(1), 70), (LevelId::new(2), 50)]);
    }
}
