//! High score leaderboard data
//!
//! The core only builds and orders the records. Storing them is the host's
//! job; JSON helpers are provided for that.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::state::PlayerStats;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Shape of the match a score was earned in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub num_humans: usize,
    pub num_ais: usize,
    pub num_rounds: u32,
    pub board_size: usize,
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    /// Final score (may be negative)
    pub score: i64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
    pub config: RoundConfig,
    pub stats: PlayerStats,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: i64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// The best `n` entries
    pub fn top_scores(&self, n: usize) -> &[HighScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse a leaderboard, re-sorting in case the source was edited
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: i64) -> HighScoreEntry {
        HighScoreEntry {
            name: name.to_string(),
            score,
            timestamp: 0.0,
            config: RoundConfig::default(),
            stats: PlayerStats::default(),
        }
    }

    #[test]
    fn test_add_score_keeps_order() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry("a", 100)), Some(1));
        assert_eq!(scores.add_score(entry("b", 300)), Some(1));
        assert_eq!(scores.add_score(entry("c", 200)), Some(2));
        assert_eq!(scores.add_score(entry("d", -50)), Some(4));
        let names: Vec<&str> = scores.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a", "d"]);
        assert_eq!(scores.top_score(), Some(300));
        assert_eq!(scores.top_scores(2).len(), 2);
        assert_eq!(scores.top_scores(50).len(), 4);
    }

    #[test]
    fn test_full_board_rejects_low_scores() {
        let mut scores = HighScores::new();
        for i in 0..MAX_HIGH_SCORES {
            scores.add_score(entry("p", (i as i64 + 1) * 10));
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(5), None);
        assert_eq!(scores.add_score(entry("late", 5)), None);
        assert_eq!(scores.potential_rank(1000), Some(1));
        scores.add_score(entry("top", 1000));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_from_json_resorts() {
        let mut scores = HighScores::new();
        scores.entries.push(entry("low", 1));
        scores.entries.push(entry("high", 9));
        let json = scores.to_json().unwrap();
        let loaded = HighScores::from_json(&json).unwrap();
        assert_eq!(loaded.entries[0].name, "high");
    }
}
