use serde::{Deserialize, Serialize};

/// Per-session results.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub games_played: u64,
    pub games_won: u64,
    pub games_lost: u64,
    /// Highest score of a won deal.
    pub best_score: Option<i32>,
}

impl Stats {
    pub fn record_win(&mut self, score: i32) {
        self.games_played += 1;
        self.games_won += 1;
        self.best_score = Some(self.best_score.map_or(score, |best| best.max(score)));
    }

    pub fn record_loss(&mut self) {
        self.games_played += 1;
        self.games_lost += 1;
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.games_won as f64 / self.games_played as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_score_only_counts_wins() {
        let mut stats = Stats::default();
        assert_eq!(stats.win_rate(), 0.0);
        stats.record_loss();
        assert_eq!(stats.best_score, None);
        stats.record_win(300);
        stats.record_win(120);
        assert_eq!(stats.best_score, Some(300));
        assert_eq!(stats.games_played, 3);
        assert!((stats.win_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
