//! High-score keeping for timed runs.
//!
//! The board always holds exactly ten entries, pre-seeded with zero-time
//! placeholders. Zero means "never beaten": any real completion time
//! outranks it, and among real times lower is better. Recording a win
//! pushes an eleventh entry, sorts and truncates, so the worst entry on
//! the board is the one that falls off.

use std::cmp::Ordering;

use instant::Duration;

pub const BOARD_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub label: String,
    pub time: Duration,
}

/// Ranking for score entries: real times ascending, with the zero-time
/// placeholder strictly worse than any real time.
pub fn compare_entries(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    match (a.time.is_zero(), b.time.is_zero()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.time.cmp(&b.time),
    }
}

pub struct Scoreboard {
    entries: Vec<ScoreEntry>,
    fails: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        let entries = (0..BOARD_SIZE)
            .map(|_| ScoreEntry {
                label: "---".to_string(),
                time: Duration::ZERO,
            })
            .collect();
        Self { entries, fails: 0 }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn fails(&self) -> u32 {
        self.fails
    }

    /// The fastest recorded time, if any run has finished yet.
    pub fn best(&self) -> Option<Duration> {
        self.entries
            .first()
            .map(|entry| entry.time)
            .filter(|time| !time.is_zero())
    }

    /// Insert a completed run and drop whatever is now worst.
    ///
    /// Returns the recorded entry so callers can tell the player where
    /// they placed (or that they did not).
    pub fn record_win(&mut self, label: &str, time: Duration) -> ScoreEntry {
        let entry = ScoreEntry {
            label: label.to_string(),
            time,
        };
        self.entries.push(entry.clone());
        self.entries.sort_by(compare_entries);
        self.entries.truncate(BOARD_SIZE);
        entry
    }

    pub fn record_fail(&mut self) {
        self.fails += 1;
    }

    /// Clear the board back to placeholders and zero the fail counter.
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(secs: u64) -> ScoreEntry {
        ScoreEntry {
            label: "player".to_string(),
            time: Duration::from_secs(secs),
        }
    }

    #[test]
    fn zero_time_ranks_below_any_real_time() {
        let placeholder = entry(0);
        let slow = entry(100_000);
        assert_eq!(compare_entries(&placeholder, &slow), Ordering::Greater);
        assert_eq!(compare_entries(&slow, &placeholder), Ordering::Less);
        assert_eq!(compare_entries(&placeholder, &placeholder), Ordering::Equal);
    }

    #[test]
    fn real_times_rank_ascending() {
        assert_eq!(compare_entries(&entry(3), &entry(7)), Ordering::Less);
        assert_eq!(compare_entries(&entry(7), &entry(3)), Ordering::Greater);
        assert_eq!(compare_entries(&entry(5), &entry(5)), Ordering::Equal);
    }

    #[test]
    fn board_starts_full_of_placeholders() {
        let board = Scoreboard::new();
        assert_eq!(board.entries().len(), BOARD_SIZE);
        assert!(board.entries().iter().all(|e| e.time.is_zero()));
    }

    #[test]
    fn wins_displace_placeholders_first() {
        let mut board = Scoreboard::new();
        board.record_win("a", Duration::from_secs(30));
        board.record_win("b", Duration::from_secs(10));

        assert_eq!(board.entries().len(), BOARD_SIZE);
        assert_eq!(board.entries()[0].time, Duration::from_secs(10));
        assert_eq!(board.entries()[1].time, Duration::from_secs(30));
        assert!(board.entries()[2].time.is_zero());
    }

    #[test]
    fn full_board_drops_the_worst_time() {
        let mut board = Scoreboard::new();
        for secs in 1..=10u64 {
            board.record_win("p", Duration::from_secs(secs));
        }
        // Board is full of real times 1..=10; an 11th faster run must
        // push out the 10-second entry, not anything else.
        board.record_win("p", Duration::from_secs(5));

        assert_eq!(board.entries().len(), BOARD_SIZE);
        assert!(
            board
                .entries()
                .iter()
                .filter(|e| e.time == Duration::from_secs(10))
                .count()
                == 0
        );
        assert_eq!(
            board
                .entries()
                .iter()
                .filter(|e| e.time == Duration::from_secs(5))
                .count(),
            2
        );
    }

    #[test]
    fn a_slow_run_on_a_full_board_vanishes() {
        let mut board = Scoreboard::new();
        for secs in 1..=10u64 {
            board.record_win("p", Duration::from_secs(secs));
        }
        board.record_win("slow", Duration::from_secs(99));
        assert!(board.entries().iter().all(|e| e.label != "slow"));
    }

    #[test]
    fn best_is_the_fastest_real_time() {
        let mut board = Scoreboard::new();
        assert_eq!(board.best(), None);
        board.record_win("p", Duration::from_secs(30));
        board.record_win("p", Duration::from_secs(10));
        assert_eq!(board.best(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn restart_clears_scores_and_fails() {
        let mut board = Scoreboard::new();
        board.record_win("p", Duration::from_secs(1));
        board.record_fail();
        board.restart();
        assert!(board.entries().iter().all(|e| e.time.is_zero()));
        assert_eq!(board.fails(), 0);
    }
}
