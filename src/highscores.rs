//! Local best scores
//!
//! Persisted to LocalStorage (a JSON file natively), tracks top 10 scores.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;
use crate::sim::FinalStats;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Percent (0-100)
    pub accuracy: f64,
    pub max_combo: u32,
    #[serde(default)]
    pub hits: u32,
    #[serde(default)]
    pub total_clicks: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    pub fn new(stats: &FinalStats, timestamp: f64) -> Self {
        Self {
            score: stats.score,
            accuracy: stats.accuracy,
            max_combo: stats.max_combo,
            hits: stats.hits,
            total_clicks: stats.total_clicks,
            timestamp,
        }
    }
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    const STORAGE_KEY: &'static str = "aim_trainer_scores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the list
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished session.
    /// Returns the rank achieved (1-indexed) or None if it fell off the list.
    pub fn add_score(&mut self, stats: &FinalStats, timestamp: f64) -> Option<usize> {
        if !self.qualifies(stats.score) {
            return None;
        }

        let entry = HighScoreEntry::new(stats, timestamp);

        // Ties go after existing entries with the same score
        let pos = self.entries.iter().position(|e| stats.score > e.score);
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

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Restore sort order and size after loading untrusted data
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Load high scores. Missing or unreadable data means an empty list.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.load_json::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                scores.normalize();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::error!("Error loading local scores: {e}");
                Self::new()
            }
        }
    }

    /// Save high scores. Failures are logged, never raised.
    pub fn save<S: KeyValueStore>(&self, store: &S) {
        match store.save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::error!("Error saving local scores: {e}"),
        }
    }

    /// Add a finished session and persist the list
    pub fn record<S: KeyValueStore>(
        &mut self,
        store: &S,
        stats: &FinalStats,
        timestamp: f64,
    ) -> Option<usize> {
        let rank = self.add_score(stats, timestamp);
        if rank.is_some() {
            self.save(store);
        }
        rank
    }
}

/// Score with thousands separators (`12,345`)
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a timestamp as a relative date string
pub fn format_relative_date(now_ms: f64, timestamp: f64) -> String {
    let diff_ms = now_ms - timestamp;
    let diff_secs = diff_ms / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            calendar_date(timestamp)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// `m/d/yy` in the browser's local time zone
#[cfg(target_arch = "wasm32")]
fn calendar_date(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    format!(
        "{}/{}/{}",
        date.get_month() + 1,
        date.get_date(),
        date.get_full_year() % 100
    )
}

/// `m/d/yy` in the local time zone
#[cfg(not(target_arch = "wasm32"))]
fn calendar_date(timestamp: f64) -> String {
    use chrono::{Local, TimeZone};

    match Local.timestamp_millis_opt(timestamp as i64).single() {
        Some(date) => date.format("%-m/%-d/%y").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    fn stats(score: u64) -> FinalStats {
        FinalStats {
            score,
            accuracy: 80.0,
            max_combo: 2,
            hits: 4,
            total_clicks: 5,
        }
    }

    #[test]
    fn test_sorted_descending_and_capped() {
        let mut scores = HighScores::new();
        for (i, s) in [300, 100, 900, 0, 500, 700, 200, 800, 400, 600, 1000, 50].iter().enumerate() {
            scores.add_score(&stats(*s), i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        let ordered: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![1000, 900, 800, 700, 600, 500, 400, 300, 200, 100]);
    }

    #[test]
    fn test_zero_score_kept_when_room() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(&stats(0), 1.0), Some(1));
        assert_eq!(scores.entries[0].score, 0);
    }

    #[test]
    fn test_ties_keep_older_first() {
        let mut scores = HighScores::new();
        scores.add_score(&stats(500), 1.0);
        assert_eq!(scores.add_score(&stats(500), 2.0), Some(2));
        assert_eq!(scores.entries[0].timestamp, 1.0);
        assert_eq!(scores.entries[1].timestamp, 2.0);
    }

    #[test]
    fn test_full_list_rejects_low_score() {
        let mut scores = HighScores::new();
        for s in 1..=10 {
            scores.add_score(&stats(s * 100), 0.0);
        }
        assert!(!scores.qualifies(100));
        assert_eq!(scores.add_score(&stats(100), 0.0), None);
        assert!(scores.qualifies(150));
        assert_eq!(scores.add_score(&stats(150), 0.0), Some(10));
    }

    #[test]
    fn test_entry_keeps_final_stats() {
        let mut scores = HighScores::new();
        scores.add_score(&stats(250), 1234.0);
        let entry = &scores.entries[0];
        assert_eq!(entry.accuracy, 80.0);
        assert_eq!(entry.max_combo, 2);
        assert_eq!(entry.hits, 4);
        assert_eq!(entry.total_clicks, 5);
        assert_eq!(entry.timestamp, 1234.0);
    }

    #[test]
    fn test_record_persists() {
        let store = MemoryStore::new();
        let mut scores = HighScores::load(&store);
        assert!(scores.is_empty());
        scores.record(&store, &stats(420), 1.0);

        let reloaded = HighScores::load(&store);
        assert_eq!(reloaded.entries, scores.entries);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let store = MemoryStore::new();
        store.set(HighScores::STORAGE_KEY, "not json").unwrap();
        assert!(HighScores::load(&store).is_empty());
    }

    #[test]
    fn test_load_restores_order() {
        let store = MemoryStore::new();
        store
            .set(
                HighScores::STORAGE_KEY,
                r#"{"entries":[
                    {"score":10,"accuracy":1.0,"max_combo":1,"timestamp":0},
                    {"score":30,"accuracy":1.0,"max_combo":1,"timestamp":0}
                ]}"#,
            )
            .unwrap();
        let scores = HighScores::load(&store);
        assert_eq!(scores.entries[0].score, 30);
        assert_eq!(scores.entries[1].hits, 0);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1000), "1,000");
        assert_eq!(format_score(1234567), "1,234,567");
    }

    #[test]
    fn test_relative_dates() {
        let now = 1_700_000_000_000.0;
        assert_eq!(format_relative_date(now, now - 5_000.0), "Just now");
        assert_eq!(format_relative_date(now, now - 60_000.0), "1 min ago");
        assert_eq!(format_relative_date(now, now - 5.0 * 60_000.0), "5 mins ago");
        assert_eq!(format_relative_date(now, now - 3_600_000.0), "1 hour ago");
        assert_eq!(format_relative_date(now, now - 86_400_000.0), "Yesterday");
        assert_eq!(format_relative_date(now, now - 3.0 * 86_400_000.0), "3 days ago");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_calendar_date_is_local() {
        use chrono::{Local, TimeZone};

        // Late evening local time must not roll over to the next day
        let late = Local.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap();
        assert_eq!(calendar_date(late.timestamp_millis() as f64), "2/29/24");
        let early = Local.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(calendar_date(early.timestamp_millis() as f64), "3/1/24");

        let now = early.timestamp_millis() as f64 + 10.0 * 86_400_000.0;
        assert_eq!(format_relative_date(now, late.timestamp_millis() as f64), "2/29/24");
    }
}
