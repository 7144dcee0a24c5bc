use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::session::mode::TestMode;
use crate::store::history::{HistoryEntry, HistoryMode};

#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    pub mode: TestMode,
    pub wpm: u32,
    pub accuracy: u32,
    pub error_rate: u32,
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    pub errors: usize,
    pub elapsed: Duration,
    pub time_display: String,
    /// Requested word count for passage tests.
    pub nominal_word_count: Option<usize>,
    pub actual_word_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    /// The passage length, only when it differs from what was asked for.
    pub fn divergent_word_count(&self) -> Option<usize> {
        match self.nominal_word_count {
            Some(n) if n != self.actual_word_count => Some(self.actual_word_count),
            _ => None,
        }
    }

    pub fn to_history_entry(&self) -> HistoryEntry {
        let mode = match self.mode {
            TestMode::Timed { secs } => HistoryMode::Timed(secs),
            TestMode::WordCount(n) => HistoryMode::Words(n),
        };
        HistoryEntry {
            wpm: self.wpm,
            accuracy: self.accuracy,
            mode,
            chars: self.correct,
            errors: self.errors,
            time: self.time_display.clone(),
            timestamp: self.timestamp,
            actual_word_count: self.divergent_word_count(),
            arcade: None,
        }
    }
}
