//! Pure metric calculations shared by the typing test and the arcade summary.

use std::time::Duration;

/// Characters per "word" in the WPM convention.
const CHARS_PER_WORD: f64 = 5.0;

/// Running character tallies for one test.
///
/// Every classified position lands in exactly one of `correct` or `incorrect`,
/// so `total == correct + incorrect` holds by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharCounts {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    pub errors: usize,
}

impl CharCounts {
    pub fn record(&mut self, class: CharClass) {
        self.total += 1;
        match class {
            CharClass::Correct => self.correct += 1,
            CharClass::Incorrect | CharClass::Missing | CharClass::Extra => {
                self.incorrect += 1;
                self.errors += 1;
            }
        }
    }

    pub fn accuracy(&self) -> u32 {
        calculate_accuracy(self.correct, self.total)
    }

    pub fn error_rate(&self) -> u32 {
        calculate_error_rate(self.errors, self.total)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    /// Typed a different character at a position both words share.
    Incorrect,
    /// Target position the typed word never reached.
    Missing,
    /// Typed beyond the end of the target.
    Extra,
}

impl CharClass {
    pub fn is_correct(self) -> bool {
        matches!(self, CharClass::Correct)
    }
}

/// Position-by-position comparison of a committed word against its target.
///
/// Word-local and not alignment-aware: an inserted character shifts every
/// later position of that word into `Incorrect`.
pub fn classify_word(typed: &str, target: &str) -> Vec<CharClass> {
    let typed: Vec<char> = typed.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let len = typed.len().max(target.len());

    (0..len)
        .map(|i| match (typed.get(i), target.get(i)) {
            (Some(t), Some(e)) if t == e => CharClass::Correct,
            (Some(_), Some(_)) => CharClass::Incorrect,
            (None, Some(_)) => CharClass::Missing,
            (Some(_), None) | (None, None) => CharClass::Extra,
        })
        .collect()
}

/// Live classification of the in-progress word; only typed positions.
pub fn classify_partial(typed: &str, target: &str) -> Vec<CharClass> {
    let mut target_chars = target.chars();
    typed
        .chars()
        .map(|t| match target_chars.next() {
            Some(e) if e == t => CharClass::Correct,
            Some(_) => CharClass::Incorrect,
            None => CharClass::Extra,
        })
        .collect()
}

/// Net words per minute, rounded.
///
/// `gross = (total / 5) / minutes`, `net = max(0, gross - errors / minutes)`.
/// Returns 0 when no time has elapsed.
pub fn calculate_wpm(total_chars: usize, errors: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    let gross = (total_chars as f64 / CHARS_PER_WORD) / minutes;
    let net = (gross - errors as f64 / minutes).max(0.0);
    net.round() as u32
}

/// Gross WPM from correct characters only; used for arcade summaries.
pub fn calculate_gross_wpm(chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    ((chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

pub fn calculate_accuracy(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (100.0 * correct as f64 / total as f64).round().clamp(0.0, 100.0) as u32
}

pub fn calculate_error_rate(errors: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * errors as f64 / total as f64).round().clamp(0.0, 100.0) as u32
}
