use std::time::Instant;

use tracing::debug;

use crate::engine::metrics::classify_word;
use crate::session::result::TestResult;
use crate::session::test::{CommittedWord, TestStatus, TypingTest};

/// Feed one typed character. A space commits the current word.
///
/// Returns the result when this keystroke ended the test.
pub fn process_char(test: &mut TypingTest, ch: char, now: Instant) -> Option<TestResult> {
    if test.status == TestStatus::Done {
        return None;
    }
    if ch == ' ' {
        return commit_word(test, now);
    }
    if ch.is_control() {
        return None;
    }
    if test.status == TestStatus::Idle {
        test.start(now);
    }
    test.input_buffer.push(ch);
    None
}

pub fn process_backspace(test: &mut TypingTest) {
    if test.status == TestStatus::Done {
        return;
    }
    test.input_buffer.pop();
}

/// Score the buffered word against its target and move to the next word.
///
/// An empty buffer is ignored. A missing or empty target scores nothing but
/// still advances.
pub fn commit_word(test: &mut TypingTest, now: Instant) -> Option<TestResult> {
    if test.status != TestStatus::Running {
        return None;
    }
    let typed = test.input_buffer.trim().to_string();
    if typed.is_empty() {
        test.input_buffer.clear();
        return None;
    }
    let target = test
        .words
        .get(test.current_word_index)
        .cloned()
        .unwrap_or_default();

    let mut correct = false;
    if !target.is_empty() {
        let classes = classify_word(&typed, &target);
        correct = classes.iter().all(|c| c.is_correct());
        for class in classes {
            test.counts.record(class);
        }
    }
    debug!(index = test.current_word_index, typed, target, correct, "word committed");

    test.committed.push(CommittedWord {
        typed,
        target,
        correct,
    });
    test.current_word_index += 1;
    test.input_buffer.clear();

    if test.current_word_index >= test.word_limit {
        return test.finish(now);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Passage, WordSource};
    use crate::session::mode::TestMode;

    struct PassageOnly(&'static str);

    impl WordSource for PassageOnly {
        fn random_word(&mut self) -> String {
            "word".into()
        }
        fn random_passage(&mut self, _nominal: usize) -> Passage {
            Passage::new(self.0.into())
        }
        fn themed_word(&mut self, _tier: &str) -> String {
            "word".into()
        }
    }

    fn word_test(passage: &'static str) -> TypingTest {
        let count = passage.split_whitespace().count();
        TypingTest::new(TestMode::WordCount(count), &mut PassageOnly(passage))
    }

    #[test]
    fn test_helllo_against_hello() {
        let mut test = word_test("hello there");
        let now = Instant::now();
        for ch in "helllo".chars() {
            process_char(&mut test, ch, now);
        }
        process_char(&mut test, ' ', now);

        let counts = test.counts();
        assert_eq!(counts.total, 6);
        assert_eq!(counts.correct, 4);
        assert_eq!(counts.incorrect, 2);
        assert_eq!(counts.errors, 2);
        assert_eq!(counts.total, counts.correct + counts.incorrect);
        assert_eq!(test.current_word_index(), 1);
        assert_eq!(test.input_buffer(), "");
        assert!(!test.last_committed().unwrap().correct);
    }

    #[test]
    fn test_space_on_empty_buffer_does_not_advance() {
        let mut test = word_test("a b");
        let now = Instant::now();
        process_char(&mut test, 'a', now);
        process_char(&mut test, ' ', now);
        process_char(&mut test, ' ', now);
        assert_eq!(test.current_word_index(), 1);
        assert_eq!(test.counts().total, 1);
    }

    #[test]
    fn test_space_before_start_is_ignored() {
        let mut test = word_test("a b");
        process_char(&mut test, ' ', Instant::now());
        assert_eq!(test.status(), TestStatus::Idle);
        assert_eq!(test.current_word_index(), 0);
    }

    #[test]
    fn test_backspace_edits_current_word() {
        let mut test = word_test("cat dog");
        let now = Instant::now();
        for ch in "cax".chars() {
            process_char(&mut test, ch, now);
        }
        process_backspace(&mut test);
        process_char(&mut test, 't', now);
        process_char(&mut test, ' ', now);
        assert_eq!(test.counts().correct, 3);
        assert_eq!(test.counts().errors, 0);
        assert!(test.last_committed().unwrap().correct);
    }

    #[test]
    fn test_short_word_counts_missing_positions() {
        let mut test = word_test("hello there");
        let now = Instant::now();
        for ch in "he ".chars() {
            process_char(&mut test, ch, now);
        }
        assert_eq!(test.counts().total, 5);
        assert_eq!(test.counts().correct, 2);
        assert_eq!(test.counts().errors, 3);
    }

    #[test]
    fn test_total_equals_correct_plus_incorrect_throughout() {
        let mut test = word_test("the quick brown fox jumps");
        let now = Instant::now();
        for typed in ["teh", "quick", "brwn", "foxes", "jump"] {
            for ch in typed.chars() {
                process_char(&mut test, ch, now);
            }
            process_char(&mut test, ' ', now);
            let c = test.counts();
            assert_eq!(c.total, c.correct + c.incorrect);
        }
        assert!(test.is_done());
    }
}
