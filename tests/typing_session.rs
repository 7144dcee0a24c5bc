use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use typesmash::bus::events::{BusEvent, EventBus};
use typesmash::generator::{Passage, WordSource};
use typesmash::session::input::{process_backspace, process_char};
use typesmash::session::mode::TestMode;
use typesmash::session::result::TestResult;
use typesmash::session::test::{TestStatus, TypingTest};

struct Script {
    passage: &'static str,
}

impl WordSource for Script {
    fn random_word(&mut self) -> String {
        "hello".into()
    }
    fn random_passage(&mut self, _nominal: usize) -> Passage {
        Passage::new(self.passage.into())
    }
    fn themed_word(&mut self, _tier: &str) -> String {
        "hello".into()
    }
}

fn type_text(test: &mut TypingTest, text: &str, now: Instant) -> Option<TestResult> {
    let mut result = None;
    for ch in text.chars() {
        if let Some(r) = process_char(test, ch, now) {
            result = Some(r);
        }
    }
    result
}

#[test]
fn extra_letter_counts_against_the_word() {
    let mut source = Script {
        passage: "hello world",
    };
    let mut test = TypingTest::new(TestMode::WordCount(20), &mut source);
    let t0 = Instant::now();

    type_text(&mut test, "helllo ", t0);

    let counts = test.counts();
    assert_eq!(counts.total, 6);
    assert_eq!(counts.correct, 4);
    assert_eq!(counts.incorrect, 2);
    assert_eq!(counts.errors, 2);
    assert!(!test.last_committed().unwrap().correct);
}

#[test]
fn timed_test_with_no_input_stays_idle() {
    let mut source = Script { passage: "" };
    let mut test = TypingTest::new(TestMode::Timed { secs: 15 }, &mut source);
    let t0 = Instant::now();

    assert_eq!(test.tick(t0 + Duration::from_secs(30)), None);
    assert_eq!(test.status(), TestStatus::Idle);
    assert_eq!(test.wpm(t0), 0);
    assert_eq!(test.accuracy(), 100);
    assert_eq!(test.counts().errors, 0);
}

#[test]
fn short_passage_runs_to_the_requested_count() {
    let mut source = Script {
        passage: "the sea is wide",
    };
    let mut test = TypingTest::new(TestMode::WordCount(6), &mut source);
    let t0 = Instant::now();
    assert_eq!(test.word_limit(), 6);

    assert!(type_text(&mut test, "the sea is wide ", t0).is_none());
    assert_eq!(test.current_word_index(), 4);
    assert!(type_text(&mut test, "and ", t0).is_none());
    let result = type_text(&mut test, "deep ", t0 + Duration::from_secs(12)).unwrap();

    assert_eq!(test.current_word_index(), 6);
    assert_eq!(result.total, 12);
    assert_eq!(result.accuracy, 100);
    assert_eq!(result.actual_word_count, 4);
    assert_eq!(result.divergent_word_count(), Some(4));
    assert_eq!(result.to_history_entry().mode_label(), "6w (4)");
    assert!(test.is_done());
    assert!(process_char(&mut test, 'x', t0 + Duration::from_secs(13)).is_none());
}

#[test]
fn long_passage_stops_at_the_requested_count() {
    let mut source = Script {
        passage: "one two three four five six",
    };
    let mut test = TypingTest::new(TestMode::WordCount(4), &mut source);
    let t0 = Instant::now();

    assert!(type_text(&mut test, "one two three ", t0).is_none());
    assert!(!test.is_done());
    let result = type_text(&mut test, "four ", t0 + Duration::from_secs(3)).unwrap();
    assert_eq!(test.current_word_index(), 4);
    assert_eq!(result.actual_word_count, 6);
    assert_eq!(result.to_history_entry().mode_label(), "4w (6)");
}

#[test]
fn backspace_edits_only_the_current_word() {
    let mut source = Script {
        passage: "sun moon",
    };
    let mut test = TypingTest::new(TestMode::WordCount(2), &mut source);
    let t0 = Instant::now();

    type_text(&mut test, "sun mx", t0);
    process_backspace(&mut test);
    process_backspace(&mut test);
    process_backspace(&mut test);
    assert_eq!(test.input_buffer(), "");
    assert_eq!(test.current_word_index(), 1);

    let result = type_text(&mut test, "moon ", t0 + Duration::from_secs(6)).unwrap();
    assert_eq!(result.errors, 0);
}

#[test]
fn timed_countdown_reports_through_the_bus_once() {
    let bus: EventBus<BusEvent> = EventBus::new();
    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&completed);
    bus.subscribe(move |event: &BusEvent| {
        if let BusEvent::TestCompleted(result) = event {
            sink.borrow_mut().push(result.clone());
        }
        Ok(())
    });

    let mut source = Script { passage: "" };
    let mut test = TypingTest::new(TestMode::Timed { secs: 15 }, &mut source);
    let t0 = Instant::now();
    type_text(&mut test, "hello hello ", t0);

    for s in 1..=20 {
        if let Some(result) = test.tick(t0 + Duration::from_secs(s)) {
            bus.publish(BusEvent::TestCompleted(result));
        }
    }

    let completed = completed.borrow();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].time_display, "15s");
    // 10 chars over 15 seconds.
    assert_eq!(completed[0].wpm, 8);
}

#[test]
fn reset_mid_test_cancels_the_countdown() {
    let mut source = Script { passage: "" };
    let mut test = TypingTest::new(TestMode::Timed { secs: 15 }, &mut source);
    let t0 = Instant::now();
    type_text(&mut test, "hel", t0);

    test.reset(TestMode::Timed { secs: 30 }, &mut source);
    assert_eq!(test.status(), TestStatus::Idle);
    assert_eq!(test.seconds_left(), 30);
    assert_eq!(test.tick(t0 + Duration::from_secs(60)), None);
}
