use std::fs;
use std::time::Instant;

use chrono::Utc;
use tempfile::TempDir;

use typesmash::app::App;
use typesmash::config::Config;
use typesmash::store::history::{HistoryEntry, HistoryFilter, HistoryMode, HistoryStore};
use typesmash::store::json_store::JsonStore;

fn entry(wpm: u32, mode: HistoryMode) -> HistoryEntry {
    HistoryEntry {
        wpm,
        accuracy: 96,
        mode,
        chars: 120,
        errors: 3,
        time: "15s".into(),
        timestamp: Utc::now(),
        actual_word_count: None,
        arcade: None,
    }
}

fn store_in(dir: &TempDir, cap: usize) -> HistoryStore {
    let backend = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    HistoryStore::new(Box::new(backend), cap)
}

#[test]
fn entries_survive_a_reload() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = store_in(&dir, 100);
        store.append(entry(40, HistoryMode::Timed(15)));
        store.append(entry(55, HistoryMode::Words(50)));
    }

    let store = store_in(&dir, 100);
    assert_eq!(store.len(), 2);
    assert_eq!(store.entries()[0].wpm, 55);
    assert_eq!(store.entries()[0].mode, HistoryMode::Words(50));
    assert_eq!(store.entries()[1].mode, HistoryMode::Timed(15));
}

#[test]
fn cap_evicts_the_oldest() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir, 3);
    for wpm in [10, 20, 30, 40] {
        store.append(entry(wpm, HistoryMode::Timed(15)));
    }
    let wpms: Vec<u32> = store_in(&dir, 3).entries().iter().map(|e| e.wpm).collect();
    assert_eq!(wpms, vec![40, 30, 20]);
}

#[test]
fn corrupt_file_loads_empty_and_is_replaced() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("history.json"), "{ not json").unwrap();

    let mut store = store_in(&dir, 100);
    assert!(store.is_empty());

    store.append(entry(61, HistoryMode::Zoro));
    assert_eq!(store_in(&dir, 100).len(), 1);
}

#[test]
fn clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir, 100);
    store.append(entry(40, HistoryMode::Timed(15)));
    store.clear();

    assert!(store.is_empty());
    assert!(store_in(&dir, 100).is_empty());
}

#[test]
fn chart_groups_recent_entries_by_mode() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir, 100);
    store.append(entry(30, HistoryMode::Timed(15)));
    store.append(entry(45, HistoryMode::Words(20)));
    store.append(entry(35, HistoryMode::Timed(15)));

    let chart = store.chart(HistoryFilter::All);
    assert_eq!(chart.labels, vec!["Test 1", "Test 2", "Test 3"]);
    let timed = chart
        .series
        .iter()
        .find(|s| s.mode == HistoryMode::Timed(15))
        .unwrap();
    assert_eq!(timed.points, vec![Some(30), None, Some(35)]);

    let words_only = store.chart(HistoryFilter::Mode(HistoryMode::Words(20)));
    assert_eq!(words_only.labels.len(), 1);
    assert_eq!(words_only.series.len(), 1);
}

#[test]
fn app_records_an_abandoned_arcade_run_to_disk() {
    let dir = TempDir::new().unwrap();
    let backend = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut app = App::with_backend(Config::default(), Box::new(backend), Some(11));

    let t0 = Instant::now();
    app.start_arcade(t0);
    app.quit(t0 + std::time::Duration::from_secs(2));
    assert!(app.should_quit);

    let reloaded = store_in(&dir, 100);
    assert_eq!(reloaded.len(), 1);
    let saved = &reloaded.entries()[0];
    assert_eq!(saved.mode, HistoryMode::Zoro);
    assert_eq!(saved.mode_label(), "Zoro");
    assert_eq!(saved.time, "0:02");
}
