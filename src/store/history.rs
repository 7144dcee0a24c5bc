use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Entries shown in the chart.
pub const CHART_ENTRIES: usize = 10;

/// Time limit of entries stored with the bare `"timed"` tag.
pub const DEFAULT_TIMED_SECS: u32 = 15;

/// What kind of session produced an entry. Stored as `"timed-<secs>"`
/// (`"timed"` for the default limit), `"word-<n>"` or `"zoro"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HistoryMode {
    Timed(u32),
    Words(usize),
    Zoro,
}

impl HistoryMode {
    pub fn tag(self) -> String {
        match self {
            HistoryMode::Timed(DEFAULT_TIMED_SECS) => "timed".to_string(),
            HistoryMode::Timed(secs) => format!("timed-{secs}"),
            HistoryMode::Words(n) => format!("word-{n}"),
            HistoryMode::Zoro => "zoro".to_string(),
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "timed" => Some(HistoryMode::Timed(DEFAULT_TIMED_SECS)),
            "zoro" => Some(HistoryMode::Zoro),
            _ => {
                if let Some(secs) = tag.strip_prefix("timed-") {
                    secs.parse().ok().map(HistoryMode::Timed)
                } else {
                    tag.strip_prefix("word-")
                        .and_then(|n| n.parse().ok())
                        .map(HistoryMode::Words)
                }
            }
        }
    }
}

impl From<HistoryMode> for String {
    fn from(mode: HistoryMode) -> Self {
        mode.tag()
    }
}

impl TryFrom<String> for HistoryMode {
    type Error = String;

    fn try_from(tag: String) -> std::result::Result<Self, Self::Error> {
        HistoryMode::parse(&tag).ok_or_else(|| format!("unknown history mode `{tag}`"))
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Extra numbers recorded for arcade games.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcadeStats {
    pub score: u32,
    pub level: u32,
    pub max_combo: u32,
    pub tier: String,
    pub duration_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub wpm: u32,
    pub accuracy: u32,
    pub mode: HistoryMode,
    /// Correct characters.
    pub chars: usize,
    pub errors: usize,
    pub time: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arcade: Option<ArcadeStats>,
}

impl HistoryEntry {
    pub fn mode_label(&self) -> String {
        format_mode(self.mode, self.actual_word_count)
    }

    pub fn local_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Human label for a mode: `15s`, `20w`, `20w (22)`, `Zoro`.
pub fn format_mode(mode: HistoryMode, actual_word_count: Option<usize>) -> String {
    match mode {
        HistoryMode::Timed(secs) => format!("{secs}s"),
        HistoryMode::Words(n) => match actual_word_count {
            Some(actual) if actual != n => format!("{n}w ({actual})"),
            _ => format!("{n}w"),
        },
        HistoryMode::Zoro => "Zoro".to_string(),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Mode(HistoryMode),
}

impl HistoryFilter {
    pub fn matches(self, entry: &HistoryEntry) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Mode(mode) => entry.mode == mode,
        }
    }

    pub fn label(self) -> String {
        match self {
            HistoryFilter::All => "All".to_string(),
            HistoryFilter::Mode(mode) => format_mode(mode, None),
        }
    }
}

/// Where entries are persisted.
pub trait HistoryBackend {
    fn load(&self) -> Vec<HistoryEntry>;
    fn save(&mut self, entries: &[HistoryEntry]) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Keeps entries in memory only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Vec<HistoryEntry>,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Vec<HistoryEntry> {
        self.entries.clone()
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("memory backend is read-only");
        }
        self.writes += 1;
        self.entries = entries.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// One line or bar group in the chart, aligned to `ChartData::labels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSeries {
    pub mode: HistoryMode,
    pub label: String,
    pub points: Vec<Option<u32>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartData {
    /// `Test 1` is the oldest charted entry.
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Newest-first, capped log of results.
pub struct HistoryStore {
    backend: Box<dyn HistoryBackend>,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(backend: Box<dyn HistoryBackend>, max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        let mut entries = backend.load();
        entries.truncate(max_entries);
        debug!(entries = entries.len(), "history loaded");
        Self {
            backend,
            entries,
            max_entries,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend and evict the oldest past the cap. Write failures are logged;
    /// the in-memory log still has the entry.
    pub fn append(&mut self, entry: HistoryEntry) {
        debug!(mode = %entry.mode, wpm = entry.wpm, "history append");
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_entries);
        if let Err(e) = self.backend.save(&self.entries) {
            warn!(error = %e, "failed to persist history");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.backend.clear() {
            warn!(error = %e, "failed to clear stored history");
        }
    }

    /// Re-read from the backend, dropping anything not persisted.
    pub fn reload(&mut self) {
        self.entries = self.backend.load();
        self.entries.truncate(self.max_entries);
    }

    pub fn filter(&self, filter: HistoryFilter) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Distinct modes present, in a stable order for filter cycling.
    pub fn modes(&self) -> Vec<HistoryMode> {
        let mut modes: Vec<HistoryMode> = self.entries.iter().map(|e| e.mode).collect();
        modes.sort();
        modes.dedup();
        modes
    }

    /// The filter after `current` in `All, <modes...>` order, wrapping.
    pub fn next_filter(&self, current: HistoryFilter) -> HistoryFilter {
        let mut cycle = vec![HistoryFilter::All];
        cycle.extend(self.modes().into_iter().map(HistoryFilter::Mode));
        match cycle.iter().position(|f| *f == current) {
            Some(i) => cycle[(i + 1) % cycle.len()],
            None => HistoryFilter::All,
        }
    }

    /// WPM of the latest entries matching `filter`, grouped by mode and
    /// ordered oldest to newest.
    pub fn chart(&self, filter: HistoryFilter) -> ChartData {
        let recent: Vec<&HistoryEntry> = self
            .filter(filter)
            .into_iter()
            .take(CHART_ENTRIES)
            .collect();
        let n = recent.len();
        let labels = (1..=n).map(|i| format!("Test {i}")).collect();

        let mut series: Vec<ChartSeries> = Vec::new();
        for (idx, entry) in recent.iter().enumerate() {
            let slot = n - 1 - idx;
            let pos = match series.iter().position(|s| s.mode == entry.mode) {
                Some(pos) => pos,
                None => {
                    series.push(ChartSeries {
                        mode: entry.mode,
                        label: format_mode(entry.mode, None),
                        points: vec![None; n],
                    });
                    series.len() - 1
                }
            };
            series[pos].points[slot] = Some(entry.wpm);
        }
        ChartData { labels, series }
    }
}
