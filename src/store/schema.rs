use serde::{Deserialize, Serialize};

use crate::store::history::HistoryEntry;

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk layout of `history.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub entries: Vec<HistoryEntry>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl HistoryData {
    /// Data written by an incompatible version is discarded rather than
    /// half-read.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
