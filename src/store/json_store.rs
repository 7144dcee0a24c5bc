use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::Result;
use crate::store::history::{HistoryBackend, HistoryEntry};
use crate::store::schema::HistoryData;

const HISTORY_FILE: &str = "history.json";

/// JSON files under the platform data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typesmash")
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing or unreadable files load as `T::default()`.
    fn load_json<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                T::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable store file, starting empty");
                T::default()
            }
        }
    }

    /// Write to a temp file and rename over the target.
    fn save_json<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_history_data(&self) -> HistoryData {
        let data: HistoryData = self.load_json(HISTORY_FILE);
        if data.needs_reset() {
            warn!(
                version = data.schema_version,
                "history written by an unknown schema version, starting empty"
            );
            return HistoryData::default();
        }
        data
    }

    pub fn save_history_data(&self, data: &HistoryData) -> Result<()> {
        self.save_json(HISTORY_FILE, data)
    }
}

impl HistoryBackend for JsonStore {
    fn load(&self) -> Vec<HistoryEntry> {
        self.load_history_data().entries
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> anyhow::Result<()> {
        let data = HistoryData {
            entries: entries.to_vec(),
            ..HistoryData::default()
        };
        Ok(self.save_history_data(&data)?)
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        let path = self.file_path(HISTORY_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
