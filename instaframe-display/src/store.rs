//! Persisted freshness record
//!
//! Stored as a small JSON object, `{"imageDate": <seconds>}`. A missing or
//! unreadable file is replaced by one holding the sentinel, so the next
//! artifact in the mailbox is shown whatever its timestamp.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use instaframe_core::sync::FreshnessRecord;

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    #[serde(rename = "imageDate")]
    image_date: f64,
}

/// File-backed freshness record
#[derive(Debug, Clone)]
pub struct FreshnessStore {
    path: PathBuf,
}

impl FreshnessStore {
    /// Create a store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, creating the file if needed
    pub fn load(&self) -> FreshnessRecord {
        match self.read() {
            Ok(record) => {
                info!("last shown image date: {}", record.last_consumed());
                return record;
            }
            Err(err) => {
                let not_found = err
                    .downcast_ref::<io::Error>()
                    .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
                if !not_found {
                    warn!("ignoring unreadable {}: {err:#}", self.path.display());
                }
            }
        }

        let record = FreshnessRecord::new();
        if let Err(err) = self.save(&record) {
            warn!("could not write {}: {err:#}", self.path.display());
        }
        record
    }

    fn read(&self) -> Result<FreshnessRecord> {
        let text = fs::read_to_string(&self.path)?;
        let state: StoredState = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(FreshnessRecord::from_timestamp(state.image_date))
    }

    /// Write the record
    pub fn save(&self, record: &FreshnessRecord) -> Result<()> {
        let state = StoredState {
            image_date: record.last_consumed(),
        };
        let text = serde_json::to_string(&state)?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))
    }
}
