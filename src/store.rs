//! Persistence adapter: load, migrate and save the medication list.
//!
//! Storage is a single JSON blob behind the [`BlobStore`] trait. Loading
//! never fails: a missing or unparseable blob yields an empty list, and
//! records written by earlier releases (single `time` slot, `duration`,
//! `logs`, `lastTakenDate`) are upgraded to the current shape on read so
//! no schema-version logic leaks anywhere else.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::medication::parse_time_of_day;
use crate::models::MedicationRecord;

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════
// Blob storage
// ═══════════════════════════════════════════

/// Flat key/value blob storage. `get` is infallible by contract: any read
/// problem is reported as "no blob" so callers can fall back to defaults.
pub trait BlobStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One JSON file per key under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Store rooted at the app data directory (`~/MedRemind`).
    pub fn open_default() -> Self {
        Self::new(config::app_data_dir())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Blob read failed, treating as missing");
                None
            }
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a blob, e.g. with legacy-format data.
    pub fn with_blob(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.blobs.insert(key.to_string(), value.to_string());
        store
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.blobs.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Medication store: load / migrate / save
// ═══════════════════════════════════════════

/// Loose read shape accepting every schema version ever written. All
/// fields optional; precedence and defaults are applied in `migrate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    /// Current multi-slot shape.
    #[serde(default)]
    scheduled_times: Option<Vec<String>>,
    /// Legacy single-slot shape.
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    frequency: Option<u32>,
    #[serde(default)]
    duration_days: Option<u32>,
    /// Legacy name for the course length.
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    dose_log: Option<Vec<String>>,
    /// Legacy name for the dose log.
    #[serde(default)]
    logs: Option<Vec<String>>,
    #[serde(default)]
    last_taken_at: Option<String>,
    /// Legacy name for the cached last dose.
    #[serde(default)]
    last_taken_date: Option<String>,
}

/// Loads and saves the medication list through a [`BlobStore`].
pub struct MedicationStore {
    blobs: Box<dyn BlobStore>,
}

impl MedicationStore {
    pub fn new(blobs: Box<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Read the full list, upgrading any prior schema version in place.
    /// Never fails: a missing or unparseable blob is an empty list.
    pub fn load(&self) -> Vec<MedicationRecord> {
        let Some(raw) = self.blobs.get(config::MEDICATION_BLOB_KEY) else {
            return Vec::new();
        };
        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(error = %e, "Medication blob unparseable, starting empty");
                return Vec::new();
            }
        };
        let now = Utc::now();
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawRecord>(value) {
                Ok(raw) => migrate_record(raw, now),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed medication entry");
                    None
                }
            })
            .collect()
    }

    /// Serialize the full list and overwrite the blob. Last writer wins.
    pub fn save(&mut self, records: &[MedicationRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.blobs.put(config::MEDICATION_BLOB_KEY, &json)?;
        tracing::debug!(count = records.len(), "Saved medication list");
        Ok(())
    }
}

/// Upgrade one loosely-parsed record to the current shape. Returns `None`
/// only when no usable name is present.
fn migrate_record(raw: RawRecord, now: DateTime<Utc>) -> Option<MedicationRecord> {
    let name = raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let Some(name) = name else {
        tracing::warn!("Dropping medication entry without a name");
        return None;
    };

    // Legacy ids were arbitrary strings; anything that is not a UUID gets
    // a fresh one, assigned once and persisted on the next save.
    let id = raw
        .id
        .and_then(|s| s.parse::<Uuid>().ok())
        .unwrap_or_else(Uuid::new_v4);

    // An absent log field is seeded from the legacy single "last taken"
    // value; a present-but-empty log stays empty.
    let dose_log = match raw.dose_log.or(raw.logs) {
        Some(entries) => parse_timestamps(&entries, &name),
        None => parse_timestamp(raw.last_taken_at.or(raw.last_taken_date).as_deref())
            .into_iter()
            .collect(),
    };
    let last_taken_at = dose_log.last().copied();

    let scheduled_times = match raw.scheduled_times {
        Some(slots) => parse_slots(&slots, &name),
        None => raw
            .time
            .as_deref()
            .and_then(|t| parse_time_of_day(t).ok())
            .map(|t| vec![t])
            .unwrap_or_default(),
    };
    let scheduled_times = if scheduled_times.is_empty() {
        tracing::warn!(name = %name, "No usable dose time, defaulting to 08:00");
        vec![NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)]
    } else {
        scheduled_times
    };

    let frequency = raw.frequency.filter(|f| *f > 0).unwrap_or(1);
    let duration_days = raw
        .duration_days
        .or(raw.duration)
        .filter(|d| *d > 0)
        .unwrap_or(30);
    let start_date = parse_timestamp(raw.start_date.as_deref()).unwrap_or(now);

    Some(MedicationRecord {
        id,
        name,
        scheduled_times,
        frequency,
        duration_days,
        start_date,
        dose_log,
        last_taken_at,
    })
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn parse_timestamps(entries: &[String], name: &str) -> Vec<DateTime<Utc>> {
    entries
        .iter()
        .filter_map(|entry| {
            let parsed = parse_timestamp(Some(entry));
            if parsed.is_none() {
                tracing::warn!(name = %name, entry = %entry, "Skipping unparseable dose timestamp");
            }
            parsed
        })
        .collect()
}

fn parse_slots(slots: &[String], name: &str) -> Vec<NaiveTime> {
    slots
        .iter()
        .filter_map(|slot| {
            let parsed = parse_time_of_day(slot).ok();
            if parsed.is_none() {
                tracing::warn!(name = %name, slot = %slot, "Skipping unparseable dose time");
            }
            parsed
        })
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
