//! Medication record model: the entity everything else derives from.
//!
//! A record describes one recurring course: what to take, how many times a
//! day, at which wall-clock times, for how long, plus the append-only log
//! of every confirmed dose. All mutation goes through the structural-update
//! constructors so holders of an older snapshot are never surprised.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

/// Boundary validation failures for add/edit input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Medication name must not be empty")]
    EmptyName,
    #[error("At least one scheduled time is required")]
    NoScheduledTimes,
    #[error("Doses per day must be at least 1")]
    ZeroFrequency,
    #[error("Course duration must be at least 1 day")]
    ZeroDuration,
    #[error("Expected {frequency} scheduled times, got {slots}")]
    FrequencyMismatch { frequency: u32, slots: usize },
    #[error("Invalid time of day: {value}")]
    InvalidTime { value: String },
}

// ═══════════════════════════════════════════
// Record + draft
// ═══════════════════════════════════════════

/// One medication course with its dose history.
///
/// Serialized field names are camelCase to stay compatible with the data
/// files written by earlier releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    pub id: Uuid,
    pub name: String,
    /// Wall-clock dose slots, one per daily dose for records created
    /// through the current boundary. Migrated legacy records may carry
    /// fewer slots than `frequency`.
    #[serde(with = "hhmm_times")]
    pub scheduled_times: Vec<NaiveTime>,
    /// Target doses per calendar day.
    pub frequency: u32,
    /// Total course length in days.
    pub duration_days: u32,
    /// Fixed at creation; never edited.
    pub start_date: DateTime<Utc>,
    /// Append-only, chronological: entries are only ever pushed with the
    /// current instant.
    pub dose_log: Vec<DateTime<Utc>>,
    /// Cached copy of `dose_log.last()`; recomputed on every log append,
    /// never set independently.
    pub last_taken_at: Option<DateTime<Utc>>,
}

/// Validated input shape for add and edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDraft {
    pub name: String,
    pub scheduled_times: Vec<NaiveTime>,
    pub frequency: u32,
    pub duration_days: u32,
}

impl MedicationDraft {
    /// Convenience constructor for the common one-dose-per-day case.
    pub fn once_daily(name: impl Into<String>, time: NaiveTime, duration_days: u32) -> Self {
        Self {
            name: name.into(),
            scheduled_times: vec![time],
            frequency: 1,
            duration_days,
        }
    }

    /// Reject malformed input before any record is created or mutated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.scheduled_times.is_empty() {
            return Err(ValidationError::NoScheduledTimes);
        }
        if self.frequency == 0 {
            return Err(ValidationError::ZeroFrequency);
        }
        if self.duration_days == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        if self.scheduled_times.len() != self.frequency as usize {
            return Err(ValidationError::FrequencyMismatch {
                frequency: self.frequency,
                slots: self.scheduled_times.len(),
            });
        }
        Ok(())
    }
}

impl MedicationRecord {
    /// Create a fresh record from a validated draft. The id and start date
    /// are assigned here and never change afterwards.
    pub fn new(draft: MedicationDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            scheduled_times: draft.scheduled_times,
            frequency: draft.frequency,
            duration_days: draft.duration_days,
            start_date: now,
            dose_log: Vec::new(),
            last_taken_at: None,
        })
    }

    /// Record one dose taken at `at`. Returns the updated record; the log
    /// is append-only and `last_taken_at` is refreshed from it.
    pub fn with_dose_logged(&self, at: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.dose_log.push(at);
        updated.last_taken_at = Some(at);
        updated
    }

    /// Replace the editable fields from a validated draft. Identity, start
    /// date and the dose log are untouched.
    pub fn with_details(&self, draft: MedicationDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        let mut updated = self.clone();
        updated.name = draft.name.trim().to_string();
        updated.scheduled_times = draft.scheduled_times;
        updated.frequency = draft.frequency;
        updated.duration_days = draft.duration_days;
        Ok(updated)
    }

    /// First dose slot of the day. Records always carry at least one slot
    /// after migration, but a missing slot degrades to midnight rather
    /// than panicking.
    pub fn first_scheduled_time(&self) -> NaiveTime {
        self.scheduled_times
            .first()
            .copied()
            .unwrap_or(NaiveTime::MIN)
    }
}

/// Parse a wall-clock slot. Accepts `HH:MM` (the stored form) and
/// `HH:MM:SS` (written by some earlier builds).
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime {
            value: value.to_string(),
        })
}

// ═══════════════════════════════════════════
// Serde: dose slots as "HH:MM" strings
// ═══════════════════════════════════════════

mod hhmm_times {
    use chrono::NaiveTime;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(times: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(times.len()))?;
        for t in times {
            seq.serialize_element(&t.format("%H:%M").to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| super::parse_time_of_day(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
