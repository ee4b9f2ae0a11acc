//! Medication list coordinator.
//!
//! Owns the in-memory record list and the storage behind it. Every
//! mutation goes through here and is followed by a save, so the blob
//! always reflects the latest committed list. Reads hand out the list
//! as a snapshot slice; derivations stay pure functions over it.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{MedicationDraft, MedicationRecord, ValidationError};
use crate::store::MedicationStore;

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("No medication with id {id}")]
    NotFound { id: Uuid },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ═══════════════════════════════════════════
// Tracker
// ═══════════════════════════════════════════

pub struct MedicationTracker {
    records: Vec<MedicationRecord>,
    store: MedicationStore,
}

impl MedicationTracker {
    /// Loads whatever the store holds. A missing or unreadable blob
    /// starts the tracker with an empty list.
    pub fn open(store: MedicationStore) -> Self {
        let records = store.load();
        Self { records, store }
    }

    pub fn records(&self) -> &[MedicationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&MedicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Validates the draft, appends the new record and saves.
    pub fn add(&mut self, draft: MedicationDraft) -> Result<MedicationRecord, TrackerError> {
        let record = MedicationRecord::new(draft, chrono::Utc::now())?;
        self.records.push(record.clone());
        self.persist();
        Ok(record)
    }

    /// Replaces the schedule fields of an existing record. The id,
    /// start date and dose log are untouched.
    pub fn edit(
        &mut self,
        id: Uuid,
        draft: MedicationDraft,
    ) -> Result<MedicationRecord, TrackerError> {
        let index = self.index_of(id)?;
        let updated = self.records[index].with_details(draft)?;
        self.records[index] = updated.clone();
        self.persist();
        Ok(updated)
    }

    /// Appends one dose timestamped now to the record's log.
    pub fn take_dose(&mut self, id: Uuid) -> Result<MedicationRecord, TrackerError> {
        let index = self.index_of(id)?;
        let updated = self.records[index].with_dose_logged(chrono::Utc::now());
        self.records[index] = updated.clone();
        self.persist();
        Ok(updated)
    }

    /// Removes the record outright. Confirmation is the caller's job.
    pub fn remove(&mut self, id: Uuid) -> Result<MedicationRecord, TrackerError> {
        let index = self.index_of(id)?;
        let removed = self.records.remove(index);
        self.persist();
        Ok(removed)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, TrackerError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(TrackerError::NotFound { id })
    }

    // Writes are fire-and-forget: a failed save keeps the in-memory
    // mutation and logs, it never rolls back or surfaces to the caller.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.records) {
            tracing::warn!(error = %e, "Failed to persist medication list");
        }
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
