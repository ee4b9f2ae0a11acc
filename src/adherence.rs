//! Daily adherence aggregation across the whole medication list.
//!
//! Rolls per-medication dose counts into the home-screen totals and the
//! three buckets the voice summary reads from. Totals are raw sums, so
//! doses logged beyond a medication's daily frequency still count.

use chrono::{DateTime, Local, NaiveTime};

use crate::models::MedicationRecord;
use crate::schedule;

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// One medication's standing for today, reduced to what the summary needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AdherenceEntry {
    pub name: String,
    pub taken_today: u32,
    pub frequency: u32,
    pub first_time: NaiveTime,
}

/// Whole-list rollup for the current local day.
///
/// The buckets partition the list by dose count: `completed` holds
/// medications at or past their daily frequency, `partial` those with at
/// least one dose but not all, `not_started` those with none. Bucket
/// order follows list order.
#[derive(Debug, Clone, PartialEq)]
pub struct AdherenceSummary {
    pub completed: Vec<AdherenceEntry>,
    pub partial: Vec<AdherenceEntry>,
    pub not_started: Vec<AdherenceEntry>,
    pub total_scheduled_today: u32,
    pub total_taken_today: u32,
}

impl AdherenceSummary {
    pub fn medication_count(&self) -> usize {
        self.completed.len() + self.partial.len() + self.not_started.len()
    }

    /// True when every medication in a non-empty list is complete.
    pub fn is_all_complete(&self) -> bool {
        !self.completed.is_empty() && self.partial.is_empty() && self.not_started.is_empty()
    }

    /// Overall progress for the header bar. Zero when nothing is
    /// scheduled today.
    pub fn progress_percent(&self) -> f64 {
        if self.total_scheduled_today == 0 {
            return 0.0;
        }
        f64::from(self.total_taken_today) / f64::from(self.total_scheduled_today) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Rollup
// ---------------------------------------------------------------------------

/// Partitions the list by today's dose counts and sums the day's totals.
pub fn summarize(records: &[MedicationRecord], now: DateTime<Local>) -> AdherenceSummary {
    let mut summary = AdherenceSummary {
        completed: Vec::new(),
        partial: Vec::new(),
        not_started: Vec::new(),
        total_scheduled_today: 0,
        total_taken_today: 0,
    };

    for record in records {
        let taken = schedule::taken_today(record, now);
        summary.total_scheduled_today += record.frequency;
        summary.total_taken_today += taken;

        let entry = AdherenceEntry {
            name: record.name.clone(),
            taken_today: taken,
            frequency: record.frequency,
            first_time: record.first_scheduled_time(),
        };
        if taken >= record.frequency {
            summary.completed.push(entry);
        } else if taken > 0 {
            summary.partial.push(entry);
        } else {
            summary.not_started.push(entry);
        }
    }

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
