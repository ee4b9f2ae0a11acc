//! Dose schedule calculator: today's facts derived from one record.
//!
//! Everything here is a pure function of a record snapshot plus the current
//! instant: dose counts compare calendar dates in the caller's local
//! timezone, course progress is day-resolution, and the next-dose slot
//! falls back to a four-hour gap for records migrated from the
//! single-time era. No state is retained between calls.

use chrono::{DateTime, Duration, Local, NaiveTime};

use crate::models::MedicationRecord;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// When the next dose falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextDose {
    /// Upcoming (or missed) dose in the current day cycle. `overdue` is
    /// set when the computed time has already passed.
    Today { at: NaiveTime, overdue: bool },
    /// All of today's doses are done; the cycle restarts at the first
    /// slot tomorrow.
    Tomorrow { at: NaiveTime },
}

impl NextDose {
    pub fn at(&self) -> NaiveTime {
        match self {
            NextDose::Today { at, .. } | NextDose::Tomorrow { at } => *at,
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, NextDose::Today { overdue: true, .. })
    }
}

/// Derived adherence facts for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseStatus {
    /// Doses logged on today's local calendar date.
    pub taken_today: u32,
    /// `taken_today >= frequency`. Over-logging counts as complete.
    pub is_complete: bool,
    /// Day within the course, clamped to `[1, duration_days]` for display.
    pub course_day: u32,
    pub course_progress_percent: f64,
    pub next_dose: NextDose,
    /// Local time of the most recent dose logged today, if any.
    pub last_taken_today: Option<NaiveTime>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Count of log entries on today's local calendar date.
pub fn taken_today(record: &MedicationRecord, now: DateTime<Local>) -> u32 {
    let today = now.date_naive();
    record
        .dose_log
        .iter()
        .filter(|logged| logged.with_timezone(&Local).date_naive() == today)
        .count() as u32
}

/// Compute the full dose status for one record at `now`.
pub fn compute_dose_status(record: &MedicationRecord, now: DateTime<Local>) -> DoseStatus {
    let taken = taken_today(record, now);
    let is_complete = taken >= record.frequency;

    // Course day is ceiling-of-elapsed-days, pinned to the course bounds
    // so day 0 (created moments ago) and overrun courses display sanely.
    let elapsed_secs = now
        .signed_duration_since(record.start_date)
        .num_seconds()
        .abs();
    let course_day =
        ((elapsed_secs + 86_399) / 86_400).clamp(1, i64::from(record.duration_days)) as u32;
    let course_progress_percent =
        (f64::from(course_day) / f64::from(record.duration_days) * 100.0).min(100.0);

    let next_dose = if is_complete {
        NextDose::Tomorrow {
            at: record.first_scheduled_time(),
        }
    } else {
        // The dose after the n-th taken is slot n when one exists. Records
        // migrated from the single-time shape run out of slots early; for
        // those the next dose is approximated as first slot + 4h per dose
        // already taken, which can roll past midnight.
        let candidate = match record.scheduled_times.get(taken as usize) {
            Some(slot) => now.date_naive().and_time(*slot),
            None => now.date_naive().and_time(record.first_scheduled_time())
                + Duration::hours(4 * i64::from(taken)),
        };
        NextDose::Today {
            at: candidate.time(),
            overdue: candidate < now.naive_local(),
        }
    };

    let last_taken_today = record
        .dose_log
        .iter()
        .rev()
        .map(|logged| logged.with_timezone(&Local))
        .find(|logged| logged.date_naive() == now.date_naive())
        .map(|logged| logged.time());

    DoseStatus {
        taken_today: taken,
        is_complete,
        course_day,
        course_progress_percent,
        next_dose,
        last_taken_today,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
