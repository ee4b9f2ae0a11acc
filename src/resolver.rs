//! Intent resolution for adherence questions.
//!
//! Maps a free-text utterance onto one of a fixed set of response
//! templates using only the in-memory medication list. Matching is a
//! first case-insensitive substring hit in list order, no scoring and no
//! fuzzy matching; an utterance that names no medication is answered
//! with a whole-list summary instead. Pure throughout, so resolving the
//! same utterance against an unchanged list always yields the same
//! answer.

use chrono::{DateTime, Local, NaiveTime};

use crate::adherence::{self, AdherenceEntry};
use crate::i18n::{Language, Messages, MessagesI18n};
use crate::models::MedicationRecord;
use crate::schedule;

// ═══════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════

/// Answers an utterance against the record list at the given instant.
///
/// An empty list short-circuits to the "no medications yet" answer
/// before any aggregation happens. A matched medication gets one of
/// three per-record answers by today's dose count, each followed by a
/// detail clause with the daily frequency and running count. Anything
/// else falls through to the day's summary.
pub fn resolve(
    utterance: &str,
    records: &[MedicationRecord],
    now: DateTime<Local>,
    lang: Language,
) -> String {
    if records.is_empty() {
        return MessagesI18n::voice_no_medications(lang);
    }

    match match_record(utterance, records) {
        Some(record) => answer_for_record(record, now, lang),
        None => summarize_day(records, now, lang),
    }
}

/// First record whose name appears, case-insensitively, inside the
/// utterance. First match in list order wins, even when several names
/// would match.
pub fn match_record<'a>(
    utterance: &str,
    records: &'a [MedicationRecord],
) -> Option<&'a MedicationRecord> {
    let utterance = utterance.trim().to_lowercase();
    records
        .iter()
        .find(|record| utterance.contains(&record.name.to_lowercase()))
}

// ═══════════════════════════════════════════
// Per-record answers
// ═══════════════════════════════════════════

fn answer_for_record(record: &MedicationRecord, now: DateTime<Local>, lang: Language) -> String {
    let status = schedule::compute_dose_status(record, now);
    let name = record.name.as_str();

    let answer = if status.taken_today == 0 {
        let at = hhmm(status.next_dose.at());
        MessagesI18n::voice_not_taken(lang, name, &at)
    } else if status.is_complete {
        let at = hhmm(
            status
                .last_taken_today
                .unwrap_or_else(|| record.first_scheduled_time()),
        );
        MessagesI18n::voice_complete(lang, name, &at)
    } else {
        let remaining = record.frequency.saturating_sub(status.taken_today);
        Messages::voice_partial(name, status.taken_today, remaining)
    };

    let detail = MessagesI18n::voice_detail(lang, name, record.frequency, status.taken_today);
    format!("{answer} {detail}")
}

// ═══════════════════════════════════════════
// Whole-list summary
// ═══════════════════════════════════════════

fn summarize_day(records: &[MedicationRecord], now: DateTime<Local>, lang: Language) -> String {
    let summary = adherence::summarize(records, now);

    if summary.is_all_complete() {
        return Messages::summary_celebration(summary.medication_count());
    }

    let mut sentences = Vec::new();
    if !summary.completed.is_empty() {
        sentences.push(Messages::summary_completed(&join_names(&summary.completed)));
    }
    if !summary.partial.is_empty() {
        sentences.push(Messages::summary_partial(&join_partials(&summary.partial)));
    }
    if !summary.not_started.is_empty() {
        sentences.push(Messages::summary_not_started(&join_slots(
            &summary.not_started,
        )));
    }
    sentences.push(MessagesI18n::summary_totals(
        lang,
        summary.total_taken_today,
        summary.total_scheduled_today,
    ));

    sentences.join(" ")
}

fn join_names(entries: &[AdherenceEntry]) -> String {
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    names.join(", and ")
}

fn join_partials(entries: &[AdherenceEntry]) -> String {
    let parts: Vec<String> = entries
        .iter()
        .map(|e| Messages::summary_partial_item(&e.name, e.taken_today, e.frequency))
        .collect();
    parts.join(", and ")
}

fn join_slots(entries: &[AdherenceEntry]) -> String {
    let parts: Vec<String> = entries
        .iter()
        .map(|e| Messages::summary_slot_item(&e.name, &hhmm(e.first_time)))
        .collect();
    parts.join(", and ")
}

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn local_at(hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 6, 10, hour, minute, 0)
            .single()
            .unwrap()
    }

    fn record(name: &str, times: Vec<NaiveTime>, doses_today: Vec<(u32, u32)>) -> MedicationRecord {
        let frequency = times.len() as u32;
        let dose_log: Vec<DateTime<Utc>> = doses_today
            .into_iter()
            .map(|(h, m)| local_at(h, m).with_timezone(&Utc))
            .collect();
        let last_taken_at = dose_log.last().copied();
        MedicationRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            scheduled_times: times,
            frequency,
            duration_days: 30,
            start_date: (local_at(8, 0) - Duration::days(3)).with_timezone(&Utc),
            dose_log,
            last_taken_at,
        }
    }

    fn aspirin_partial() -> MedicationRecord {
        record("Aspirin", vec![time(9, 0), time(21, 0)], vec![(9, 5)])
    }

    #[test]
    fn empty_list_answers_no_medications() {
        let response = resolve("did i take my aspirin", &[], local_at(10, 0), Language::EnUs);
        assert_eq!(response, Messages::voice_no_medications());
    }

    #[test]
    fn matched_partial_reports_taken_and_remaining_counts() {
        let records = vec![aspirin_partial()];
        let response = resolve(
            "did i take my aspirin",
            &records,
            local_at(10, 0),
            Language::EnUs,
        );

        assert!(response.contains("Aspirin"), "{response}");
        assert!(response.contains("1 time today"), "{response}");
        assert!(response.contains("1 more dose"), "{response}");
        // Detail clause carries the frequency and the running count.
        assert!(response.contains("2 times a day"), "{response}");
    }

    #[test]
    fn matched_untaken_reports_next_scheduled_time() {
        let records = vec![record("Metformin", vec![time(8, 30), time(20, 30)], vec![])];
        let response = resolve(
            "have i had my metformin",
            &records,
            local_at(7, 0),
            Language::EnUs,
        );

        assert!(response.starts_with("No, you haven't taken your Metformin"));
        assert!(response.contains("08:30"), "{response}");
    }

    #[test]
    fn matched_complete_congratulates_with_last_dose_time() {
        let records = vec![record("Aspirin", vec![time(9, 0)], vec![(9, 5)])];
        let response = resolve(
            "did i take aspirin today",
            &records,
            local_at(10, 0),
            Language::EnUs,
        );

        assert!(response.starts_with("Yes, you took your Aspirin at 09:05."));
        assert!(response.contains("All done for today"), "{response}");
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let records = vec![aspirin_partial()];
        assert!(match_record("DID I TAKE MY ASPIRIN?", &records).is_some());
        assert!(match_record("aspirin", &records).is_some());
        assert!(match_record("did i take my vitamins", &records).is_none());
    }

    #[test]
    fn first_match_in_list_order_wins() {
        let records = vec![
            record("Aspirin", vec![time(9, 0)], vec![]),
            record("Aspirin Forte", vec![time(21, 0)], vec![]),
        ];
        let matched = match_record("did i take my aspirin forte", &records);
        assert_eq!(matched.map(|r| r.name.as_str()), Some("Aspirin"));
    }

    #[test]
    fn unmatched_utterance_falls_through_to_summary() {
        let records = vec![
            record("Aspirin", vec![time(9, 0), time(21, 0)], vec![(9, 5)]),
            record("Metformin", vec![time(8, 30)], vec![]),
        ];
        // No status keyword required; any unmatched text summarizes.
        let response = resolve("hello there", &records, local_at(10, 0), Language::EnUs);

        assert!(
            response.contains("You are partway through Aspirin (1 of 2)"),
            "{response}"
        );
        assert!(
            response.contains("You still need to take Metformin at 08:30"),
            "{response}"
        );
        assert!(
            response.ends_with("You've taken 1 of 3 doses today."),
            "{response}"
        );
    }

    #[test]
    fn summary_enumerates_completed_names() {
        let records = vec![
            record("Aspirin", vec![time(9, 0)], vec![(9, 5)]),
            record("Metformin", vec![time(8, 30)], vec![]),
        ];
        let response = resolve("status please", &records, local_at(10, 0), Language::EnUs);

        assert!(
            response.contains("You have already finished Aspirin."),
            "{response}"
        );
        assert!(response.contains("Metformin at 08:30"), "{response}");
    }

    #[test]
    fn all_complete_collapses_to_single_celebration() {
        let records = vec![
            record("Aspirin", vec![time(9, 0)], vec![(9, 5)]),
            record("Metformin", vec![time(8, 30)], vec![(8, 35)]),
        ];
        let response = resolve("how am i doing", &records, local_at(10, 0), Language::EnUs);

        assert_eq!(
            response,
            "Excellent! You have taken all 2 of your medications for today."
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let records = vec![aspirin_partial()];
        let first = resolve("did i take my aspirin", &records, local_at(10, 0), Language::EnUs);
        let second = resolve("did i take my aspirin", &records, local_at(10, 0), Language::EnUs);
        assert_eq!(first, second);
    }

    #[test]
    fn over_taken_record_resolves_without_panicking() {
        let records = vec![record(
            "Aspirin",
            vec![time(9, 0)],
            vec![(9, 5), (11, 0), (13, 0)],
        )];
        let response = resolve(
            "did i take my aspirin",
            &records,
            local_at(14, 0),
            Language::EnUs,
        );
        assert!(response.starts_with("Yes"), "{response}");
    }

    #[test]
    fn matched_answer_localizes_to_hindi() {
        let records = vec![record("Aspirin", vec![time(9, 0)], vec![])];
        let response = resolve(
            "did i take my aspirin",
            &records,
            local_at(10, 0),
            Language::HiIn,
        );

        assert!(response.contains("नहीं"), "{response}");
        assert!(response.contains("Aspirin"), "{response}");
        assert!(response.contains("बार"), "{response}");
    }

    #[test]
    fn summary_totals_localize_to_tamil() {
        let records = vec![
            record("Aspirin", vec![time(9, 0), time(21, 0)], vec![(9, 5)]),
            record("Metformin", vec![time(8, 30)], vec![]),
        ];
        let response = resolve("vanakkam", &records, local_at(10, 0), Language::TaIn);

        assert!(response.contains("இன்று நீங்கள் 3"), "{response}");
        assert!(response.contains('1'), "{response}");
    }
}
