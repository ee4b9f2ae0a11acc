//! Interactive console for the medication list.
//!
//! Supported commands:
//!   list            – show today's schedule and progress
//!   add             – add a medication through guided prompts
//!   take N          – log a dose for the Nth listed medication
//!   edit N          – change the Nth medication's details
//!   remove N        – delete the Nth medication, after confirmation
//!   lang [TAG]      – list languages or switch the voice language
//!   ask [QUESTION]  – answer a question locally; bare `ask` listens
//!   assistant Q     – send the question to the remote assistant
//!   help            – show this list
//!   quit | exit     – leave
//!
//! Anything else typed at the prompt is treated as an `ask` question.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local, NaiveTime, Timelike};

use crate::adherence::{self, AdherenceSummary};
use crate::assistant::{self, RemoteAssistant};
use crate::i18n::{Language, Messages, MessagesI18n};
use crate::models::{parse_time_of_day, MedicationDraft, MedicationRecord};
use crate::resolver;
use crate::schedule::{self, NextDose};
use crate::tracker::MedicationTracker;
use crate::voice::{RecognitionEvent, Recognizer, SpeechEvent, Synthesizer, VoiceSession};

// ---------------------------------------------------------------------------
// Speech collaborators over stdin/stdout
// ---------------------------------------------------------------------------

/// Reads one typed line per capture session.
pub struct ConsoleRecognizer;

impl Recognizer for ConsoleRecognizer {
    fn listen(&mut self, _locale: &str) -> Vec<RecognitionEvent> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => vec![RecognitionEvent::Started, RecognitionEvent::Ended],
            Ok(_) => {
                let text = line.trim().to_string();
                if text.is_empty() {
                    vec![RecognitionEvent::Started, RecognitionEvent::Ended]
                } else {
                    vec![
                        RecognitionEvent::Started,
                        RecognitionEvent::Final(text),
                        RecognitionEvent::Ended,
                    ]
                }
            }
            Err(e) => vec![
                RecognitionEvent::Started,
                RecognitionEvent::Error(e.to_string()),
                RecognitionEvent::Ended,
            ],
        }
    }
}

/// Prints the spoken text.
pub struct ConsoleSynthesizer;

impl Synthesizer for ConsoleSynthesizer {
    fn cancel(&mut self) {}

    fn speak(&mut self, text: &str, _locale: &str) -> Vec<SpeechEvent> {
        println!("{text}");
        vec![SpeechEvent::Started, SpeechEvent::Ended]
    }
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

pub struct Console {
    tracker: MedicationTracker,
    session: VoiceSession<ConsoleRecognizer, ConsoleSynthesizer>,
    assistant: RemoteAssistant,
}

impl Console {
    pub fn new(tracker: MedicationTracker) -> Self {
        Self {
            tracker,
            session: VoiceSession::new(ConsoleRecognizer, ConsoleSynthesizer, Language::EnUs),
            assistant: RemoteAssistant::from_env(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.cmd_list();
        println!("Type 'help' for commands.");

        let stdin = io::stdin();
        loop {
            print!("medremind> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                println!();
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = split_command(line);
            match command.as_str() {
                "list" => self.cmd_list(),
                "add" => self.cmd_add()?,
                "take" => self.cmd_take(rest),
                "edit" => self.cmd_edit(rest)?,
                "remove" | "delete" => self.cmd_remove(rest)?,
                "lang" => self.cmd_lang(rest),
                "ask" => self.cmd_ask(rest),
                "assistant" => self.cmd_assistant(rest),
                "help" => cmd_help(),
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                _ => self.cmd_ask(line),
            }
        }
        Ok(())
    }

    fn lang(&self) -> Language {
        self.session.language()
    }

    // --- commands ---

    fn cmd_list(&self) {
        let now = Local::now();
        print_header(&format!(" {} ", Messages::greeting(now.hour())));

        let records = self.tracker.records();
        if records.is_empty() {
            println!("{}", MessagesI18n::no_medications(self.lang()));
            return;
        }

        let summary = adherence::summarize(records, now);
        println!("{}", progress_line(&summary, self.lang()));
        println!("{}", "-".repeat(50));
        println!("{}", MessagesI18n::schedule(self.lang()));
        for (i, record) in sorted_view(records).into_iter().enumerate() {
            for line in card_lines(i + 1, record, now, self.lang()) {
                println!("{line}");
            }
        }
    }

    fn cmd_add(&mut self) -> io::Result<()> {
        let name = prompt_line("Medication name: ")?;
        let frequency = prompt_u32("Times per day", 1)?;
        let mut scheduled_times = Vec::new();
        for i in 0..frequency {
            let label = format!("Time {} (HH:MM)", i + 1);
            scheduled_times.push(prompt_time(&label, default_slot())?);
        }
        let duration_days = prompt_u32("Duration in days", 30)?;

        let draft = MedicationDraft {
            name,
            scheduled_times,
            frequency,
            duration_days,
        };
        match self.tracker.add(draft) {
            Ok(record) => println!("Added {}.", record.name),
            Err(e) => println!("{e}"),
        }
        Ok(())
    }

    fn cmd_take(&mut self, arg: &str) {
        let Some(id) = self.id_at(arg) else {
            println!("Invalid selection.");
            return;
        };
        match self.tracker.take_dose(id) {
            Ok(record) => {
                let at = record
                    .last_taken_at
                    .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                    .unwrap_or_default();
                println!("Recorded: {} taken at {at}.", record.name);
            }
            Err(e) => println!("{e}"),
        }
    }

    fn cmd_edit(&mut self, arg: &str) -> io::Result<()> {
        let Some(id) = self.id_at(arg) else {
            println!("Invalid selection.");
            return Ok(());
        };
        let Some(current) = self.tracker.find(id).cloned() else {
            println!("Invalid selection.");
            return Ok(());
        };

        let name = prompt_line(&format!("Medication name [{}]: ", current.name))?;
        let name = if name.is_empty() { current.name.clone() } else { name };
        let frequency = prompt_u32("Times per day", current.frequency)?;
        let mut scheduled_times = Vec::new();
        for i in 0..frequency {
            let default = current
                .scheduled_times
                .get(i as usize)
                .copied()
                .unwrap_or_else(default_slot);
            scheduled_times.push(prompt_time(&format!("Time {} (HH:MM)", i + 1), default)?);
        }
        let duration_days = prompt_u32("Duration in days", current.duration_days)?;

        let draft = MedicationDraft {
            name,
            scheduled_times,
            frequency,
            duration_days,
        };
        match self.tracker.edit(id, draft) {
            Ok(record) => println!("Updated {}.", record.name),
            Err(e) => println!("{e}"),
        }
        Ok(())
    }

    fn cmd_remove(&mut self, arg: &str) -> io::Result<()> {
        let Some(id) = self.id_at(arg) else {
            println!("Invalid selection.");
            return Ok(());
        };
        let answer = prompt_line(&format!("{} [y/N]: ", MessagesI18n::delete_confirm(self.lang())))?;
        if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            println!("Cancelled.");
            return Ok(());
        }
        match self.tracker.remove(id) {
            Ok(record) => println!("Removed {}.", record.name),
            Err(e) => println!("{e}"),
        }
        Ok(())
    }

    fn cmd_lang(&mut self, arg: &str) {
        if arg.is_empty() {
            for lang in Language::all() {
                let marker = if lang == self.lang() { " (current)" } else { "" };
                println!("  {}  {}{marker}", lang.tag(), lang.native_name());
            }
            return;
        }
        let lang = Language::from_tag(arg);
        self.session.set_language(lang);
        println!("Language set to {} ({}).", lang.tag(), lang.native_name());
    }

    fn cmd_ask(&mut self, question: &str) {
        let now = Local::now();
        if question.is_empty() {
            println!("{}", MessagesI18n::listening(self.lang()));
            if self.session.ask(self.tracker.records(), now).is_none() {
                println!("{}", MessagesI18n::prompt(self.lang()));
            }
            return;
        }
        let response = resolver::resolve(question, self.tracker.records(), now, self.lang());
        self.session.announce(&response);
    }

    fn cmd_assistant(&mut self, question: &str) {
        if question.is_empty() {
            println!("Usage: assistant QUESTION");
            return;
        }
        println!("{}", MessagesI18n::thinking(self.lang()));
        let response = assistant::query_status(&self.assistant, question, self.tracker.records());
        self.session.announce(&response);
    }

    /// Maps a 1-based index in the sorted view to a record id.
    fn id_at(&self, arg: &str) -> Option<uuid::Uuid> {
        let records = self.tracker.records();
        let view = sorted_view(records);
        parse_index(arg, view.len()).map(|i| view[i].id)
    }
}

fn cmd_help() {
    println!("Commands:");
    println!("  list            show today's schedule and progress");
    println!("  add             add a medication");
    println!("  take N          log a dose for the Nth medication");
    println!("  edit N          change the Nth medication's details");
    println!("  remove N        delete the Nth medication");
    println!("  lang [TAG]      list languages or switch the voice language");
    println!("  ask [QUESTION]  answer a question about today's doses");
    println!("  assistant Q     send the question to the remote assistant");
    println!("  quit            leave");
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_header(text: &str) {
    println!("{text:=^50}");
}

/// List order for display and numbering: earliest first slot first.
fn sorted_view(records: &[MedicationRecord]) -> Vec<&MedicationRecord> {
    let mut view: Vec<&MedicationRecord> = records.iter().collect();
    view.sort_by_key(|r| r.first_scheduled_time());
    view
}

fn progress_line(summary: &AdherenceSummary, lang: Language) -> String {
    format!(
        "{}: {} of {} doses taken today ({:.0}%)",
        MessagesI18n::progress(lang),
        summary.total_taken_today,
        summary.total_scheduled_today,
        summary.progress_percent(),
    )
}

fn card_lines(
    index: usize,
    record: &MedicationRecord,
    now: DateTime<Local>,
    lang: Language,
) -> Vec<String> {
    let status = schedule::compute_dose_status(record, now);
    let times: Vec<String> = record.scheduled_times.iter().map(|t| hhmm(*t)).collect();

    let next = match status.next_dose {
        NextDose::Today { at, overdue: true } => {
            format!("Next: {} (as soon as possible)", hhmm(at))
        }
        NextDose::Today { at, overdue: false } => format!("Next: {} today", hhmm(at)),
        NextDose::Tomorrow { at } => format!("Next: {} tomorrow", hhmm(at)),
    };

    let mut lines = vec![
        format!("{index}. {} ({})", record.name, times.join(", ")),
        format!(
            "   Day {} of {} ({:.0}%)",
            status.course_day, record.duration_days, status.course_progress_percent,
        ),
    ];
    if status.is_complete {
        lines.push(format!("   {}. {next}", MessagesI18n::done_today(lang)));
    } else {
        lines.push(format!(
            "   Taken {} of {} today. {next}",
            status.taken_today, record.frequency,
        ));
    }
    lines
}

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn default_slot() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn split_command(line: &str) -> (String, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_lowercase(), rest.trim()),
        None => (line.to_lowercase(), ""),
    }
}

fn parse_index(arg: &str, len: usize) -> Option<usize> {
    let n: usize = arg.trim().parse().ok()?;
    if n >= 1 && n <= len {
        Some(n - 1)
    } else {
        None
    }
}

fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_u32(label: &str, default: u32) -> io::Result<u32> {
    let raw = prompt_line(&format!("{label} [{default}]: "))?;
    if raw.is_empty() {
        return Ok(default);
    }
    Ok(raw.parse().unwrap_or(default))
}

fn prompt_time(label: &str, default: NaiveTime) -> io::Result<NaiveTime> {
    let raw = prompt_line(&format!("{label} [{}]: ", hhmm(default)))?;
    if raw.is_empty() {
        return Ok(default);
    }
    match parse_time_of_day(&raw) {
        Ok(time) => Ok(time),
        Err(e) => {
            println!("{e}; keeping {}", hhmm(default));
            Ok(default)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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
        let dose_log: Vec<chrono::DateTime<Utc>> = doses_today
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
            start_date: (local_at(8, 0) - Duration::days(2)).with_timezone(&Utc),
            dose_log,
            last_taken_at,
        }
    }

    // -----------------------------------------------------------------------
    // Command parsing
    // -----------------------------------------------------------------------

    #[test]
    fn split_command_separates_head_and_rest() {
        assert_eq!(split_command("take 2"), ("take".to_string(), "2"));
        assert_eq!(split_command("LIST"), ("list".to_string(), ""));
        assert_eq!(
            split_command("ask did i take my aspirin"),
            ("ask".to_string(), "did i take my aspirin"),
        );
    }

    #[test]
    fn parse_index_is_one_based_and_bounded() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index(" 3 ", 3), Some(2));
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("two", 3), None);
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn view_sorts_by_first_scheduled_slot() {
        let records = vec![
            record("Evening", vec![time(20, 0)], vec![]),
            record("Morning", vec![time(8, 0)], vec![]),
            record("Noon", vec![time(12, 0)], vec![]),
        ];
        let names: Vec<&str> = sorted_view(&records).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Morning", "Noon", "Evening"]);
    }

    #[test]
    fn progress_line_shows_raw_totals_and_percent() {
        let records = vec![
            record("Aspirin", vec![time(9, 0), time(21, 0)], vec![(9, 5)]),
            record("Metformin", vec![time(8, 30)], vec![]),
        ];
        let summary = adherence::summarize(&records, local_at(10, 0));
        assert_eq!(
            progress_line(&summary, Language::EnUs),
            "Progress: 1 of 3 doses taken today (33%)",
        );
    }

    #[test]
    fn card_shows_course_day_and_next_slot() {
        let aspirin = record("Aspirin", vec![time(9, 0), time(21, 0)], vec![(9, 5)]);
        let lines = card_lines(1, &aspirin, local_at(10, 0), Language::EnUs);

        assert_eq!(lines[0], "1. Aspirin (09:00, 21:00)");
        assert_eq!(lines[1], "   Day 3 of 30 (10%)");
        assert_eq!(lines[2], "   Taken 1 of 2 today. Next: 21:00 today");
    }

    #[test]
    fn card_marks_overdue_doses() {
        let aspirin = record("Aspirin", vec![time(9, 0)], vec![]);
        let lines = card_lines(1, &aspirin, local_at(11, 0), Language::EnUs);
        assert_eq!(lines[2], "   Taken 0 of 1 today. Next: 09:00 (as soon as possible)");
    }

    #[test]
    fn card_points_complete_records_at_tomorrow() {
        let aspirin = record("Aspirin", vec![time(9, 0)], vec![(9, 5)]);
        let lines = card_lines(1, &aspirin, local_at(10, 0), Language::EnUs);
        assert_eq!(lines[2], "   Done for today. Next: 09:00 tomorrow");
    }
}
