//! Voice interaction session and its capability seams.
//!
//! Speech capture and speech output are external collaborators behind
//! the [`Recognizer`] and [`Synthesizer`] traits, so the session state
//! machine can be driven deterministically by fakes in tests. One
//! session cycle runs `idle → listening → processing → speaking → idle`;
//! a recognition error or an end without a final transcript drops
//! straight back to `idle` with no response.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::i18n::{Language, Messages, MessagesI18n};
use crate::models::MedicationRecord;
use crate::resolver;

/// How long a spoken response stays on screen after speech ends.
pub const RESPONSE_CLEAR_DELAY: Duration = Duration::from_millis(1500);

// ═══════════════════════════════════════════
// Events and capability traits
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
    Processing,
    Speaking,
}

/// What a recognition session emits, in order. A `Final` transcript may
/// be replaced by an `Error`; `Ended` always arrives last.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Started,
    Interim(String),
    Final(String),
    Ended,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
}

/// Speech-to-text collaborator. One capture session per call.
pub trait Recognizer {
    fn is_available(&self) -> bool {
        true
    }

    /// Runs one capture session for the locale and returns its events.
    fn listen(&mut self, locale: &str) -> Vec<RecognitionEvent>;
}

/// Text-to-speech collaborator.
pub trait Synthesizer {
    /// Cancels any in-flight utterance.
    fn cancel(&mut self);

    /// Speaks the text and returns the emitted lifecycle events.
    fn speak(&mut self, text: &str, locale: &str) -> Vec<SpeechEvent>;
}

// ═══════════════════════════════════════════
// Session
// ═══════════════════════════════════════════

pub struct VoiceSession<R, S> {
    recognizer: R,
    synthesizer: S,
    language: Language,
    state: VoiceState,
    transcript: String,
    response: Option<String>,
    clear_response_at: Option<Instant>,
    unavailable_notified: bool,
}

impl<R: Recognizer, S: Synthesizer> VoiceSession<R, S> {
    pub fn new(recognizer: R, synthesizer: S, language: Language) -> Self {
        Self {
            recognizer,
            synthesizer,
            language,
            state: VoiceState::Idle,
            transcript: String::new(),
            response: None,
            clear_response_at: None,
            unavailable_notified: false,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// The last response, until its clear deadline has passed.
    pub fn displayed_response(&self, now: Instant) -> Option<&str> {
        match (&self.response, self.clear_response_at) {
            (Some(text), Some(deadline)) if now < deadline => Some(text.as_str()),
            (Some(text), None) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Status line for the current state, in the session language.
    pub fn status_label(&self) -> String {
        match self.state {
            VoiceState::Idle => MessagesI18n::prompt(self.language),
            VoiceState::Listening => MessagesI18n::listening(self.language),
            VoiceState::Processing => MessagesI18n::thinking(self.language),
            VoiceState::Speaking => MessagesI18n::speaking(self.language),
        }
    }

    /// Runs one full ask cycle: capture, resolve, speak.
    ///
    /// A no-op unless the session is idle. Returns the spoken response,
    /// or `None` when recognition ended without a final transcript.
    pub fn ask(&mut self, records: &[MedicationRecord], now: DateTime<Local>) -> Option<String> {
        if self.state != VoiceState::Idle {
            return None;
        }
        if !self.recognizer.is_available() {
            // One notice only; later attempts stay silent.
            if self.unavailable_notified {
                return None;
            }
            self.unavailable_notified = true;
            return Some(Messages::voice_unavailable());
        }

        self.transcript.clear();
        self.response = None;
        self.clear_response_at = None;

        let utterance = match self.capture() {
            Some(text) => text,
            None => {
                self.state = VoiceState::Idle;
                return None;
            }
        };

        self.state = VoiceState::Processing;
        let response = resolver::resolve(&utterance, records, now, self.language);
        self.announce(&response);
        Some(response)
    }

    /// Speaks a response, cancelling any in-flight utterance first, and
    /// keeps it displayed until the clear delay elapses.
    pub fn announce(&mut self, text: &str) {
        self.synthesizer.cancel();
        self.clear_response_at = None;
        for event in self.synthesizer.speak(text, self.language.tag()) {
            match event {
                SpeechEvent::Started => self.state = VoiceState::Speaking,
                SpeechEvent::Ended => self.finish_speaking(),
            }
        }
        if self.clear_response_at.is_none() {
            // Synthesizer never reported the end of speech.
            self.finish_speaking();
        }
        self.response = Some(text.to_string());
    }

    fn capture(&mut self) -> Option<String> {
        let mut final_transcript = None;
        for event in self.recognizer.listen(self.language.tag()) {
            match event {
                RecognitionEvent::Started => self.state = VoiceState::Listening,
                RecognitionEvent::Interim(text) => self.transcript = text,
                RecognitionEvent::Final(text) => {
                    self.transcript = text.clone();
                    final_transcript = Some(text);
                }
                RecognitionEvent::Error(reason) => {
                    tracing::warn!(reason = %reason, "Speech recognition failed");
                    return None;
                }
                RecognitionEvent::Ended => {
                    if final_transcript.is_none() {
                        return None;
                    }
                }
            }
        }
        final_transcript
    }

    fn finish_speaking(&mut self) {
        self.state = VoiceState::Idle;
        self.transcript.clear();
        self.clear_response_at = Some(Instant::now() + RESPONSE_CLEAR_DELAY);
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Utc};
    use uuid::Uuid;

    struct ScriptedRecognizer {
        script: Vec<RecognitionEvent>,
        available: bool,
    }

    impl ScriptedRecognizer {
        fn with(script: Vec<RecognitionEvent>) -> Self {
            Self {
                script,
                available: true,
            }
        }

        fn unavailable() -> Self {
            Self {
                script: Vec::new(),
                available: false,
            }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn is_available(&self) -> bool {
            self.available
        }

        fn listen(&mut self, _locale: &str) -> Vec<RecognitionEvent> {
            std::mem::take(&mut self.script)
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        spoken: Vec<(String, String)>,
        cancels: usize,
    }

    impl Synthesizer for RecordingSynthesizer {
        fn cancel(&mut self) {
            self.cancels += 1;
        }

        fn speak(&mut self, text: &str, locale: &str) -> Vec<SpeechEvent> {
            self.spoken.push((text.to_string(), locale.to_string()));
            vec![SpeechEvent::Started, SpeechEvent::Ended]
        }
    }

    fn aspirin() -> MedicationRecord {
        let now = Local.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).single().unwrap();
        MedicationRecord {
            id: Uuid::new_v4(),
            name: "Aspirin".to_string(),
            scheduled_times: vec![NaiveTime::from_hms_opt(9, 0, 0).unwrap()],
            frequency: 1,
            duration_days: 30,
            start_date: now.with_timezone(&Utc),
            dose_log: Vec::new(),
            last_taken_at: None,
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).single().unwrap()
    }

    fn session_with(script: Vec<RecognitionEvent>) -> VoiceSession<ScriptedRecognizer, RecordingSynthesizer> {
        VoiceSession::new(
            ScriptedRecognizer::with(script),
            RecordingSynthesizer::default(),
            Language::EnUs,
        )
    }

    #[test]
    fn final_transcript_is_resolved_and_spoken() {
        let mut session = session_with(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Interim("did i".to_string()),
            RecognitionEvent::Final("did i take my aspirin".to_string()),
            RecognitionEvent::Ended,
        ]);

        let records = vec![aspirin()];
        let response = session.ask(&records, now()).unwrap();

        assert!(response.contains("Aspirin"), "{response}");
        assert_eq!(session.state(), VoiceState::Idle);
        assert_eq!(session.synthesizer.spoken.len(), 1);
        assert_eq!(session.synthesizer.spoken[0].0, response);
        assert_eq!(session.displayed_response(Instant::now()), Some(response.as_str()));
    }

    #[test]
    fn recognition_error_resets_to_idle_without_response() {
        let mut session = session_with(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Error("no-speech".to_string()),
            RecognitionEvent::Ended,
        ]);

        assert_eq!(session.ask(&[aspirin()], now()), None);
        assert_eq!(session.state(), VoiceState::Idle);
        assert!(session.synthesizer.spoken.is_empty());
    }

    #[test]
    fn ended_without_final_transcript_produces_no_response() {
        let mut session = session_with(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Interim("mumble".to_string()),
            RecognitionEvent::Ended,
        ]);

        assert_eq!(session.ask(&[aspirin()], now()), None);
        assert_eq!(session.state(), VoiceState::Idle);
        assert!(session.displayed_response(Instant::now()).is_none());
    }

    #[test]
    fn ask_is_a_no_op_unless_idle() {
        let mut session = session_with(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Final("did i take my aspirin".to_string()),
            RecognitionEvent::Ended,
        ]);
        session.state = VoiceState::Speaking;

        assert_eq!(session.ask(&[aspirin()], now()), None);
        // The capture session was never started.
        assert_eq!(session.recognizer.script.len(), 3);
    }

    #[test]
    fn speaking_always_cancels_in_flight_speech_first() {
        let mut session = session_with(vec![]);
        session.announce("first");
        session.announce("second");

        assert_eq!(session.synthesizer.cancels, 2);
        assert_eq!(session.synthesizer.spoken.len(), 2);
        assert_eq!(session.synthesizer.spoken[1].0, "second");
    }

    #[test]
    fn response_clears_after_the_delay() {
        let mut session = session_with(vec![]);
        session.announce("hello");

        let now = Instant::now();
        assert_eq!(session.displayed_response(now), Some("hello"));
        assert_eq!(session.displayed_response(now + Duration::from_secs(5)), None);
    }

    struct SilentSynthesizer;

    impl Synthesizer for SilentSynthesizer {
        fn cancel(&mut self) {}

        fn speak(&mut self, _text: &str, _locale: &str) -> Vec<SpeechEvent> {
            Vec::new()
        }
    }

    #[test]
    fn eventless_synthesizer_still_schedules_response_clear() {
        let mut session = VoiceSession::new(
            ScriptedRecognizer::with(vec![]),
            SilentSynthesizer,
            Language::EnUs,
        );
        session.announce("first");
        session.announce("second");

        // The deadline is re-armed per announcement, so the latest
        // response is displayed now and cleared after the delay.
        let now = Instant::now();
        assert_eq!(session.state(), VoiceState::Idle);
        assert_eq!(session.displayed_response(now), Some("second"));
        assert_eq!(session.displayed_response(now + Duration::from_secs(5)), None);
    }

    #[test]
    fn unavailable_recognizer_notifies_exactly_once() {
        let mut session = VoiceSession::new(
            ScriptedRecognizer::unavailable(),
            RecordingSynthesizer::default(),
            Language::EnUs,
        );

        let first = session.ask(&[], now());
        assert_eq!(first, Some(Messages::voice_unavailable()));
        assert_eq!(session.ask(&[], now()), None);
    }

    #[test]
    fn language_threads_through_to_both_collaborators() {
        let mut session = session_with(vec![
            RecognitionEvent::Started,
            RecognitionEvent::Final("status".to_string()),
            RecognitionEvent::Ended,
        ]);
        session.set_language(Language::TaIn);

        session.ask(&[aspirin()], now());
        assert_eq!(session.synthesizer.spoken[0].1, "ta-IN");
        assert_eq!(session.status_label(), MessagesI18n::prompt(Language::TaIn));
    }
}
