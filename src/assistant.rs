//! Optional cloud-style query path over a local LLM endpoint.
//!
//! Same input/output contract as the local resolver: an utterance and
//! the full record list in, one response string out. Any transport
//! failure collapses to a fixed apology so the voice flow never sees an
//! error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::i18n::Messages;
use crate::models::MedicationRecord;

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Cannot reach the assistant at {0}. Is it running?")]
    Connection(String),
    #[error("Assistant request failed: {0}")]
    Http(String),
    #[error("Assistant returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Could not parse assistant response: {0}")]
    ResponseParsing(String),
}

// ═══════════════════════════════════════════
// Backend seam
// ═══════════════════════════════════════════

/// Answer collaborator with the resolver's contract.
pub trait AssistantBackend {
    fn answer(
        &self,
        utterance: &str,
        records: &[MedicationRecord],
    ) -> Result<String, AssistantError>;
}

/// Asks the backend and degrades every failure to a safe string: an
/// empty answer becomes a retry prompt, an error becomes the apology.
pub fn query_status(
    backend: &dyn AssistantBackend,
    utterance: &str,
    records: &[MedicationRecord],
) -> String {
    match backend.answer(utterance, records) {
        Ok(text) if text.trim().is_empty() => Messages::assistant_retry(),
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Assistant query failed");
            Messages::assistant_apology()
        }
    }
}

// ═══════════════════════════════════════════
// HTTP backend
// ═══════════════════════════════════════════

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct RemoteAssistant {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl RemoteAssistant {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Endpoint and model from the environment, with local defaults.
    pub fn from_env() -> Self {
        Self::new(&config::assistant_url(), &config::assistant_model(), 30)
    }
}

/// Request body for `/api/generate`.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from `/api/generate`.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl AssistantBackend for RemoteAssistant {
    fn answer(
        &self,
        utterance: &str,
        records: &[MedicationRecord],
    ) -> Result<String, AssistantError> {
        let url = format!("{}/api/generate", self.base_url);
        let system = system_instruction(records);
        let body = GenerateRequest {
            model: &self.model,
            prompt: utterance,
            system: &system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                AssistantError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                AssistantError::Http(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                AssistantError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| AssistantError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// System instruction carrying the serialized list and answering rules.
fn system_instruction(records: &[MedicationRecord]) -> String {
    let data = serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a helpful and kind medical assistant for elderly people. \
         A user is asking a question about their medication. \
         Based on the list of medications provided below, answer their question clearly and simply.\n\
         \n\
         Current Medications Data (frequency is times per day):\n\
         {data}\n\
         \n\
         Context:\n\
         - \"doseLog\" contains timestamps of every time they took the medication.\n\
         - \"frequency\" is how many times total they should take it each day.\n\
         \n\
         Rules:\n\
         1. If they are asking if they took a medication, look at today's entries in \"doseLog\".\n\
         2. If they have taken some but not all doses for today, say something like: \
         \"You've taken 1 of your 3 doses. You have 2 left for today.\"\n\
         3. If they've finished all doses for today, congratulate them kindly.\n\
         4. If they haven't started today, tell them when the reminder is set for.\n\
         5. Keep sentences short and use a comforting tone."
    )
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    struct FixedAssistant(&'static str);

    impl AssistantBackend for FixedAssistant {
        fn answer(
            &self,
            _utterance: &str,
            _records: &[MedicationRecord],
        ) -> Result<String, AssistantError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAssistant;

    impl AssistantBackend for FailingAssistant {
        fn answer(
            &self,
            _utterance: &str,
            _records: &[MedicationRecord],
        ) -> Result<String, AssistantError> {
            Err(AssistantError::Connection("http://localhost:11434".to_string()))
        }
    }

    fn aspirin() -> MedicationRecord {
        MedicationRecord {
            id: Uuid::new_v4(),
            name: "Aspirin".to_string(),
            scheduled_times: vec![NaiveTime::from_hms_opt(9, 0, 0).unwrap()],
            frequency: 1,
            duration_days: 30,
            start_date: Utc::now(),
            dose_log: Vec::new(),
            last_taken_at: None,
        }
    }

    #[test]
    fn successful_answer_passes_through() {
        let response = query_status(&FixedAssistant("You took it at nine."), "did i", &[]);
        assert_eq!(response, "You took it at nine.");
    }

    #[test]
    fn empty_answer_becomes_retry_prompt() {
        let response = query_status(&FixedAssistant("  "), "did i", &[]);
        assert_eq!(response, Messages::assistant_retry());
    }

    #[test]
    fn transport_failure_becomes_the_apology() {
        let response = query_status(&FailingAssistant, "did i", &[]);
        assert_eq!(response, Messages::assistant_apology());
    }

    #[test]
    fn system_instruction_embeds_the_record_list() {
        let instruction = system_instruction(&[aspirin()]);
        assert!(instruction.contains("Aspirin"));
        assert!(instruction.contains("\"doseLog\""));
        assert!(instruction.contains("comforting tone"));
    }

    #[test]
    fn remote_assistant_normalizes_the_base_url() {
        let assistant = RemoteAssistant::new("http://localhost:11434/", "llama3.2", 30);
        assert_eq!(assistant.base_url, "http://localhost:11434");
        assert_eq!(assistant.model, "llama3.2");
    }
}
