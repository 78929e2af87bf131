//! Drug-suggestion helper backed by a local text-generation service.
//!
//! A single stateless call: patient history + chief complaint in, a list
//! of drug names + free-text reasoning out. No retries, no caching, no
//! streaming. The backend serves one model at a time, so all calls go
//! through `SuggestionService`, which enforces exclusive access and
//! exposes what is currently running.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::config;

/// Model used for suggestion generation. `CLINICDESK_SUGGEST_MODEL` overrides.
const DEFAULT_MODEL: &str = "medgemma:4b";

pub fn suggestion_model() -> String {
    std::env::var("CLINICDESK_SUGGEST_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// A drug suggestion produced from patient history and complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested drug names, possibly empty.
    #[serde(alias = "suggested_drugs")]
    pub drugs: Vec<String>,
    /// Free-text reasoning behind the suggestion.
    pub reasoning: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("Cannot reach generation backend at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Generation backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("Suggestion backend is busy with another request")]
    Busy,

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Narrow seam over the text-generation backend, so callers and tests
/// never depend on a live model server.
pub trait SuggestionClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, SuggestError>;
}

// ═══════════════════════════════════════════════════════════
// Prompt template
// ═══════════════════════════════════════════════════════════

const SYSTEM_PROMPT: &str = r#"You are a clinical assistant helping a doctor draft medication options.
You are given a patient's visit history and their chief complaint today.

Respond with a single JSON block wrapped in ```json``` fences:

```json
{
  "drugs": ["<drug name>", "..."],
  "reasoning": "<one short paragraph explaining the choices>"
}
```

Rules:
- Suggest at most five drugs, generic names preferred.
- If the history and complaint do not support any suggestion, return an
  empty "drugs" array and say so in "reasoning".
- Output nothing outside the JSON block."#;

fn build_prompt(history: &str, complaint: &str) -> String {
    format!(
        "Patient history:\n{}\n\nChief complaint:\n{}",
        if history.trim().is_empty() { "(none recorded)" } else { history.trim() },
        complaint.trim(),
    )
}

/// Extract the fenced JSON block from a model response and parse it.
fn parse_suggestion(response: &str) -> Result<Suggestion, SuggestError> {
    let start = response
        .find("```json")
        .ok_or_else(|| SuggestError::ResponseParsing("no ```json block in response".to_string()))?;
    let after_fence = &response[start + 7..];
    let end = after_fence
        .find("```")
        .ok_or_else(|| SuggestError::ResponseParsing("unterminated ```json block".to_string()))?;
    let json_str = after_fence[..end].trim();

    serde_json::from_str(json_str).map_err(|e| SuggestError::ResponseParsing(e.to_string()))
}

// ═══════════════════════════════════════════════════════════
// HTTP client (Ollama-compatible /api/generate)
// ═══════════════════════════════════════════════════════════

pub struct GenerateClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GenerateClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client pointed at the configured backend with a 2-minute timeout.
    pub fn from_config() -> Self {
        Self::new(&config::suggestion_base_url(), 120)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl SuggestionClient for GenerateClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, SuggestError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                SuggestError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                SuggestError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                SuggestError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SuggestError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| SuggestError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock client for testing — returns a configurable response.
#[cfg(test)]
pub struct MockSuggestionClient {
    response: String,
}

#[cfg(test)]
impl MockSuggestionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

#[cfg(test)]
impl SuggestionClient for MockSuggestionClient {
    fn generate(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, SuggestError> {
        Ok(self.response.clone())
    }
}

// ═══════════════════════════════════════════════════════════
// SuggestionService
// ═══════════════════════════════════════════════════════════

/// Snapshot of the currently running suggestion request.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSuggestion {
    /// Which model is being used.
    pub model: String,
    /// When the request started (ISO 8601).
    pub started_at: String,
}

/// Exclusive-access controller for the generation backend.
///
/// Only one suggestion request runs at a time; a second caller gets
/// `SuggestError::Busy` instead of queueing behind a slow model.
pub struct SuggestionService {
    lock: Mutex<()>,
    current: Mutex<Option<ActiveSuggestion>>,
}

impl SuggestionService {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            current: Mutex::new(None),
        }
    }

    /// Run one suggestion request against the given client.
    ///
    /// Fails fast with `Busy` when another request holds the backend.
    pub fn suggest(
        &self,
        client: &dyn SuggestionClient,
        history: &str,
        complaint: &str,
    ) -> Result<Suggestion, SuggestError> {
        let model = suggestion_model();
        let _guard = self.try_acquire(&model).ok_or(SuggestError::Busy)?;

        let prompt = build_prompt(history, complaint);
        let raw = client.generate(&model, &prompt, SYSTEM_PROMPT)?;
        parse_suggestion(&raw)
    }

    fn try_acquire(&self, model: &str) -> Option<SuggestionGuard<'_>> {
        let guard = self.lock.try_lock().ok()?;
        if let Ok(mut current) = self.current.lock() {
            *current = Some(ActiveSuggestion {
                model: model.to_string(),
                started_at: chrono::Utc::now().to_rfc3339(),
            });
        }
        Some(SuggestionGuard {
            _guard: guard,
            service: self,
        })
    }

    /// What request is currently running? `None` when idle.
    pub fn current_operation(&self) -> Option<ActiveSuggestion> {
        self.current.lock().ok()?.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    fn clear_current(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}

impl Default for SuggestionService {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for exclusive backend access. Dropping it releases the
/// lock and clears the current-operation snapshot.
struct SuggestionGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    service: &'a SuggestionService,
}

impl Drop for SuggestionGuard<'_> {
    fn drop(&mut self) {
        self.service.clear_current();
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_RESPONSE: &str = r#"Here are my suggestions.

```json
{
  "drugs": ["Paracetamol", "Cetirizine"],
  "reasoning": "Fever with allergic rhinitis symptoms."
}
```
"#;

    #[test]
    fn parse_extracts_fenced_json() {
        let suggestion = parse_suggestion(GOOD_RESPONSE).unwrap();
        assert_eq!(suggestion.drugs, vec!["Paracetamol", "Cetirizine"]);
        assert!(suggestion.reasoning.contains("rhinitis"));
    }

    #[test]
    fn parse_accepts_suggested_drugs_alias() {
        let response = "```json\n{\"suggested_drugs\": [\"Ibuprofen\"], \"reasoning\": \"Pain relief.\"}\n```";
        let suggestion = parse_suggestion(response).unwrap();
        assert_eq!(suggestion.drugs, vec!["Ibuprofen"]);
    }

    #[test]
    fn parse_rejects_missing_fence() {
        let err = parse_suggestion("{\"drugs\": [], \"reasoning\": \"\"}").unwrap_err();
        assert!(matches!(err, SuggestError::ResponseParsing(_)));
    }

    #[test]
    fn parse_rejects_broken_json() {
        let err = parse_suggestion("```json\n{ not json\n```").unwrap_err();
        assert!(matches!(err, SuggestError::ResponseParsing(_)));
    }

    #[test]
    fn prompt_includes_history_and_complaint() {
        let prompt = build_prompt("2025: fever, treated", "headache for 3 days");
        assert!(prompt.contains("2025: fever, treated"));
        assert!(prompt.contains("headache for 3 days"));
    }

    #[test]
    fn prompt_marks_missing_history() {
        let prompt = build_prompt("   ", "cough");
        assert!(prompt.contains("(none recorded)"));
    }

    #[test]
    fn service_runs_request_through_client() {
        let service = SuggestionService::new();
        let client = MockSuggestionClient::new(GOOD_RESPONSE);

        let suggestion = service.suggest(&client, "no prior visits", "fever").unwrap();
        assert_eq!(suggestion.drugs.len(), 2);

        // Request finished, service is idle again
        assert!(!service.is_busy());
        assert!(service.current_operation().is_none());
    }

    #[test]
    fn empty_drug_list_is_a_valid_suggestion() {
        let response = "```json\n{\"drugs\": [], \"reasoning\": \"Not enough information.\"}\n```";
        let service = SuggestionService::new();
        let client = MockSuggestionClient::new(response);

        let suggestion = service.suggest(&client, "", "unclear symptoms").unwrap();
        assert!(suggestion.drugs.is_empty());
        assert!(!suggestion.reasoning.is_empty());
    }

    #[test]
    fn client_constructor_trims_trailing_slash() {
        let client = GenerateClient::new("http://localhost:11434/", 60);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn busy_service_rejects_second_request() {
        let service = SuggestionService::new();
        let _held = service.try_acquire("medgemma:4b").unwrap();

        let client = MockSuggestionClient::new(GOOD_RESPONSE);
        let err = service.suggest(&client, "", "fever").unwrap_err();
        assert!(matches!(err, SuggestError::Busy));
        assert!(service.is_busy());
    }
}
