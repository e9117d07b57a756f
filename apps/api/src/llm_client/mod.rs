//! Completion client: the single entry point for text-completion calls.
//!
//! Prompts are versioned markdown files under `prompts_dir`. In mock mode no
//! network call is made and the response is derived from a hash of the
//! input, so the same call always yields the same value.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::LlmSettings;

const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
const MOCK_ID_LEN: usize = 12;
const BACKOFF_STEP_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt file not found: {}", .0.display())]
    PromptNotFound(PathBuf),

    #[error("Failed to read prompt: {0}")]
    Io(#[from] io::Error),

    #[error("OpenAI API key is required when LLM_MOCK is not enabled")]
    MissingApiKey,

    #[error("Invalid request timeout: {0}s")]
    InvalidTimeout(f64),
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: [InputMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl ResponsesBody {
    /// Concatenated text of every `output_text` part, trimmed.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if !settings.mock && settings.api_key.is_none() {
            return Err(LlmError::MissingApiKey);
        }
        let timeout = Duration::try_from_secs_f64(settings.timeout_s)
            .map_err(|_| LlmError::InvalidTimeout(settings.timeout_s))?;

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            settings,
        })
    }

    pub fn mode(&self) -> &'static str {
        if self.settings.mock {
            "mock"
        } else {
            "live"
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Runs the named prompt against `input` and returns the output, parsed
    /// as JSON when the model produced JSON and as a JSON string otherwise.
    pub async fn run_prompt(&self, prompt_name: &str, input: &Value) -> Result<Value, LlmError> {
        let prompt = self.load_prompt(prompt_name).await?;
        info!(
            prompt_name,
            mock = self.settings.mock,
            retries = self.settings.retries,
            timeout_s = self.settings.timeout_s,
            "llm.request.started"
        );

        if self.settings.mock {
            let output = mock_response(prompt_name, input)?;
            info!(prompt_name, mock_id = %output["mock_id"], "llm.request.mock_response");
            return Ok(output);
        }

        let user_message = canonical_json(input)?;
        let mut attempt: u32 = 0;
        loop {
            match self.call_once(&prompt, &user_message).await {
                Ok(text) => {
                    let output = to_json_if_possible(&text);
                    info!(prompt_name, attempt, "llm.request.succeeded");
                    return Ok(output);
                }
                Err(e) => {
                    warn!(prompt_name, attempt, error = %e, "llm.request.failed");
                    if attempt >= self.settings.retries {
                        return Err(e);
                    }
                    let delay = Duration::from_millis(BACKOFF_STEP_MS * (u64::from(attempt) + 1));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn call_once(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let api_key = self.settings.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let body = ResponsesRequest {
            model: &self.settings.model,
            input: [
                InputMessage {
                    role: "system",
                    content: system,
                },
                InputMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(OPENAI_RESPONSES_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ResponsesBody = response.json().await?;
        Ok(body.output_text())
    }

    async fn load_prompt(&self, prompt_name: &str) -> Result<String, LlmError> {
        let filename = if prompt_name.ends_with(".md") {
            prompt_name.to_string()
        } else {
            format!("{prompt_name}.md")
        };
        let path = self.settings.prompts_dir.join(filename);

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LlmError::PromptNotFound(path)),
            Err(e) => Err(LlmError::Io(e)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical JSON
// ────────────────────────────────────────────────────────────────────────────

/// `", "` between items and `": "` after keys.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Serializes with sorted keys, spaced separators and raw UTF-8, so equal
/// inputs always produce the same text.
pub fn canonical_json(value: &Value) -> Result<String, LlmError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    sort_keys(value).serialize(&mut serializer)?;
    // serde_json only writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn mock_response(prompt_name: &str, input: &Value) -> Result<Value, LlmError> {
    let canonical = canonical_json(input)?;
    let digest = Sha256::digest(format!("{prompt_name}:{canonical}").as_bytes());
    let hex_digest = hex::encode(digest);
    let mock_id = &hex_digest[..MOCK_ID_LEN];

    Ok(json!({
        "mode": "mock",
        "prompt_name": prompt_name,
        "mock_id": mock_id,
        "received": input,
        "result": format!("Mock response for {prompt_name} ({mock_id})"),
    }))
}

/// Parses model output as JSON, falling back to a JSON string.
fn to_json_if_possible(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(strip_json_fences(text)).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    stripped
        .trim_start()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped.trim_start())
}
