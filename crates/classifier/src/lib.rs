//! Free text to expense [`Record`] conversion.
//!
//! The [`Classifier`] capability is implemented by [`OpenAiClassifier`],
//! which sends one chat completion per message and expects a bare JSON
//! object back. Nothing is retried: every failure is returned to the caller.

use async_trait::async_trait;
use ledger::Record;
use reqwest::StatusCode;
use serde::de::Error as _;
use thiserror::Error;

pub use openai::{
    ChatMessage, ChatRequest, ChatResponse, Choice, CompletionBackend, OpenAiBackend,
    OpenAiConfig, ResponseFormat, ResponseMessage, Role,
};

mod openai;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str =
    "You extract structured expense data from text and always respond ONLY with valid JSON.";

/// Errors returned by a [`Classifier`].
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Backend { status: StatusCode, message: String },
    #[error("invalid API key header: {0}")]
    InvalidApiKey(String),
    #[error("no result returned from OpenAI")]
    NoResult,
    #[error("failed to parse GPT response: {source} (response: {raw})")]
    Parse {
        source: serde_json::Error,
        raw: String,
    },
}

/// Turns a free-form expense description into a [`Record`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Record, ClassifierError>;
}

/// Classifier backed by the OpenAI chat completions API.
pub struct OpenAiClassifier<B = OpenAiBackend> {
    backend: B,
    model: String,
}

impl OpenAiClassifier<OpenAiBackend> {
    pub fn new(config: OpenAiConfig) -> Result<Self, ClassifierError> {
        let backend = OpenAiBackend::new(&config)?;
        Ok(Self {
            backend,
            model: config.model,
        })
    }
}

impl<B: CompletionBackend> OpenAiClassifier<B> {
    pub fn with_backend(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl<B: CompletionBackend> Classifier for OpenAiClassifier<B> {
    async fn extract(&self, text: &str) -> Result<Record, ClassifierError> {
        let request = expense_request(&self.model, text);
        let response = self.backend.complete(&request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ClassifierError::NoResult)?;
        let content = choice.message.content.unwrap_or_default();
        tracing::debug!("classifier response: {content}");

        parse_record(&content)
    }
}

/// Builds the fixed two-message request for `text`.
pub fn expense_request(model: &str, text: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: user_prompt(text),
            },
        ],
        response_format: ResponseFormat::json_object(),
    }
}

fn user_prompt(text: &str) -> String {
    format!(
        "Extract structured data from this expense description:\n\"{text}\"\n\n\
         Return a JSON object like this:\n\
         {{\n  \"category\": \"string\",\n  \"amount\": number,\n  \"description\": \"string\"\n}}"
    )
}

/// Parses the completion content into a [`Record`].
///
/// The content must be a JSON object with `category`, `amount` and
/// `description`. A Markdown code fence around it is tolerated.
pub fn parse_record(content: &str) -> Result<Record, ClassifierError> {
    let parse_err = |source| ClassifierError::Parse {
        source,
        raw: content.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(strip_code_fence(content)).map_err(parse_err)?;
    if !value.is_object() {
        return Err(parse_err(serde_json::Error::custom(
            "expected a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(parse_err)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
