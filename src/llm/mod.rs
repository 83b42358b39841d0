//! Model service abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations. Each
//! provider takes one [`ResponseRequest`] and returns one [`ModelResponse`];
//! there is no retry and no streaming. The request/response types mirror the
//! hosted Responses API closely enough to serialise directly, so providers
//! only differ in transport.
//!
//! Provider instances are shared immutable capabilities — clone them freely.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0} not set. Please set it in your environment or .env file.")]
    MissingApiKey(&'static str),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error("scripted provider has no reply left for request #{0}")]
    Exhausted(usize),
}

// ── Request ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn developer(content: impl Into<String>) -> Self {
        Self { role: Role::Developer, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Either a bare prompt string or an ordered message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Text(String),
    Messages(Vec<Message>),
}

/// Hosted tool enabled for a request (e.g. `{"type": "web_search"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: ResponseInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

impl ResponseRequest {
    pub fn new(model: impl Into<String>, input: ResponseInput) -> Self {
        Self {
            model: model.into(),
            input,
            instructions: None,
            previous_response_id: None,
            tools: Vec::new(),
            include: Vec::new(),
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Continue the conversation stored server-side under `id`, if any.
    pub fn previous_response_id(mut self, id: Option<&str>) -> Self {
        self.previous_response_id = id.map(str::to_string);
        self
    }

    pub fn tool(mut self, kind: impl Into<String>) -> Self {
        self.tools.push(Tool { kind: kind.into() });
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(fields.into_iter().map(Into::into));
        self
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        id: String,
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    WebSearchCall {
        id: String,
        #[serde(default)]
        status: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl OutputItem {
    fn id(&self) -> Option<&str> {
        match self {
            OutputItem::Message { id, .. } | OutputItem::WebSearchCall { id, .. } if !id.is_empty() => {
                Some(id.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub id: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ModelResponse {
    /// A response holding a single assistant message.
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            output: vec![OutputItem::Message {
                id: format!("msg_{id}"),
                content: vec![ContentPart::OutputText { text: text.into() }],
            }],
            id,
            usage: None,
        }
    }

    /// A response holding a web search call followed by an assistant message.
    pub fn search(id: impl Into<String>, call_id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut resp = Self::text(id, text);
        resp.output.insert(
            0,
            OutputItem::WebSearchCall { id: call_id.into(), status: Some("completed".into()) },
        );
        resp
    }

    /// Text of the first assistant message, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.output.iter().find_map(|item| match item {
            OutputItem::Message { content, .. } => content.iter().find_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                _ => None,
            }),
            _ => None,
        })
    }

    /// Like [`first_text`](Self::first_text) but a missing message is an error.
    pub fn require_text(&self) -> Result<&str, ProviderError> {
        if let Some(text) = self.first_text() {
            return Ok(text);
        }
        let refusal = self.output.iter().find_map(|item| match item {
            OutputItem::Message { content, .. } => content.iter().find_map(|part| match part {
                ContentPart::Refusal { refusal } => Some(refusal.as_str()),
                _ => None,
            }),
            _ => None,
        });
        Err(match refusal {
            Some(r) => ProviderError::Decode(format!("response {} was refused: {r}", self.id)),
            None => ProviderError::Decode(format!("response {} has no output text", self.id)),
        })
    }

    /// Status of the first web search call item (`completed`, `failed`, …).
    pub fn search_status(&self) -> Option<&str> {
        self.output.iter().find_map(|item| match item {
            OutputItem::WebSearchCall { status, .. } => status.as_deref(),
            _ => None,
        })
    }

    /// Id of the web search call item, falling back to the first item with an id.
    pub fn search_call_id(&self) -> Option<&str> {
        self.output
            .iter()
            .find_map(|item| match item {
                OutputItem::WebSearchCall { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .or_else(|| self.output.iter().find_map(OutputItem::id))
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `respond` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAi(providers::openai_responses::OpenAiResponsesProvider),
    Scripted(providers::scripted::ScriptedProvider),
}

impl LlmProvider {
    /// Send one request and wait for the complete response.
    pub async fn respond(&self, request: &ResponseRequest) -> Result<ModelResponse, ProviderError> {
        match self {
            LlmProvider::OpenAi(p) => p.respond(request).await,
            LlmProvider::Scripted(p) => p.respond(request).await,
        }
    }
}
