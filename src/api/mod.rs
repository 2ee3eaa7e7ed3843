//! Wire payloads for the Spark chat-completion protocol.
//!
//! The structs below mirror the service's JSON shapes exactly. Optional
//! request fields are omitted from the encoded output rather than sent as
//! null placeholders, and unknown fields in inbound messages are ignored so
//! newer server revisions keep decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codec;

/// The author of a message or content fragment.
///
/// Inbound role strings outside the known set are preserved verbatim in
/// [`Role::Other`] instead of failing the whole message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(untagged)]
    Other(String),
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub header: RequestHeader,
    pub parameter: RequestParameter,
    pub payload: RequestPayload,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct RequestHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct RequestParameter {
    pub chat: ChatParameter,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatParameter {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize, Clone, Debug)]
pub struct RequestPayload {
    pub message: MessageBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<FunctionBlock>,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageBlock {
    pub text: Vec<ChatMessage>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub content: String,
    pub role: Role,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::System,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::User,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct FunctionBlock {
    pub text: Vec<FunctionSpec>,
}

/// A callable tool offered to the model. `parameters` is an open JSON schema
/// object passed through opaquely.
#[derive(Serialize, Clone, Debug)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One incremental message of a streaming completion response.
#[derive(Deserialize, Clone, Debug)]
pub struct ChatChunk {
    pub header: ChunkHeader,
    #[serde(default)]
    pub payload: Option<ChunkPayload>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChunkHeader {
    /// 0 on success; nonzero codes terminate the session and carry `message`
    /// as human-readable detail.
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// Server-assigned session id, stable across all chunks of one session.
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub status: i64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChunkPayload {
    pub choices: ChunkChoices,
    #[serde(default)]
    pub usage: Option<ChunkUsage>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChunkChoices {
    /// 0 = first chunk, 1 = continuing, 2 = terminal.
    pub status: i64,
    /// Zero-based, nondecreasing delivery sequence number.
    pub seq: i64,
    #[serde(default)]
    pub text: Vec<ChunkText>,
}

impl ChunkChoices {
    pub fn is_terminal(&self) -> bool {
        self.status == 2
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChunkText {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChunkUsage {
    pub text: TokenUsage,
}

/// Token accounting, present only on the terminal chunk.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    #[serde(default)]
    pub question_tokens: u32,
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
