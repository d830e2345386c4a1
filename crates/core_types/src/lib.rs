use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Language {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "tl")]
    Tl,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Tl];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tl => "tl",
        }
    }

    /// Dictionary key of the language's display name (`english` / `tagalog`).
    pub fn name_key(self) -> &'static str {
        match self {
            Language::En => "english",
            Language::Tl => "tagalog",
        }
    }

    pub fn other(self) -> Language {
        match self {
            Language::En => Language::Tl,
            Language::Tl => Language::En,
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "tl" => Some(Language::Tl),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier of one chat conversation, e.g. `session_1718000000000_3`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Millisecond timestamp plus a process-wide sequence, so two ids generated
    /// in the same millisecond still differ.
    pub fn generate() -> Self {
        let seq = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("session_{}_{seq}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub created_at: String,
}

/// A file picked for upload; the backend accepts PDF and plain text.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn mime_type(&self) -> &'static str {
        if self.filename.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "text/plain"
        }
    }
}

pub const AUTO_DETECT: &str = "auto";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslateRequest {
    /// `source: None` asks the backend to detect the language.
    pub fn new(text: impl Into<String>, source: Option<Language>, target: Language) -> Self {
        Self {
            text: text.into(),
            source_language: source.map_or(AUTO_DETECT, Language::code).to_string(),
            target_language: target.code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct TranslationRecord {
    pub id: String,
    pub source_language: String,
    pub target_language: String,
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct LegalArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct KnowledgeQuery {
    pub category: Option<String>,
    pub language: Option<String>,
    pub q: Option<String>,
}

impl KnowledgeQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("category", self.category.as_deref()),
            ("language", self.language.as_deref()),
            ("q", self.q.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Stats {
    #[serde(default)]
    pub documents: u64,
    #[serde(default)]
    pub translations: u64,
    #[serde(default)]
    pub chat_sessions: u64,
    #[serde(default)]
    pub legal_articles: u64,
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The REST backend under `{base_url}/api`.
#[async_trait]
pub trait LegalApi: Send + Sync {
    async fn list_documents(&self, limit: Option<u32>) -> ApiResult<Vec<DocumentSummary>>;
    async fn upload_document(&self, upload: DocumentUpload) -> ApiResult<()>;
    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatReply>;
    async fn translate(&self, request: &TranslateRequest) -> ApiResult<TranslateResponse>;
    async fn list_translations(&self) -> ApiResult<Vec<TranslationRecord>>;
    async fn search_legal_knowledge(
        &self,
        query: &KnowledgeQuery,
    ) -> ApiResult<Vec<LegalArticle>>;
    async fn stats(&self) -> ApiResult<Stats>;
}
