use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use core_types::{
    ApiError, ApiResult, ChatReply, ChatRequest, DocumentSummary, DocumentUpload, KnowledgeQuery,
    LegalApi, LegalArticle, Stats, TranslateRequest, TranslateResponse, TranslationRecord,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::notify::{Notification, Notifier};

pub(crate) fn offline() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

/// Scripted backend. Each endpoint answers from its field; `gate`, when set,
/// holds every call open until notified.
pub(crate) struct FakeApi {
    pub gate: Option<Arc<Notify>>,
    pub chat: Mutex<VecDeque<ApiResult<ChatReply>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub documents: Mutex<ApiResult<Vec<DocumentSummary>>>,
    pub document_limits: Mutex<Vec<Option<u32>>>,
    pub upload: Mutex<ApiResult<()>>,
    pub translate: Mutex<ApiResult<TranslateResponse>>,
    pub translate_requests: Mutex<Vec<TranslateRequest>>,
    pub translations: Mutex<ApiResult<Vec<TranslationRecord>>>,
    pub laws: Mutex<ApiResult<Vec<LegalArticle>>>,
    pub knowledge_queries: Mutex<Vec<KnowledgeQuery>>,
    pub stats: Mutex<ApiResult<Stats>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            gate: None,
            chat: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            documents: Mutex::new(Ok(Vec::new())),
            document_limits: Mutex::new(Vec::new()),
            upload: Mutex::new(Ok(())),
            translate: Mutex::new(Err(offline())),
            translate_requests: Mutex::new(Vec::new()),
            translations: Mutex::new(Ok(Vec::new())),
            laws: Mutex::new(Ok(Vec::new())),
            knowledge_queries: Mutex::new(Vec::new()),
            stats: Mutex::new(Ok(Stats::default())),
        }
    }
}

impl FakeApi {
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

pub(crate) fn document(id: &str, filename: &str) -> DocumentSummary {
    DocumentSummary {
        id: id.to_string(),
        filename: filename.to_string(),
        language: "en".to_string(),
        created_at: "2024-05-01T00:00:00Z".to_string(),
    }
}

#[async_trait]
impl LegalApi for FakeApi {
    async fn list_documents(&self, limit: Option<u32>) -> ApiResult<Vec<DocumentSummary>> {
        self.document_limits.lock().push(limit);
        self.wait().await;
        self.documents.lock().clone()
    }

    async fn upload_document(&self, _upload: DocumentUpload) -> ApiResult<()> {
        self.wait().await;
        self.upload.lock().clone()
    }

    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
        self.chat_requests.lock().push(request.clone());
        self.wait().await;
        self.chat.lock().pop_front().unwrap_or_else(|| Err(offline()))
    }

    async fn translate(&self, request: &TranslateRequest) -> ApiResult<TranslateResponse> {
        self.translate_requests.lock().push(request.clone());
        self.wait().await;
        self.translate.lock().clone()
    }

    async fn list_translations(&self) -> ApiResult<Vec<TranslationRecord>> {
        self.wait().await;
        self.translations.lock().clone()
    }

    async fn search_legal_knowledge(
        &self,
        query: &KnowledgeQuery,
    ) -> ApiResult<Vec<LegalArticle>> {
        self.knowledge_queries.lock().push(query.clone());
        self.wait().await;
        self.laws.lock().clone()
    }

    async fn stats(&self) -> ApiResult<Stats> {
        self.wait().await;
        self.stats.lock().clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .map(|notification| notification.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
