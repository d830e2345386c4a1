use std::future::Future;
use std::sync::Arc;

use core_types::{
    ApiError, DocumentSummary, DocumentUpload, KnowledgeQuery, Language, LegalApi, LegalArticle,
    Stats, TranslateRequest, TranslationRecord,
};
use tracing::{info, warn};

use crate::fetch::{FailureNotice, FetchState, ViewData, ViewState, load_view_data};
use crate::notify::Notifier;

pub const RECENT_DOCUMENTS_LIMIT: u32 = 5;
pub const KNOWLEDGE_CATEGORIES: [&str; 5] = [
    "Civil Law",
    "Labor Law",
    "Criminal Law",
    "Family Law",
    "Privacy Law",
];
pub const ALL_FILTER: &str = "all";

const DOCUMENTS_LOAD_FAILED: &str = "Failed to load documents";
const UPLOAD_SUCCEEDED: &str = "Document uploaded successfully";
const UPLOAD_FAILED: &str = "Failed to upload document";
const TRANSLATE_EMPTY: &str = "Please enter text to translate";
const TRANSLATE_SUCCEEDED: &str = "Translation completed";
const TRANSLATE_FAILED: &str = "Translation failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardData {
    pub stats: Stats,
    pub recent_documents: Vec<DocumentSummary>,
}

impl ViewData for DashboardData {
    fn is_empty(&self) -> bool {
        self.recent_documents.is_empty()
    }
}

/// Stats and recent documents are requested together; either failing leaves
/// the whole dashboard at its defaults.
pub async fn load_dashboard(api: &dyn LegalApi) -> FetchState<DashboardData> {
    load_view_data(
        "dashboard",
        async {
            let (stats, recent_documents) = futures::try_join!(
                api.stats(),
                api.list_documents(Some(RECENT_DOCUMENTS_LIMIT))
            )?;
            Ok::<_, ApiError>(DashboardData {
                stats,
                recent_documents,
            })
        },
        None,
    )
    .await
}

pub async fn load_documents(
    api: &dyn LegalApi,
    notifier: &dyn Notifier,
) -> FetchState<Vec<DocumentSummary>> {
    load_view_data(
        "documents",
        api.list_documents(None),
        Some(FailureNotice {
            notifier,
            message: DOCUMENTS_LOAD_FAILED,
        }),
    )
    .await
}

pub async fn load_translations(api: &dyn LegalApi) -> FetchState<Vec<TranslationRecord>> {
    load_view_data("history", api.list_translations(), None).await
}

pub async fn load_knowledge(
    api: &dyn LegalApi,
    query: &KnowledgeQuery,
) -> FetchState<Vec<LegalArticle>> {
    load_view_data("knowledge", api.search_legal_knowledge(query), None).await
}

/// Case-insensitive filename match; a blank query keeps everything.
pub fn filter_documents(documents: &[DocumentSummary], query: &str) -> Vec<DocumentSummary> {
    let needle = query.trim().to_lowercase();
    documents
        .iter()
        .filter(|doc| doc.filename.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub struct DashboardView {
    api: Arc<dyn LegalApi>,
    state: ViewState<DashboardData>,
}

impl DashboardView {
    pub fn mount(api: Arc<dyn LegalApi>) -> Self {
        Self {
            api,
            state: ViewState::mount(),
        }
    }

    pub fn state(&self) -> &ViewState<DashboardData> {
        &self.state
    }

    pub fn load(&self) -> impl Future<Output = bool> + Send + use<> {
        let api = Arc::clone(&self.api);
        let updater = self.state.updater();
        async move { updater.settle(load_dashboard(api.as_ref())).await }
    }
}

pub struct DocumentsView {
    api: Arc<dyn LegalApi>,
    notifier: Arc<dyn Notifier>,
    state: ViewState<Vec<DocumentSummary>>,
}

impl DocumentsView {
    pub fn mount(api: Arc<dyn LegalApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: ViewState::mount(),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<DocumentSummary>> {
        &self.state
    }

    pub fn load(&self) -> impl Future<Output = bool> + Send + use<> {
        let api = Arc::clone(&self.api);
        let notifier = Arc::clone(&self.notifier);
        let updater = self.state.updater();
        async move {
            updater
                .settle(load_documents(api.as_ref(), notifier.as_ref()))
                .await
        }
    }

    pub fn filtered(&self, query: &str) -> Vec<DocumentSummary> {
        self.state.with(|state| filter_documents(&state.data, query))
    }

    /// Uploads one file and re-fetches the list on success.
    pub async fn upload(&self, upload: DocumentUpload) -> bool {
        let filename = upload.filename.clone();
        match self.api.upload_document(upload).await {
            Ok(()) => {
                info!(filename = %filename, "document uploaded");
                self.notifier.success(UPLOAD_SUCCEEDED);
                self.load().await;
                true
            }
            Err(err) => {
                warn!(filename = %filename, error = %err, "document upload failed");
                self.notifier.error(UPLOAD_FAILED);
                false
            }
        }
    }
}

pub struct TranslateView {
    api: Arc<dyn LegalApi>,
    notifier: Arc<dyn Notifier>,
    source: Option<Language>,
    target: Language,
    translated_text: String,
}

impl TranslateView {
    /// The target starts as the language opposite the active UI language.
    pub fn mount(
        api: Arc<dyn LegalApi>,
        notifier: Arc<dyn Notifier>,
        ui_language: Language,
    ) -> Self {
        Self {
            api,
            notifier,
            source: None,
            target: ui_language.other(),
            translated_text: String::new(),
        }
    }

    pub fn source(&self) -> Option<Language> {
        self.source
    }

    pub fn set_source(&mut self, source: Option<Language>) {
        self.source = source;
    }

    pub fn target(&self) -> Language {
        self.target
    }

    pub fn set_target(&mut self, target: Language) {
        self.target = target;
    }

    /// Re-derives the target after the UI language changes.
    pub fn follow_ui_language(&mut self, ui_language: Language) {
        self.target = ui_language.other();
    }

    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    pub async fn translate(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            self.notifier.error(TRANSLATE_EMPTY);
            return false;
        }

        let request = TranslateRequest::new(text, self.source, self.target);
        match self.api.translate(&request).await {
            Ok(response) => {
                self.translated_text = response.translated_text;
                self.notifier.success(TRANSLATE_SUCCEEDED);
                true
            }
            Err(err) => {
                warn!(target_language = %self.target, error = %err, "translation failed");
                self.notifier.error(TRANSLATE_FAILED);
                false
            }
        }
    }
}

pub struct HistoryView {
    api: Arc<dyn LegalApi>,
    state: ViewState<Vec<TranslationRecord>>,
}

impl HistoryView {
    pub fn mount(api: Arc<dyn LegalApi>) -> Self {
        Self {
            api,
            state: ViewState::mount(),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<TranslationRecord>> {
        &self.state
    }

    pub fn load(&self) -> impl Future<Output = bool> + Send + use<> {
        let api = Arc::clone(&self.api);
        let updater = self.state.updater();
        async move { updater.settle(load_translations(api.as_ref())).await }
    }
}

/// Legal articles filtered by category, language and free text. `all` and
/// blank search text leave the filter unset.
pub struct KnowledgeView {
    api: Arc<dyn LegalApi>,
    state: ViewState<Vec<LegalArticle>>,
    category: String,
    language: String,
    search: String,
}

impl KnowledgeView {
    pub fn mount(api: Arc<dyn LegalApi>) -> Self {
        Self {
            api,
            state: ViewState::mount(),
            category: ALL_FILTER.to_string(),
            language: ALL_FILTER.to_string(),
            search: String::new(),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<LegalArticle>> {
        &self.state
    }

    pub fn query(&self) -> KnowledgeQuery {
        KnowledgeQuery {
            category: filter_value(&self.category),
            language: filter_value(&self.language),
            q: Some(self.search.trim())
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }

    pub fn load(&self) -> impl Future<Output = bool> + Send + use<> {
        let api = Arc::clone(&self.api);
        let updater = self.state.updater();
        let query = self.query();
        async move { updater.settle(load_knowledge(api.as_ref(), &query)).await }
    }

    /// Returns the re-fetch to run, or `None` when the filter did not change
    /// and the view has already settled. A view that has never settled
    /// always fetches.
    pub fn set_category(
        &mut self,
        category: &str,
    ) -> Option<impl Future<Output = bool> + Send + use<>> {
        if self.category == category && self.is_settled() {
            return None;
        }
        self.category = category.to_string();
        Some(self.load())
    }

    pub fn set_language(
        &mut self,
        language: &str,
    ) -> Option<impl Future<Output = bool> + Send + use<>> {
        if self.language == language && self.is_settled() {
            return None;
        }
        self.language = language.to_string();
        Some(self.load())
    }

    fn is_settled(&self) -> bool {
        self.state.with(|state| !state.is_loading)
    }

    pub fn search(&mut self, text: &str) -> impl Future<Output = bool> + Send + use<> {
        self.search = text.to_string();
        self.load()
    }
}

fn filter_value(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL_FILTER) {
        None
    } else {
        Some(value.to_string())
    }
}
