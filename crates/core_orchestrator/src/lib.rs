mod chat;
mod fetch;
mod notify;
mod views;

#[cfg(test)]
mod testing;

pub use chat::{
    CHAT_APOLOGY, CHAT_FAILURE_NOTICE, ChatSessionController, ChatState, RejectReason,
    SendOutcome, create_session,
};
pub use fetch::{
    FailureNotice, FetchState, ViewData, ViewPhase, ViewState, ViewUpdater, load_view_data,
};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use views::{
    ALL_FILTER, DashboardData, DashboardView, DocumentsView, HistoryView, KNOWLEDGE_CATEGORIES,
    KnowledgeView, RECENT_DOCUMENTS_LIMIT, TranslateView, filter_documents, load_dashboard,
    load_documents, load_knowledge, load_translations,
};
