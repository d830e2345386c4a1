use core_orchestrator::{DashboardData, FetchState, ViewPhase};
use core_types::{ChatMessage, ChatRole, DocumentSummary, LegalArticle, TranslationRecord};
use i18n::I18n;

pub fn header(i18n: &I18n) -> String {
    format!("{} | {}", i18n.t("app.title"), i18n.t("app.tagline"))
}

pub fn nav(i18n: &I18n) -> String {
    [
        ("/dashboard", "nav.dashboard"),
        ("/docs", "nav.documents"),
        ("/translate", "nav.translate"),
        ("/history", "nav.history"),
        ("/knowledge", "nav.knowledge"),
        ("/lang", i18n.language().other().name_key()),
    ]
    .iter()
    .map(|(command, key)| format!("{command} {}", i18n.t(key)))
    .collect::<Vec<_>>()
    .join("  ")
}

pub fn dashboard(i18n: &I18n, state: &FetchState<DashboardData>) -> String {
    let mut lines = vec![
        i18n.t("dashboard.welcome").to_string(),
        i18n.t("dashboard.welcome_desc").to_string(),
        String::new(),
    ];
    let stats = &state.data.stats;
    for (key, value) in [
        ("dashboard.recent_documents", stats.documents),
        ("dashboard.recent_translations", stats.translations),
        ("dashboard.chat_sessions", stats.chat_sessions),
        ("dashboard.legal_articles", stats.legal_articles),
    ] {
        lines.push(format!("  {}: {value}", i18n.t(key)));
    }
    lines.push(String::new());
    lines.push(i18n.t("dashboard.recent_documents").to_string());
    match state.phase() {
        ViewPhase::Loading => lines.push(format!("  {}", i18n.t("common.loading"))),
        ViewPhase::Empty => lines.push(format!("  {}", i18n.t("documents.empty"))),
        ViewPhase::Populated => {
            lines.extend(state.data.recent_documents.iter().map(document_line))
        }
    }
    lines.join("\n")
}

pub fn documents(
    i18n: &I18n,
    state: &FetchState<Vec<DocumentSummary>>,
    shown: &[DocumentSummary],
) -> String {
    let mut lines = vec![i18n.t("nav.documents").to_string()];
    match state.phase() {
        ViewPhase::Loading => lines.push(format!("  {}", i18n.t("common.loading"))),
        ViewPhase::Empty => {
            lines.push(format!("  {}", i18n.t("documents.empty")));
            lines.push(format!("  {}", i18n.t("documents.upload_first")));
        }
        ViewPhase::Populated => lines.extend(shown.iter().map(document_line)),
    }
    lines.push(format!("  {}", i18n.t("documents.supported_formats")));
    lines.join("\n")
}

fn document_line(doc: &DocumentSummary) -> String {
    format!("  - {} [{}] {}", doc.filename, doc.language, doc.created_at)
}

pub fn history(i18n: &I18n, state: &FetchState<Vec<TranslationRecord>>) -> String {
    let mut lines = vec![i18n.t("nav.history").to_string()];
    match state.phase() {
        ViewPhase::Loading => lines.push(format!("  {}", i18n.t("common.loading"))),
        ViewPhase::Empty => lines.push(format!("  {}", i18n.t("history.empty"))),
        ViewPhase::Populated => {
            for record in &state.data {
                lines.push(format!(
                    "  {} -> {}: {} => {}",
                    record.source_language,
                    record.target_language,
                    record.original_text,
                    record.translated_text
                ));
            }
        }
    }
    lines.join("\n")
}

pub fn knowledge(i18n: &I18n, state: &FetchState<Vec<LegalArticle>>) -> String {
    let mut lines = vec![i18n.t("nav.knowledge").to_string()];
    match state.phase() {
        ViewPhase::Loading => lines.push(format!("  {}", i18n.t("common.loading"))),
        ViewPhase::Empty => lines.push(format!("  {}", i18n.t("knowledge.empty"))),
        ViewPhase::Populated => {
            for law in &state.data {
                lines.push(format!("  - {} ({}, {})", law.title, law.category, law.language));
                lines.push(format!("    {}", law.content));
            }
        }
    }
    lines.join("\n")
}

pub fn message(i18n: &I18n, message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => i18n.t("chat.you"),
        ChatRole::Assistant => i18n.t("chat.assistant"),
    };
    format!("{speaker}: {}", message.content)
}
