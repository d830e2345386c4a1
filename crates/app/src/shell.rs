use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use core_orchestrator::{
    ALL_FILTER, ChatSessionController, DashboardView, DocumentsView, HistoryView,
    KNOWLEDGE_CATEGORIES, KnowledgeView, Notification, NotificationLevel, Notifier, SendOutcome,
    TracingNotifier, TranslateView,
};
use core_types::{AUTO_DETECT, DocumentUpload, Language, LegalApi};
use i18n::I18n;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    ToggleLanguage,
    SetLanguage(Language),
    Documents(Option<String>),
    Upload(PathBuf),
    Translate(String),
    Source(Option<Language>),
    Target(Language),
    History,
    Knowledge(Option<String>),
    Category(String),
    KnowledgeLanguage(String),
    Help,
    Quit,
    Chat(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Chat(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let optional = || Some(arg.to_string()).filter(|arg| !arg.is_empty());

    let command = match name {
        "dashboard" => Command::Dashboard,
        "lang" if arg.is_empty() => Command::ToggleLanguage,
        "lang" => match Language::from_code(arg) {
            Some(language) => Command::SetLanguage(language),
            None => Command::Unknown(line.to_string()),
        },
        "docs" => Command::Documents(optional()),
        "upload" if !arg.is_empty() => Command::Upload(PathBuf::from(arg)),
        "translate" => Command::Translate(arg.to_string()),
        "source" if arg.eq_ignore_ascii_case(AUTO_DETECT) => Command::Source(None),
        "source" => match Language::from_code(arg) {
            Some(language) => Command::Source(Some(language)),
            None => Command::Unknown(line.to_string()),
        },
        "target" => match Language::from_code(arg) {
            Some(language) => Command::Target(language),
            None => Command::Unknown(line.to_string()),
        },
        "history" => Command::History,
        "knowledge" => Command::Knowledge(optional()),
        "category" if !arg.is_empty() => Command::Category(arg.to_string()),
        "language" if arg.eq_ignore_ascii_case(ALL_FILTER) => {
            Command::KnowledgeLanguage(ALL_FILTER.to_string())
        }
        "language" => match Language::from_code(arg) {
            Some(language) => Command::KnowledgeLanguage(language.code().to_string()),
            None => Command::Unknown(line.to_string()),
        },
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

/// Prints toasts to stderr and records them in the log.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        match notification.level {
            NotificationLevel::Success => eprintln!("[ok] {}", notification.message),
            NotificationLevel::Error => eprintln!("[error] {}", notification.message),
        }
    }
}

/// The running client: owns the language selection and every mounted view.
/// Views receive the resolver by reference when they render.
pub struct Shell {
    i18n: I18n,
    api: Arc<dyn LegalApi>,
    chat: ChatSessionController,
    documents: DocumentsView,
    translate: TranslateView,
    knowledge: KnowledgeView,
}

impl Shell {
    pub fn new(i18n: I18n, api: Arc<dyn LegalApi>, notifier: Arc<dyn Notifier>) -> Self {
        let ui_language = i18n.language();
        Self {
            chat: ChatSessionController::new(Arc::clone(&api), Arc::clone(&notifier)),
            documents: DocumentsView::mount(Arc::clone(&api), Arc::clone(&notifier)),
            translate: TranslateView::mount(Arc::clone(&api), notifier, ui_language),
            knowledge: KnowledgeView::mount(Arc::clone(&api)),
            api,
            i18n,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("failed to start line editor")?;
        println!("{}", render::header(&self.i18n));
        println!("{}", render::nav(&self.i18n));
        self.show_dashboard().await;
        println!("\n{}", self.i18n.t("chat.disclaimer"));
        info!(session_id = %self.chat.session_id(), "shell started");

        loop {
            match editor.readline(&format!("{} > ", self.i18n.t("chat.ask"))) {
                Ok(line) => {
                    let Some(command) = parse_command(&line) else {
                        continue;
                    };
                    let _ = editor.add_history_entry(line.as_str());
                    if command == Command::Quit {
                        break;
                    }
                    self.dispatch(command).await;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read input"),
            }
        }
        info!(session_id = %self.chat.session_id(), "shell closed");
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::Dashboard => self.show_dashboard().await,
            Command::ToggleLanguage => {
                let language = self.i18n.toggle();
                self.language_changed(language);
            }
            Command::SetLanguage(language) => {
                self.i18n.set_language(language);
                self.language_changed(language);
            }
            Command::Documents(filter) => {
                self.documents.load().await;
                let shown = self.documents.filtered(filter.as_deref().unwrap_or_default());
                let text = self
                    .documents
                    .state()
                    .with(|state| render::documents(&self.i18n, state, &shown));
                println!("{text}");
            }
            Command::Upload(path) => match read_upload(&path) {
                Ok(upload) => {
                    self.documents.upload(upload).await;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read upload");
                    eprintln!("[error] {err:#}");
                }
            },
            Command::Translate(text) => {
                println!("{}", self.i18n.t("translate.in_progress"));
                if self.translate.translate(&text).await {
                    println!(
                        "{} ({}): {}",
                        self.i18n.t("translate.translation"),
                        self.i18n.t(self.translate.target().name_key()),
                        self.translate.translated_text()
                    );
                }
            }
            Command::Source(source) => {
                self.translate.set_source(source);
                println!("{}", translate_direction(&self.i18n, &self.translate));
            }
            Command::Target(target) => {
                self.translate.set_target(target);
                println!("{}", translate_direction(&self.i18n, &self.translate));
            }
            Command::History => {
                let history = HistoryView::mount(Arc::clone(&self.api));
                history.load().await;
                let text = history
                    .state()
                    .with(|state| render::history(&self.i18n, state));
                println!("{text}");
            }
            Command::Knowledge(query) => {
                self.knowledge.search(query.as_deref().unwrap_or_default()).await;
                self.show_knowledge();
            }
            Command::Category(category) => {
                let category = resolve_category(&category);
                if let Some(refetch) = self.knowledge.set_category(&category) {
                    refetch.await;
                }
                self.show_knowledge();
            }
            Command::KnowledgeLanguage(language) => {
                if let Some(refetch) = self.knowledge.set_language(&language) {
                    refetch.await;
                }
                self.show_knowledge();
            }
            Command::Help => {
                println!("{}", render::nav(&self.i18n));
                println!(
                    "/upload <path>  /source <auto|en|tl>  /target <en|tl>  /category <{}>  \
                     /language <all|en|tl>  /quit",
                    category_choices()
                );
            }
            Command::Chat(text) => self.send_chat(&text).await,
            Command::Unknown(line) => eprintln!("[error] unknown command: {line}"),
            Command::Quit => {}
        }
    }

    /// The translate target always sits opposite the UI language, as it does
    /// when the view is first mounted.
    fn language_changed(&mut self, language: Language) {
        info!(%language, "ui language changed");
        self.translate.follow_ui_language(language);
        println!("{}", render::header(&self.i18n));
        println!("{}", render::nav(&self.i18n));
    }

    async fn show_dashboard(&self) {
        let dashboard = DashboardView::mount(Arc::clone(&self.api));
        dashboard.load().await;
        let text = dashboard
            .state()
            .with(|state| render::dashboard(&self.i18n, state));
        println!("{text}");
    }

    fn show_knowledge(&self) {
        let text = self
            .knowledge
            .state()
            .with(|state| render::knowledge(&self.i18n, state));
        println!("{text}");
    }

    async fn send_chat(&self, text: &str) {
        let before = self.chat.messages().len();
        println!("{}", self.i18n.t("chat.thinking"));
        if let SendOutcome::Rejected(reason) = self.chat.send_message(text).await {
            warn!(?reason, "chat message not sent");
            return;
        }
        for message in self.chat.messages().iter().skip(before + 1) {
            println!("{}", render::message(&self.i18n, message));
        }
    }
}

fn translate_direction(i18n: &I18n, view: &TranslateView) -> String {
    let source = view
        .source()
        .map_or(AUTO_DETECT, |language| i18n.t(language.name_key()));
    format!("{source} -> {}", i18n.t(view.target().name_key()))
}

fn read_upload(path: &Path) -> Result<DocumentUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid file name {}", path.display()))?
        .to_string();
    Ok(DocumentUpload { filename, bytes })
}

/// Matches a known category case-insensitively; anything else passes through.
fn resolve_category(input: &str) -> String {
    if input.eq_ignore_ascii_case(ALL_FILTER) {
        return ALL_FILTER.to_string();
    }
    KNOWLEDGE_CATEGORIES
        .iter()
        .find(|category| category.eq_ignore_ascii_case(input))
        .map_or_else(|| input.to_string(), |category| category.to_string())
}

fn category_choices() -> String {
    std::iter::once(ALL_FILTER)
        .chain(KNOWLEDGE_CATEGORIES)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_chat_message() {
        assert_eq!(
            parse_command("What is due process?"),
            Some(Command::Chat("What is due process?".to_string()))
        );
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("/docs lease"),
            Some(Command::Documents(Some("lease".to_string())))
        );
        assert_eq!(parse_command("/docs"), Some(Command::Documents(None)));
        assert_eq!(
            parse_command("/upload ./contract.txt"),
            Some(Command::Upload(PathBuf::from("./contract.txt")))
        );
        assert_eq!(
            parse_command("/category Labor Law"),
            Some(Command::Category("Labor Law".to_string()))
        );
        assert_eq!(parse_command("/lang"), Some(Command::ToggleLanguage));
        assert_eq!(parse_command("/lang tl"), Some(Command::SetLanguage(Language::Tl)));
        assert_eq!(parse_command("/exit"), Some(Command::Quit));
    }

    #[test]
    fn parses_translate_and_knowledge_language_options() {
        assert_eq!(parse_command("/source auto"), Some(Command::Source(None)));
        assert_eq!(parse_command("/source EN"), Some(Command::Source(Some(Language::En))));
        assert_eq!(parse_command("/target tl"), Some(Command::Target(Language::Tl)));
        assert_eq!(
            parse_command("/language All"),
            Some(Command::KnowledgeLanguage("all".to_string()))
        );
        assert_eq!(
            parse_command("/language tl"),
            Some(Command::KnowledgeLanguage("tl".to_string()))
        );
        assert_eq!(
            parse_command("/target fr"),
            Some(Command::Unknown("/target fr".to_string()))
        );
    }

    #[test]
    fn missing_required_argument_is_unknown() {
        assert_eq!(
            parse_command("/upload"),
            Some(Command::Unknown("/upload".to_string()))
        );
    }

    #[test]
    fn category_names_are_normalized() {
        assert_eq!(resolve_category("labor law"), "Labor Law");
        assert_eq!(resolve_category("ALL"), "all");
        assert_eq!(resolve_category("Tax Law"), "Tax Law");
        assert!(category_choices().starts_with("all|Civil Law"));
    }
}
