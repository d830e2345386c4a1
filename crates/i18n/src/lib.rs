use std::collections::{BTreeMap, BTreeSet};

use core_types::Language;
use thiserror::Error;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum DictionaryError {
    #[error("language `{language}` is missing keys: {}", .keys.join(", "))]
    MissingKeys {
        language: Language,
        keys: Vec<String>,
    },

    #[error("language `{language}` has blank values for: {}", .keys.join(", "))]
    BlankValues {
        language: Language,
        keys: Vec<String>,
    },
}

/// Per-language string tables.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    tables: BTreeMap<Language, BTreeMap<String, String>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut dictionary = Self::new();
        dictionary.extend(Language::En, en_map());
        dictionary.extend(Language::Tl, tl_map());
        dictionary
    }

    pub fn insert(&mut self, language: Language, key: impl Into<String>, value: impl Into<String>) {
        self.tables
            .entry(language)
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn extend<'a>(
        &mut self,
        language: Language,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let table = self.tables.entry(language).or_default();
        table.extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
    }

    pub fn get(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Every key present under any language must be present under all of
    /// them, with non-blank text.
    pub fn validate(&self) -> Result<(), DictionaryError> {
        let all_keys: BTreeSet<&str> = self
            .tables
            .values()
            .flat_map(|table| table.keys().map(String::as_str))
            .collect();

        for language in Language::ALL {
            let missing: Vec<String> = all_keys
                .iter()
                .filter(|key| self.get(language, key).is_none())
                .map(|key| key.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(DictionaryError::MissingKeys {
                    language,
                    keys: missing,
                });
            }

            let blank: Vec<String> = self
                .tables
                .get(&language)
                .into_iter()
                .flatten()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(key, _)| key.clone())
                .collect();
            if !blank.is_empty() {
                return Err(DictionaryError::BlankValues {
                    language,
                    keys: blank,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct I18n {
    lang: Language,
    dictionary: Dictionary,
}

impl I18n {
    pub fn new(lang: Language) -> Self {
        Self::with_dictionary(lang, Dictionary::builtin())
    }

    pub fn with_dictionary(lang: Language, dictionary: Dictionary) -> Self {
        Self { lang, dictionary }
    }

    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    pub fn toggle(&mut self) -> Language {
        self.lang = self.lang.other();
        self.lang
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// Resolves `key` for the active language, echoing the key when no
    /// translation exists or the entry is empty. Never falls back to another
    /// language.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.dictionary
            .get(self.lang, key)
            .filter(|value| !value.is_empty())
            .unwrap_or(key)
    }
}

fn en_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "Batas.AI"),
        ("app.tagline", "Philippine Legal Assistance"),
        ("nav.dashboard", "Dashboard"),
        ("nav.documents", "Documents"),
        ("nav.translate", "Translate"),
        ("nav.chat", "Legal Chat"),
        ("nav.history", "History"),
        ("nav.knowledge", "Legal Knowledge"),
        ("dashboard.welcome", "Welcome to Batas.AI"),
        ("dashboard.welcome_desc", "Your AI-powered Philippine legal assistant"),
        ("dashboard.recent_documents", "Recent Documents"),
        ("dashboard.recent_translations", "Recent Translations"),
        ("dashboard.chat_sessions", "Chat Sessions"),
        ("dashboard.legal_articles", "Legal Articles"),
        ("documents.upload", "Upload Document"),
        ("documents.empty", "No documents uploaded yet"),
        ("documents.upload_first", "Upload your first document"),
        ("documents.drag_drop", "Drag and drop or click to upload"),
        ("documents.supported_formats", "Supported formats: PDF, TXT"),
        ("translate.title", "Translate Text"),
        ("translate.source_language", "Source Language"),
        ("translate.target_language", "Target Language"),
        ("translate.detect", "Auto-detect"),
        ("translate.button", "Translate"),
        ("translate.in_progress", "Translating..."),
        ("translate.original", "Original"),
        ("translate.translation", "Translation"),
        ("english", "English"),
        ("tagalog", "Tagalog"),
        ("chat.ask", "Ask a Legal Question"),
        ("chat.placeholder", "Type your legal question here..."),
        ("chat.send", "Send"),
        ("chat.assistant", "Legal Assistant"),
        ("chat.you", "You"),
        ("chat.thinking", "Thinking..."),
        (
            "chat.disclaimer",
            "This is for informational purposes only and does not constitute legal advice.",
        ),
        ("history.empty", "No translations yet"),
        ("knowledge.empty", "No legal articles found"),
        ("knowledge.category", "Category"),
        ("knowledge.all", "All"),
        ("common.loading", "Loading..."),
    ])
}

fn tl_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "Batas.AI"),
        ("app.tagline", "Tulong Legal ng Pilipinas"),
        ("nav.dashboard", "Dashboard"),
        ("nav.documents", "Mga Dokumento"),
        ("nav.translate", "Isalin"),
        ("nav.chat", "Legal Chat"),
        ("nav.history", "Kasaysayan"),
        ("nav.knowledge", "Kaalaman sa Batas"),
        ("dashboard.welcome", "Maligayang pagdating sa Batas.AI"),
        (
            "dashboard.welcome_desc",
            "Ang iyong AI-powered na tulong legal ng Pilipinas",
        ),
        ("dashboard.recent_documents", "Kamakailang Dokumento"),
        ("dashboard.recent_translations", "Kamakailang Pagsasalin"),
        ("dashboard.chat_sessions", "Mga Chat Session"),
        ("dashboard.legal_articles", "Mga Artikulo ng Batas"),
        ("documents.upload", "Mag-upload ng Dokumento"),
        ("documents.empty", "Walang naka-upload na dokumento"),
        ("documents.upload_first", "Mag-upload ng iyong unang dokumento"),
        (
            "documents.drag_drop",
            "I-drag at i-drop o i-click upang mag-upload",
        ),
        ("documents.supported_formats", "Suportadong format: PDF, TXT"),
        ("translate.title", "Isalin ang Teksto"),
        ("translate.source_language", "Pinagmulang Wika"),
        ("translate.target_language", "Target na Wika"),
        ("translate.detect", "Auto-detect"),
        ("translate.button", "Isalin"),
        ("translate.in_progress", "Nagsasalin..."),
        ("translate.original", "Orihinal"),
        ("translate.translation", "Salin"),
        ("english", "Ingles"),
        ("tagalog", "Tagalog"),
        ("chat.ask", "Magtanong ng Legal na Katanungan"),
        ("chat.placeholder", "I-type ang iyong legal na tanong dito..."),
        ("chat.send", "Ipadala"),
        ("chat.assistant", "Legal Assistant"),
        ("chat.you", "Ikaw"),
        ("chat.thinking", "Nag-iisip..."),
        (
            "chat.disclaimer",
            "Ito ay para sa layuning pang-impormasyon lamang at hindi bumubuo ng legal na payo.",
        ),
        ("history.empty", "Wala pang pagsasalin"),
        ("knowledge.empty", "Walang nahanap na artikulo ng batas"),
        ("knowledge.category", "Kategorya"),
        ("knowledge.all", "Lahat"),
        ("common.loading", "Naglo-load..."),
    ])
}
