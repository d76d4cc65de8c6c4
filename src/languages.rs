// src/languages.rs
// Static registry of supported target languages

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// Internal id used by the upload form, e.g. "spanish"
    pub key: &'static str,
    /// Display label in the language itself
    pub label: &'static str,
    /// Code understood by the translation service
    pub code: &'static str,
    pub icon: &'static str,
}

const BUILTIN_LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig { key: "spanish", label: "Español", code: "es", icon: "🇪🇸" },
    LanguageConfig { key: "chinese", label: "中文 (简体)", code: "zh-CN", icon: "🇨🇳" },
    LanguageConfig { key: "vietnamese", label: "Tiếng Việt", code: "vi", icon: "🇻🇳" },
    LanguageConfig { key: "tagalog", label: "Tagalog", code: "tl", icon: "🇵🇭" },
    LanguageConfig { key: "arabic", label: "العربية", code: "ar", icon: "🇸🇦" },
    LanguageConfig { key: "french", label: "Français", code: "fr", icon: "🇫🇷" },
    LanguageConfig { key: "korean", label: "한국어", code: "ko", icon: "🇰🇷" },
    LanguageConfig { key: "russian", label: "Русский", code: "ru", icon: "🇷🇺" },
    LanguageConfig { key: "portuguese", label: "Português", code: "pt", icon: "🇧🇷" },
    LanguageConfig { key: "haitian_creole", label: "Kreyòl Ayisyen", code: "ht", icon: "🇭🇹" },
    LanguageConfig { key: "hindi", label: "हिन्दी", code: "hi", icon: "🇮🇳" },
    LanguageConfig { key: "somali", label: "Soomaali", code: "so", icon: "🇸🇴" },
];

/// Lookup table from language key to translation code. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct LanguageRegistry {
    entries: &'static [LanguageConfig],
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageRegistry {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_LANGUAGES,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&'static LanguageConfig> {
        let wanted = key.trim().to_lowercase();
        self.entries.iter().find(|lang| lang.key == wanted)
    }

    pub fn all(&self) -> &'static [LanguageConfig] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
