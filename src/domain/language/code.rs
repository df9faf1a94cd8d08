//! Supported conversation languages and label normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language the avatar can hold a conversation in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Es, Language::En];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Maps a raw recognizer label onto the supported set.
    ///
    /// Accepts ISO 639-1/639-2 codes, BCP-47 tags (`es-MX`, `en_US`) and
    /// plain language names in either language. Anything else is `None`,
    /// which callers treat as "keep the current language".
    pub fn normalize(label: &str) -> Option<Language> {
        let lowered = label.trim().to_lowercase();
        let primary = lowered
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default();

        match primary {
            "es" | "spa" | "spanish" | "español" | "espanol" | "castellano" => Some(Self::Es),
            "en" | "eng" | "english" | "inglés" | "ingles" => Some(Self::En),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
