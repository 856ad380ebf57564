use std::fmt;

use serde::{Deserialize, Serialize};

/// Posts with more Arabic-block characters than this are treated as Arabic.
const ARABIC_CHAR_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    /// The other supported language, used for template fallback.
    pub fn other(self) -> Language {
        match self {
            Language::English => Language::Arabic,
            Language::Arabic => Language::English,
        }
    }

    pub const ALL: [Language; 2] = [Language::English, Language::Arabic];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify a post body by Arabic script density.
pub fn detect(body: &str) -> Language {
    let arabic = body
        .chars()
        .filter(|c| ('\u{0600}'..='\u{06FF}').contains(c))
        .count();
    if arabic > ARABIC_CHAR_THRESHOLD {
        Language::Arabic
    } else {
        Language::English
    }
}
