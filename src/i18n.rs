//! Internationalization (i18n) module
//!
//! Month names for the directory layout and locale detection for the CLI.
//! Log messages remain in English for consistency.

use serde::{Deserialize, Serialize};

/// Languages available for month folder names and CLI messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "en")]
    #[serde(rename = "en")]
    English,
    #[value(name = "de")]
    #[serde(rename = "de")]
    German,
    #[value(name = "zh")]
    #[serde(rename = "zh")]
    ChineseSimplified,
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const MONTHS_DE: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];

const MONTHS_ZH: [&str; 12] = [
    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];

impl Language {
    /// Full month name for a 1-based month number
    ///
    /// Returns `None` for numbers outside `1..=12`.
    pub fn month_name(self, month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        let table = match self {
            Language::English => &MONTHS_EN,
            Language::German => &MONTHS_DE,
            Language::ChineseSimplified => &MONTHS_ZH,
        };
        table.get(index).copied()
    }

    /// Locale tag used for CLI message lookup
    pub fn locale_tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::ChineseSimplified => "zh-CN",
        }
    }

    /// Map a BCP-47 style locale string (`de-DE`, `zh_CN.UTF-8`) to a language
    pub fn from_locale(locale: &str) -> Language {
        let locale = locale.to_lowercase();
        if locale.starts_with("zh") || locale.contains("hans") {
            Language::ChineseSimplified
        } else if locale.starts_with("de") {
            Language::German
        } else {
            Language::English
        }
    }

    /// Detect the language from the operating system locale
    pub fn detect() -> Language {
        sys_locale::get_locale()
            .map(|locale| Language::from_locale(&locale))
            .unwrap_or_default()
    }
}

/// Initialize the CLI message locale from the system settings
pub fn init_locale() -> Language {
    let language = Language::detect();
    rust_i18n::set_locale(language.locale_tag());
    language
}
