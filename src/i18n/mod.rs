// Internationalization: locale catalog, translator and the active-locale store.
//
// All user-visible strings go through `Translator`. Screens hold a
// `LocaleStore` handle to read or switch the active language.

pub mod catalog;
pub mod host_locale;
pub mod locale_store;
pub mod translator;

pub use catalog::{Catalog, CatalogError, Entry};
pub use host_locale::{HostLocales, SystemLocales};
pub use locale_store::{HandlerId, LocaleStore};
pub use translator::{MissingTranslation, Translation, Translator};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Translate a key with named parameters.
/// Use this macro like: `tr_f!(translator, "profile.yearsOld", "age" => 31)`
#[macro_export]
macro_rules! tr_f {
    ($translator:expr, $key:expr, $($name:expr => $val:expr),+ $(,)?) => {{
        let owned: Vec<(&str, String)> = vec![$(($name, $val.to_string())),+];
        let params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        $translator.text_with($key, &params)
    }};
}

/// Languages the app ships translations and date conventions for.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Pt, Locale::Es];

    /// Consulted whenever the active locale lacks a key.
    pub const FALLBACK: Locale = Locale::En;

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
            Locale::Es => "es",
        }
    }

    /// Label shown in the language picker, always in the language itself.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Pt => "Português",
            Locale::Es => "Español",
        }
    }

    /// Resolve a host locale tag such as `pt-BR`, `es_ES.UTF-8` or `en` by its
    /// language subtag. Returns `None` for languages we don't ship.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let tag = tag.trim();
        let tag = tag.split(['.', '@']).next().unwrap_or_default();
        let language = tag.split(['-', '_']).next().unwrap_or_default();
        match language.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "pt" => Some(Locale::Pt),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_tags_resolve_by_language() {
        assert_eq!(Locale::from_tag("pt-BR"), Some(Locale::Pt));
        assert_eq!(Locale::from_tag("es_ES.UTF-8"), Some(Locale::Es));
        assert_eq!(Locale::from_tag("EN"), Some(Locale::En));
        assert_eq!(Locale::from_tag("en_US@euro"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr-FR"), None);
        assert_eq!(Locale::from_tag("C"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn parsing_rejects_unsupported_languages() {
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
        assert_eq!(
            "ja".parse::<Locale>(),
            Err(UnsupportedLocale("ja".to_string()))
        );
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Locale::Pt).unwrap();
        assert_eq!(json, "\"pt\"");
        let back: Locale = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(back, Locale::Es);
    }
}
