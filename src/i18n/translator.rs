use std::{rc::Rc, sync::LazyLock};

use regex::{Captures, Regex};
use tracing::debug;

use super::{Catalog, Entry, Locale, LocaleStore};

// `%{name}` and `{{name}}` are both accepted.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{(\w+)\}|\{\{(\w+)\}\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Text(String),
    List(Vec<String>),
}

impl Translation {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Translation::Text(text) => vec![text],
            Translation::List(list) => list,
        }
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Translation::Text(text) => write!(f, "{text}"),
            Translation::List(list) => write!(f, "{}", list.join(", ")),
        }
    }
}

/// The key exists in neither the requested locale nor the fallback locale.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("no translation for {key} in {locale} or {fallback}", fallback = Locale::FALLBACK)]
pub struct MissingTranslation {
    pub locale: Locale,
    pub key: String,
}

/// Resolves catalog keys for whatever locale the bound `LocaleStore` holds
/// at call time.
#[derive(Clone)]
pub struct Translator {
    catalog: Rc<Catalog>,
    locale_store: LocaleStore,
}

impl Translator {
    pub fn new(catalog: Rc<Catalog>, locale_store: LocaleStore) -> Self {
        Self {
            catalog,
            locale_store,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale_store.active()
    }

    pub fn locale_store(&self) -> &LocaleStore {
        &self.locale_store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> Translation {
        self.translate_in(self.locale(), key, params)
    }

    /// Active locale first, then the fallback locale, then the key itself.
    pub fn translate_in(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> Translation {
        self.resolve_in(locale, key, params).unwrap_or_else(|missing| {
            debug!(%locale, key, "Missing translation");
            Translation::Text(missing.key)
        })
    }

    /// Like `translate`, for callers that need to tell a missing key apart
    /// from a translation.
    pub fn resolve(
        &self,
        key: &str,
        params: &[(&str, &str)],
    ) -> Result<Translation, MissingTranslation> {
        self.resolve_in(self.locale(), key, params)
    }

    pub fn resolve_in(
        &self,
        locale: Locale,
        key: &str,
        params: &[(&str, &str)],
    ) -> Result<Translation, MissingTranslation> {
        let entry = self
            .catalog
            .lookup(locale, key)
            .or_else(|| self.catalog.lookup(Locale::FALLBACK, key));
        match entry {
            Some(Entry::Text(text)) => Ok(Translation::Text(interpolate(text, params))),
            Some(Entry::List(list)) => Ok(Translation::List(list.clone())),
            None => Err(MissingTranslation {
                locale,
                key: key.to_string(),
            }),
        }
    }

    pub fn text(&self, key: &str) -> String {
        self.text_with(key, &[])
    }

    pub fn text_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translate(key, params).to_string()
    }

    /// Missing keys give an empty list rather than the key.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.resolve(key, &[]) {
            Ok(translation) => translation.into_list(),
            Err(missing) => {
                debug!(locale = %missing.locale, key, "Missing translation list");
                vec![]
            }
        }
    }
}

/// Replace placeholders with their parameter. Unknown names stay verbatim and
/// substituted values are not scanned again.
pub fn interpolate(text: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
