use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::Locale;

const EN_SOURCE: &str = include_str!("locales/en.toml");
const PT_SOURCE: &str = include_str!("locales/pt.toml");
const ES_SOURCE: &str = include_str!("locales/es.toml");

/// A resolved catalog value. Lists back enumerated options such as quiz answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Text(String),
    List(Vec<String>),
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to parse the {locale} catalog: {source}")]
    Parse {
        locale: Locale,
        source: toml::de::Error,
    },

    #[error("unsupported value at {key} in the {locale} catalog, expected a string or a list of strings")]
    UnsupportedValue { locale: Locale, key: String },
}

/// Per-locale dictionaries, flattened to dot-separated key paths.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    locales: HashMap<Locale, BTreeMap<String, Entry>>,
}

impl Catalog {
    /// The catalogs shipped with the app.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_sources(&[
            (Locale::En, EN_SOURCE),
            (Locale::Pt, PT_SOURCE),
            (Locale::Es, ES_SOURCE),
        ])
    }

    pub fn from_sources(sources: &[(Locale, &str)]) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        for (locale, source) in sources {
            let table: toml::Table = toml::from_str(source).map_err(|source| {
                CatalogError::Parse {
                    locale: *locale,
                    source,
                }
            })?;
            let entries = catalog.locales.entry(*locale).or_default();
            flatten(*locale, "", &table, entries)?;
            debug!(%locale, keys = entries.len(), "Loaded locale catalog");
        }
        Ok(catalog)
    }

    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&Entry> {
        self.locales.get(&locale).and_then(|entries| entries.get(key))
    }

    pub fn contains(&self, locale: Locale, key: &str) -> bool {
        self.lookup(locale, key).is_some()
    }

    pub fn locales(&self) -> impl Iterator<Item = Locale> + '_ {
        Locale::ALL
            .into_iter()
            .filter(|locale| self.locales.contains_key(locale))
    }

    pub fn keys(&self, locale: Locale) -> impl Iterator<Item = &str> {
        self.locales
            .get(&locale)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    /// Keys of the fallback locale that `locale` doesn't translate.
    pub fn missing_keys(&self, locale: Locale) -> Vec<&str> {
        self.keys(Locale::FALLBACK)
            .filter(|key| !self.contains(locale, key))
            .collect()
    }
}

fn flatten(
    locale: Locale,
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, Entry>,
) -> Result<(), CatalogError> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(key, Entry::Text(text.clone()));
            }
            toml::Value::Array(items) => {
                let list = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| CatalogError::UnsupportedValue {
                        locale,
                        key: key.clone(),
                    })?;
                out.insert(key, Entry::List(list));
            }
            toml::Value::Table(nested) => flatten(locale, &key, nested, out)?,
            _ => return Err(CatalogError::UnsupportedValue { locale, key }),
        }
    }
    Ok(())
}
