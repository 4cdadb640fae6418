use crate::i18n::HostLocales;

/// Host stand-in reporting a fixed preference list.
#[derive(Debug, Default, Clone)]
pub struct FixedHostLocales {
    locales: Vec<String>,
}

impl FixedHostLocales {
    pub fn new<T: Into<String>>(locales: impl IntoIterator<Item = T>) -> Self {
        Self {
            locales: locales.into_iter().map(Into::into).collect(),
        }
    }
}

impl HostLocales for FixedHostLocales {
    fn preferred_locales(&self) -> Vec<String> {
        self.locales.clone()
    }
}
