/// Source of the user's preferred languages, most preferred first.
pub trait HostLocales {
    fn preferred_locales(&self) -> Vec<String>;
}

/// Reads the OS language preferences.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLocales;

impl HostLocales for SystemLocales {
    fn preferred_locales(&self) -> Vec<String> {
        sys_locale::get_locales().collect()
    }
}
