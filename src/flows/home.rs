use chrono::{Local, Timelike};

use crate::i18n::Translator;

/// Catalog key of the greeting for an hour of the day (0..=23).
pub fn greeting_key(hour: u32) -> &'static str {
    match hour {
        0..12 => "screens.home.morning",
        12..18 => "screens.home.afternoon",
        _ => "screens.home.evening",
    }
}

pub fn greeting(translator: &Translator, hour: u32) -> String {
    translator.text(greeting_key(hour))
}

/// Greeting for the local time, followed by the first name when known.
pub fn greeting_now(translator: &Translator, first_name: Option<&str>) -> String {
    let greeting = greeting(translator, Local::now().hour());
    match first_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{greeting}, {name}"),
        None => greeting,
    }
}
