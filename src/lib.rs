pub mod backend;
pub mod config;
pub mod dates;
pub mod fakers;
pub mod flows;
pub mod i18n;
