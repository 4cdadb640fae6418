// Locale-aware date handling for form input: display patterns per locale and
// strict validation into the canonical `YYYY-MM-DD` storage form.

mod format;
mod validator;

pub use format::{
    DateField, DateFormat, DateFormatProfile, DatePattern, ParseProfile, resolve_format,
};
pub use validator::{
    Bound, CanonicalDate, DateValidator, MAX_AGE_YEARS, ValidationError, age_on, validate,
    validate_on,
};
