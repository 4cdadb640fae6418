use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::{DateFormatProfile, resolve_format};
use crate::i18n::Locale;

/// Oldest birth date accepted, in years before today.
pub const MAX_AGE_YEARS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Future,
    TooOld,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("date does not match the expected format")]
    Malformed,

    #[error("date does not exist in the calendar")]
    Invalid,

    #[error("date is out of range ({0:?})")]
    OutOfRange(Bound),
}

impl ValidationError {
    /// Catalog key of the message shown under the date field.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::Malformed | ValidationError::Invalid => "validations.invalidDate",
            ValidationError::OutOfRange(Bound::Future) => "validations.dateInFuture",
            ValidationError::OutOfRange(Bound::TooOld) => "validations.dateTooOld",
        }
    }
}

/// A validated calendar date in its storage form, `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Completed years between this date and `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_on(self.0, today)
    }
}

impl From<CanonicalDate> for NaiveDate {
    fn from(value: CanonicalDate) -> Self {
        value.0
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for CanonicalDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let well_formed = matches!(
            parts.as_slice(),
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2
        ) && s.bytes().all(|b| b.is_ascii_digit() || b == b'-');
        if !well_formed {
            return Err(ValidationError::Malformed);
        }
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(CanonicalDate)
            .map_err(|_| ValidationError::Invalid)
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| serde::de::Error::custom(format_args!("invalid date {s:?}: {e}")))
    }
}

/// Validates user-typed dates against the locale's pattern and an accepted
/// age window ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValidator {
    max_age_years: u32,
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new(MAX_AGE_YEARS)
    }
}

impl DateValidator {
    pub fn new(max_age_years: u32) -> Self {
        Self { max_age_years }
    }

    pub fn max_age_years(&self) -> u32 {
        self.max_age_years
    }

    /// Validate against the local calendar day.
    pub fn validate(&self, raw: &str, locale: Locale) -> Result<CanonicalDate, ValidationError> {
        self.validate_on(raw, locale, Local::now().date_naive())
    }

    pub fn validate_on(
        &self,
        raw: &str,
        locale: Locale,
        today: NaiveDate,
    ) -> Result<CanonicalDate, ValidationError> {
        let format = resolve_format(locale);
        let date = format.strict_parse(raw).inspect_err(|e| {
            debug!(%locale, raw, error = %e, "Rejected date input");
        })?;

        if date > today {
            debug!(%locale, %date, "Rejected future date");
            return Err(ValidationError::OutOfRange(Bound::Future));
        }
        if date <= self.earliest(today) {
            debug!(%locale, %date, max_age = self.max_age_years, "Rejected date before age window");
            return Err(ValidationError::OutOfRange(Bound::TooOld));
        }
        Ok(CanonicalDate(date))
    }

    /// Same month and day, `max_age_years` earlier; Feb 29 maps to Feb 28.
    /// This day and anything before it is too old.
    pub fn earliest(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.max_age_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn validate(raw: &str, locale: Locale) -> Result<CanonicalDate, ValidationError> {
    DateValidator::default().validate(raw, locale)
}

pub fn validate_on(
    raw: &str,
    locale: Locale,
    today: NaiveDate,
) -> Result<CanonicalDate, ValidationError> {
    DateValidator::default().validate_on(raw, locale, today)
}

/// Whole years from `birth` to `today`, for "N years old" labels.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2026, 10, 18);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    fn formatted(d: NaiveDate, locale: Locale) -> String {
        resolve_format(locale).format(d)
    }

    #[test]
    fn impossible_days_are_invalid() {
        assert_eq!(
            validate_on("31/02/2020", Locale::Pt, today()),
            Err(ValidationError::Invalid)
        );
        assert!(validate_on("13/13/2020", Locale::Pt, today()).is_err());
        assert_eq!(
            validate_on("02/31/2020", Locale::En, today()),
            Err(ValidationError::Invalid)
        );
    }

    #[test]
    fn pattern_follows_locale() {
        // 13/05 only makes sense day-first
        assert_eq!(
            validate_on("13/05/1990", Locale::Es, today()).map(|d| d.to_string()),
            Ok("1990-05-13".to_string())
        );
        assert_eq!(
            validate_on("13/05/1990", Locale::En, today()),
            Err(ValidationError::Invalid)
        );
        assert_eq!(
            validate_on("05/13/1990", Locale::En, today()).map(|d| d.to_string()),
            Ok("1990-05-13".to_string())
        );
    }

    #[test]
    fn malformed_input_is_rejected_before_the_calendar() {
        assert_eq!(
            validate_on("1990-05-13", Locale::Pt, today()),
            Err(ValidationError::Malformed)
        );
        assert_eq!(
            validate_on("", Locale::En, today()),
            Err(ValidationError::Malformed)
        );
    }

    #[test]
    fn future_dates_are_out_of_range() {
        for locale in Locale::ALL {
            let tomorrow = today() + Duration::days(1);
            assert_eq!(
                validate_on(&formatted(tomorrow, locale), locale, today()),
                Err(ValidationError::OutOfRange(Bound::Future))
            );
            assert_eq!(
                validate_on(&formatted(today(), locale), locale, today()).map(|d| d.date()),
                Ok(today())
            );
        }
    }

    #[test]
    fn age_window_is_120_years() {
        let boundary = date(TODAY.0 - 120, TODAY.1, TODAY.2);
        for locale in Locale::ALL {
            let too_old = boundary - Duration::days(1);
            assert_eq!(
                validate_on(&formatted(too_old, locale), locale, today()),
                Err(ValidationError::OutOfRange(Bound::TooOld))
            );
            let just_inside = boundary + Duration::days(1);
            assert_eq!(
                validate_on(&formatted(just_inside, locale), locale, today()).map(|d| d.date()),
                Ok(just_inside)
            );
            // the boundary day itself is more than 120 years before now
            assert_eq!(
                validate_on(&formatted(boundary, locale), locale, today()),
                Err(ValidationError::OutOfRange(Bound::TooOld))
            );
        }
    }

    #[test]
    fn leap_day_today_clamps_the_window() {
        let validator = DateValidator::default();
        assert_eq!(validator.earliest(date(2024, 2, 29)), date(1904, 2, 29));
        assert_eq!(validator.earliest(date(2028, 2, 29)), date(1908, 2, 29));
        assert_eq!(
            DateValidator::new(1).earliest(date(2024, 2, 29)),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn formatting_then_validating_round_trips() {
        let earliest = DateValidator::default().earliest(today());
        for locale in Locale::ALL {
            let mut d = earliest + Duration::days(1);
            while d <= today() {
                let canonical = validate_on(&formatted(d, locale), locale, today())
                    .unwrap_or_else(|e| panic!("{d} in {locale}: {e}"));
                assert_eq!(canonical.date(), d);
                d += Duration::days(97);
            }
        }
    }

    #[test]
    fn canonical_form_is_iso() {
        let canonical = validate_on("5/3/2001", Locale::Pt, today()).unwrap();
        assert_eq!(canonical.to_string(), "2001-03-05");
        assert_eq!("2001-03-05".parse::<CanonicalDate>(), Ok(canonical));
        assert_eq!(
            "2001-3-5".parse::<CanonicalDate>(),
            Err(ValidationError::Malformed)
        );
        assert_eq!(
            "2001-02-30".parse::<CanonicalDate>(),
            Err(ValidationError::Invalid)
        );
        assert_eq!(serde_json::to_string(&canonical).unwrap(), "\"2001-03-05\"");
        let back: CanonicalDate = serde_json::from_str("\"2001-03-05\"").unwrap();
        assert_eq!(back, canonical);
    }

    #[test]
    fn configured_window_is_honored() {
        let validator = DateValidator::new(18);
        assert_eq!(
            validator.validate_on("01/01/2000", Locale::Pt, today()),
            Err(ValidationError::OutOfRange(Bound::TooOld))
        );
        assert!(validator.validate_on("01/01/2010", Locale::Pt, today()).is_ok());
    }

    #[test]
    fn message_keys_map_errors_to_the_catalog() {
        assert_eq!(ValidationError::Malformed.message_key(), "validations.invalidDate");
        assert_eq!(ValidationError::Invalid.message_key(), "validations.invalidDate");
        assert_eq!(
            ValidationError::OutOfRange(Bound::TooOld).message_key(),
            "validations.dateTooOld"
        );
    }

    #[test]
    fn ages_count_completed_years() {
        assert_eq!(age_on(date(1990, 10, 18), today()), 36);
        assert_eq!(age_on(date(1990, 10, 19), today()), 35);
        assert_eq!(age_on(date(2030, 1, 1), today()), 0);
        let canonical: CanonicalDate = "1990-10-19".parse().unwrap();
        assert_eq!(canonical.age_on(today()), 35);
    }
}
