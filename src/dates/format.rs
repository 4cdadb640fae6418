use chrono::{Datelike, NaiveDate};

use super::ValidationError;
use crate::i18n::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Day,
    Month,
    Year,
}

impl DateField {
    fn digits(&self) -> std::ops::RangeInclusive<usize> {
        match self {
            DateField::Day | DateField::Month => 1..=2,
            DateField::Year => 4..=4,
        }
    }
}

/// Numeric display pattern: the field order and the separator between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    pub order: [DateField; 3],
    pub separator: char,
}

impl DatePattern {
    pub const MONTH_FIRST: DatePattern = DatePattern {
        order: [DateField::Month, DateField::Day, DateField::Year],
        separator: '/',
    };
    pub const DAY_FIRST: DatePattern = DatePattern {
        order: [DateField::Day, DateField::Month, DateField::Year],
        separator: '/',
    };

    /// Placeholder hint such as `MM/DD/YYYY`.
    pub fn display(&self) -> String {
        self.render(|field| match field {
            DateField::Day => "DD".into(),
            DateField::Month => "MM".into(),
            DateField::Year => "YYYY".into(),
        })
    }

    /// Input mask for masked text fields, `9` standing for a digit.
    pub fn mask(&self) -> String {
        self.render(|field| match field {
            DateField::Year => "9999".into(),
            _ => "99".into(),
        })
    }

    pub fn format(&self, date: NaiveDate) -> String {
        self.render(|field| match field {
            DateField::Day => format!("{:02}", date.day()),
            DateField::Month => format!("{:02}", date.month()),
            DateField::Year => format!("{:04}", date.year()),
        })
    }

    fn render(&self, f: impl Fn(DateField) -> String) -> String {
        self.order
            .iter()
            .map(|field| f(*field))
            .collect::<Vec<_>>()
            .join(&self.separator.to_string())
    }

    /// Split `raw` into (day, month, year) without checking the calendar.
    fn split(&self, raw: &str) -> Result<(u32, u32, i32), ValidationError> {
        let segments: Vec<&str> = raw.trim().split(self.separator).collect();
        if segments.len() != self.order.len() {
            return Err(ValidationError::Malformed);
        }

        let (mut day, mut month, mut year) = (0, 0, 0);
        for (field, segment) in self.order.iter().zip(segments) {
            if !field.digits().contains(&segment.len())
                || !segment.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(ValidationError::Malformed);
            }
            let value: u32 = segment.parse().map_err(|_| ValidationError::Malformed)?;
            match field {
                DateField::Day => day = value,
                DateField::Month => month = value,
                DateField::Year => year = value as i32,
            }
        }
        Ok((day, month, year))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LongStyle {
    /// `March 5, 2025`
    MonthDayYear,
    /// `5 de março de 2025`
    DayDeMonthDeYear,
}

/// Locale conventions beyond the numeric pattern: the language tag and month
/// names used for long dates.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseProfile {
    pub tag: &'static str,
    pub month_names: [&'static str; 12],
    long_style: LongStyle,
}

static EN_US: ParseProfile = ParseProfile {
    tag: "en-US",
    month_names: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],
    long_style: LongStyle::MonthDayYear,
};

static PT_BR: ParseProfile = ParseProfile {
    tag: "pt-BR",
    month_names: [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ],
    long_style: LongStyle::DayDeMonthDeYear,
};

static ES_ES: ParseProfile = ParseProfile {
    tag: "es-ES",
    month_names: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    long_style: LongStyle::DayDeMonthDeYear,
};

impl ParseProfile {
    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.month_names.get(index).copied()
    }

    pub fn format_long(&self, date: NaiveDate) -> String {
        let month = self.month_name(date.month()).unwrap_or_default();
        match self.long_style {
            LongStyle::MonthDayYear => format!("{month} {}, {}", date.day(), date.year()),
            LongStyle::DayDeMonthDeYear => format!("{} de {month} de {}", date.day(), date.year()),
        }
    }
}

/// The two operations form validation needs from a calendar library.
pub trait DateFormatProfile {
    fn format(&self, date: NaiveDate) -> String;
    fn strict_parse(&self, raw: &str) -> Result<NaiveDate, ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub pattern: DatePattern,
    pub parse_profile: &'static ParseProfile,
}

impl DateFormat {
    pub fn format_long(&self, date: NaiveDate) -> String {
        self.parse_profile.format_long(date)
    }
}

impl DateFormatProfile for DateFormat {
    fn format(&self, date: NaiveDate) -> String {
        self.pattern.format(date)
    }

    /// Shape errors are `Malformed`; well-shaped text naming a day that
    /// doesn't exist (31/02, month 13) is `Invalid`.
    fn strict_parse(&self, raw: &str) -> Result<NaiveDate, ValidationError> {
        let (day, month, year) = self.pattern.split(raw)?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or(ValidationError::Invalid)
    }
}

pub fn resolve_format(locale: Locale) -> DateFormat {
    match locale {
        Locale::En => DateFormat {
            pattern: DatePattern::MONTH_FIRST,
            parse_profile: &EN_US,
        },
        Locale::Pt => DateFormat {
            pattern: DatePattern::DAY_FIRST,
            parse_profile: &PT_BR,
        },
        Locale::Es => DateFormat {
            pattern: DatePattern::DAY_FIRST,
            parse_profile: &ES_ES,
        },
    }
}
