// Safe expect: compiled patterns are static and known-valid.
#![allow(clippy::expect_used)]
//! Resolves temporal phrases into absolute year/month/day integers, anchored
//! to a caller-supplied current date.
//!
//! Resolution is partial by design: only the components a phrase actually
//! constrains are populated, and unparseable text yields an empty result
//! rather than an error (unknown fields are omitted, never guessed).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::QueryContext;

static PAST_YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^past\s+(\d{1,3})\s+years?$").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));
static ISO_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("valid regex"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)\.?,?\s+(\d{4})$").expect("valid regex"));
static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

/// Partially resolved date: only the components the phrase constrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateParts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    fn year_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: None,
        }
    }

    fn full(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }
}

/// Resolve one temporal phrase against the anchor date in `context`.
///
/// Relative phrases (`last year`, `this month`, `past 3 years`) resolve
/// against the anchor; absolute phrases (`March 2023`, `2023-06`,
/// `2024-07-15`, bare `2022`) parse to explicit integers. Anything else
/// resolves to an empty [`DateParts`].
#[must_use]
pub fn resolve_date_phrase(phrase: &str, context: &QueryContext) -> DateParts {
    let normalized = phrase.trim().trim_end_matches(['.', '!', '?']).to_lowercase();
    if normalized.is_empty() {
        return DateParts::default();
    }

    match normalized.as_str() {
        "last year" => return DateParts::year(context.year - 1),
        "this year" | "current year" => return DateParts::year(context.year),
        "this month" | "current month" => {
            return DateParts::year_month(context.year, context.month);
        }
        "last month" => {
            return if context.month == 1 {
                DateParts::year_month(context.year - 1, 12)
            } else {
                DateParts::year_month(context.year, context.month - 1)
            };
        }
        "today" => return DateParts::full(context.year, context.month, context.day),
        _ => {}
    }

    if let Some(caps) = PAST_YEARS.captures(&normalized) {
        if let Ok(span) = caps[1].parse::<i32>() {
            // Boundary year for a trailing window; the caller picks the
            // comparison operator.
            return DateParts::year(context.year - span);
        }
    }

    if let Some(caps) = ISO_DATE.captures(&normalized) {
        return parse_components(&caps[1], Some(&caps[2]), Some(&caps[3]));
    }
    if let Some(caps) = ISO_MONTH.captures(&normalized) {
        return parse_components(&caps[1], Some(&caps[2]), None);
    }
    if let Some(caps) = MONTH_YEAR.captures(&normalized) {
        if let Some(month) = month_number(&caps[1]) {
            if let Ok(year) = caps[2].parse::<i32>() {
                return DateParts::year_month(year, month);
            }
        }
        return DateParts::default();
    }
    if BARE_YEAR.is_match(&normalized) {
        if let Ok(year) = normalized.parse::<i32>() {
            return DateParts::year(year);
        }
    }

    DateParts::default()
}

fn parse_components(year: &str, month: Option<&str>, day: Option<&str>) -> DateParts {
    let Ok(year) = year.parse::<i32>() else {
        return DateParts::default();
    };
    let month = match month {
        Some(raw) => match raw.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => Some(m),
            _ => return DateParts::default(),
        },
        None => None,
    };
    let day = match day {
        Some(raw) => match raw.parse::<u32>() {
            Ok(d) if (1..=31).contains(&d) => Some(d),
            _ => return DateParts::default(),
        },
        None => None,
    };
    DateParts { year: Some(year), month, day }
}

/// Month name or three-letter abbreviation to its 1-based number.
fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    MONTHS
        .iter()
        .position(|month| *month == name || (name.len() == 3 && month.starts_with(name)))
        .and_then(|idx| u32::try_from(idx).ok())
        .map(|idx| idx + 1)
}
