use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::Category;

// ── Missing-value normalisation ───────────────────────────────────────────────

/// Cell contents treated as missing, matched case-insensitively after trimming.
const MISSING_PATTERN: &str = r"(?i)^\s*(|unknown|\(null\)|null|na|n/a|none)\s*$";

fn missing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MISSING_PATTERN).expect("regex is valid"))
}

/// Turns raw CSV cells into tagged values.
pub struct MissingValues;

impl MissingValues {
    /// `true` when `raw` is empty or one of the recognised sentinels.
    pub fn is_missing(raw: &str) -> bool {
        missing_regex().is_match(raw)
    }

    /// Trimmed value, or `None` for a missing cell.
    pub fn clean(raw: &str) -> Option<String> {
        if Self::is_missing(raw) {
            None
        } else {
            Some(raw.trim().to_string())
        }
    }

    /// Normalise a cell into a [`Category`]; sentinels become `Unknown`.
    ///
    /// Known values are upper-cased so that `Bronx` and `BRONX` group together.
    pub fn category(raw: &str) -> Category {
        Self::clean(raw)
            .map(|s| Category::Known(s.to_uppercase()))
            .unwrap_or(Category::Unknown)
    }
}

// ── Predicate ─────────────────────────────────────────────────────────────────

/// "value equals target" test evaluated on normalised categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPredicate {
    target: Category,
}

impl MatchPredicate {
    /// Build a predicate for `target`; the target is normalised the same way
    /// as the cells it will be compared to.
    pub fn equals(target: &str) -> Self {
        Self {
            target: MissingValues::category(target),
        }
    }

    /// An unknown value never matches, even when the target is itself a
    /// sentinel.
    pub fn matches(&self, value: &Category) -> bool {
        !value.is_unknown() && *value == self.target
    }

    pub fn target(&self) -> &Category {
        &self.target
    }
}

// ── Date / time parsing ───────────────────────────────────────────────────────

/// Parses the date and time cells found in incident exports.
pub struct DateTimeParser;

impl DateTimeParser {
    const DATE_FORMATS: &'static [&'static str] = &["%m/%d/%Y", "%Y-%m-%d", "%m/%d/%y"];
    const TIME_FORMATS: &'static [&'static str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

    /// Parse a date cell. A trailing time component (e.g. the
    /// `"01/27/2006 12:00:00 AM"` shape) is ignored.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let s = MissingValues::clean(raw)?;
        let date_part = s.split_whitespace().next()?;

        let parsed = Self::DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok());
        if parsed.is_none() {
            debug!("DateTimeParser: could not parse date \"{}\"", s);
        }
        parsed
    }

    /// Parse a time-of-day cell.
    pub fn parse_time(raw: &str) -> Option<NaiveTime> {
        let s = MissingValues::clean(raw)?;

        let parsed = Self::TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&s, fmt).ok());
        if parsed.is_none() {
            debug!("DateTimeParser: could not parse time \"{}\"", s);
        }
        parsed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
