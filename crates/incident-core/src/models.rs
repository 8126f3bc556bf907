use crate::error::{ReportError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when displaying the [`Category::Unknown`] bucket.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// A normalised categorical value.
///
/// Raw cells are converted into this type exactly once, at load time.
/// Ordering places every known value (lexicographic) before `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A present, non-sentinel value.
    Known(String),
    /// The value was absent or one of the recognised missing-value sentinels.
    Unknown,
}

impl Category {
    /// Construct a known category.
    pub fn known(value: impl Into<String>) -> Self {
        Category::Known(value.into())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Category::Unknown)
    }

    /// The known value, or `None` for the unknown bucket.
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Category::Known(s) => Some(s.as_str()),
            Category::Unknown => None,
        }
    }

    /// Display label; the unknown bucket renders as [`UNKNOWN_LABEL`].
    pub fn label(&self) -> &str {
        self.as_known().unwrap_or(UNKNOWN_LABEL)
    }
}

impl From<Option<String>> for Category {
    fn from(value: Option<String>) -> Self {
        value.map(Category::Known).unwrap_or(Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single incident row after column selection and normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Source identifier of the incident (not unique across victims).
    pub incident_key: String,
    /// Calendar date of the incident, if it parsed.
    pub occurred_on: Option<NaiveDate>,
    /// Time of day of the incident, if it parsed.
    pub occurred_at: Option<NaiveTime>,
    /// Grouping key (borough by default).
    pub category: Category,
    /// Value of the predicate column (victim race by default).
    pub victim_group: Category,
    /// Whether `victim_group` equals the configured target value.
    pub matches_predicate: bool,
}

impl IncidentRecord {
    /// Minimal record carrying only the fields the aggregator reads.
    pub fn tagged(category: Category, matches_predicate: bool) -> Self {
        Self {
            incident_key: String::new(),
            occurred_on: None,
            occurred_at: None,
            category,
            victim_group: Category::Unknown,
            matches_predicate,
        }
    }
}

/// Per-category incident counts.
///
/// Invariant: `matched_count <= total_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total_count: u64,
    pub matched_count: u64,
}

impl CategorySummary {
    /// Share of matched incidents in `[0, 1]`; `0.0` for an empty group.
    pub fn matched_share(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.matched_count as f64 / self.total_count as f64
    }
}

/// Summary rows ordered by category, one per distinct category.
///
/// Deserialisation goes through [`SummaryTable::from_rows`], so a decoded
/// table upholds the same ordering as an aggregated one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategorySummary>", into = "Vec<CategorySummary>")]
pub struct SummaryTable {
    rows: Vec<CategorySummary>,
}

impl SummaryTable {
    /// Build a table from caller-supplied rows.
    ///
    /// Rows must be in strictly ascending category order (so no category
    /// repeats) and every row must have `matched_count <= total_count`.
    pub fn from_rows(rows: Vec<CategorySummary>) -> Result<Self> {
        if let Some(pair) = rows.windows(2).find(|w| w[0].category >= w[1].category) {
            return Err(ReportError::InvalidSummary(format!(
                "category {} is not ordered before {}",
                pair[0].category, pair[1].category
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.matched_count > r.total_count) {
            return Err(ReportError::InvalidSummary(format!(
                "category {} has {} matched of {} total",
                row.category, row.matched_count, row.total_count
            )));
        }
        Ok(Self { rows })
    }

    /// Wrap rows without checking them.
    ///
    /// The caller guarantees what [`SummaryTable::from_rows`] checks; lookups
    /// binary-search the rows and return wrong answers otherwise. Reserved
    /// for the aggregator, whose `BTreeMap` pass produces valid rows.
    #[doc(hidden)]
    pub fn from_rows_unchecked(rows: Vec<CategorySummary>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].category < w[1].category));
        debug_assert!(rows.iter().all(|r| r.matched_count <= r.total_count));
        Self { rows }
    }

    pub fn rows(&self) -> &[CategorySummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the row for `category`.
    pub fn get(&self, category: &Category) -> Option<&CategorySummary> {
        self.rows
            .binary_search_by(|r| r.category.cmp(category))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// `(x = total_count, y = matched_count)` pairs, one per category.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.total_count as f64, r.matched_count as f64))
            .collect()
    }

    /// Sum of `(total_count, matched_count)` across all rows.
    pub fn totals(&self) -> (u64, u64) {
        self.rows.iter().fold((0, 0), |(t, m), r| {
            (t + r.total_count, m + r.matched_count)
        })
    }

    /// Combine two tables category-wise. Categories present in only one side
    /// are carried over unchanged.
    pub fn merge(&self, other: &SummaryTable) -> SummaryTable {
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        let mut left = self.rows.iter().peekable();
        let mut right = other.rows.iter().peekable();

        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => match l.category.cmp(&r.category) {
                    std::cmp::Ordering::Less => left.next().cloned(),
                    std::cmp::Ordering::Greater => right.next().cloned(),
                    std::cmp::Ordering::Equal => {
                        let (l, r) = (left.next(), right.next());
                        l.zip(r).map(|(l, r)| CategorySummary {
                            category: l.category.clone(),
                            total_count: l.total_count + r.total_count,
                            matched_count: l.matched_count + r.matched_count,
                        })
                    }
                },
                (Some(_), None) => left.next().cloned(),
                (None, Some(_)) => right.next().cloned(),
                (None, None) => None,
            };
            match next {
                Some(row) => rows.push(row),
                None => break,
            }
        }

        SummaryTable { rows }
    }

    /// Regenerate one `(category, matched)` pair per counted incident.
    ///
    /// Matched incidents come first within each category. Aggregating the
    /// result reproduces this table.
    pub fn expand(&self) -> Vec<IncidentRecord> {
        self.rows
            .iter()
            .flat_map(|r| {
                let matched = (0..r.matched_count)
                    .map(move |_| IncidentRecord::tagged(r.category.clone(), true));
                let unmatched = (r.matched_count..r.total_count)
                    .map(move |_| IncidentRecord::tagged(r.category.clone(), false));
                matched.chain(unmatched)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SummaryTable {
    type Item = &'a CategorySummary;
    type IntoIter = std::slice::Iter<'a, CategorySummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl TryFrom<Vec<CategorySummary>> for SummaryTable {
    type Error = ReportError;

    fn try_from(rows: Vec<CategorySummary>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<SummaryTable> for Vec<CategorySummary> {
    fn from(table: SummaryTable) -> Self {
        table.rows
    }
}
