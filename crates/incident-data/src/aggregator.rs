//! Per-category aggregation of incident records.
//!
//! Produces the zero-filled summary table used as regression input, plus the
//! victim-group breakdown and yearly histogram used by the charts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use incident_core::models::{Category, CategorySummary, IncidentRecord, SummaryTable};

// ── Summary table ─────────────────────────────────────────────────────────────

/// Build the per-category `(total, matched)` table.
///
/// Every category present in `records` appears exactly once, sorted by key
/// with the unknown bucket last. Categories without a single match are kept
/// with `matched_count = 0`.
pub fn aggregate(records: &[IncidentRecord]) -> SummaryTable {
    IncidentAggregator::aggregate(records)
}

/// Stateless helper that groups incident records by category.
pub struct IncidentAggregator;

impl IncidentAggregator {
    /// See [`aggregate`].
    pub fn aggregate(records: &[IncidentRecord]) -> SummaryTable {
        // Pass 1: every observed category starts at (total, 0).
        let mut counts: BTreeMap<&Category, (u64, u64)> = BTreeMap::new();
        for record in records {
            counts.entry(&record.category).or_insert((0, 0)).0 += 1;
        }

        // Pass 2: overlay matched counts onto the existing keys.
        for record in records.iter().filter(|r| r.matches_predicate) {
            if let Some((_, matched)) = counts.get_mut(&record.category) {
                *matched += 1;
            }
        }

        let rows = counts
            .into_iter()
            .map(|(category, (total_count, matched_count))| CategorySummary {
                category: category.clone(),
                total_count,
                matched_count,
            })
            .collect();

        SummaryTable::from_rows_unchecked(rows)
    }

    /// Count incidents per `(category, victim group)`.
    ///
    /// Every category lists every victim group observed anywhere in the
    /// input, in the same order, zero-filled where absent.
    pub fn breakdown(records: &[IncidentRecord]) -> Vec<CategoryBreakdown> {
        let groups: BTreeSet<&Category> = records.iter().map(|r| &r.victim_group).collect();

        let mut grid: BTreeMap<&Category, BTreeMap<&Category, u64>> = BTreeMap::new();
        for record in records {
            let row = grid
                .entry(&record.category)
                .or_insert_with(|| groups.iter().map(|g| (*g, 0)).collect());
            if let Some(n) = row.get_mut(&record.victim_group) {
                *n += 1;
            }
        }

        grid.into_iter()
            .map(|(category, row)| CategoryBreakdown {
                category: category.clone(),
                groups: row.into_iter().map(|(g, n)| (g.clone(), n)).collect(),
            })
            .collect()
    }

    /// Count incidents per occurrence year.
    ///
    /// Bins are dense over the observed year range. Records without a date
    /// are counted in [`YearHistogram::undated`].
    pub fn histogram_by_year(records: &[IncidentRecord]) -> YearHistogram {
        let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
        let mut undated = 0u64;

        for record in records {
            match record.occurred_on {
                Some(date) => *by_year.entry(date.year()).or_default() += 1,
                None => undated += 1,
            }
        }

        let bins = match (by_year.keys().next(), by_year.keys().next_back()) {
            (Some(&first), Some(&last)) => (first..=last)
                .map(|year| (year, by_year.get(&year).copied().unwrap_or(0)))
                .collect(),
            _ => Vec::new(),
        };

        YearHistogram { bins, undated }
    }
}

// ── Chart inputs ──────────────────────────────────────────────────────────────

/// Victim-group counts within one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub category: Category,
    /// `(victim group, count)` in victim-group order.
    pub groups: Vec<(Category, u64)>,
}

impl CategoryBreakdown {
    pub fn total(&self) -> u64 {
        self.groups.iter().map(|(_, n)| n).sum()
    }
}

/// Incidents per calendar year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearHistogram {
    /// `(year, count)`, ascending, no gaps.
    pub bins: Vec<(i32, u64)>,
    /// Records whose date was missing or unparseable.
    pub undated: u64,
}

impl YearHistogram {
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
