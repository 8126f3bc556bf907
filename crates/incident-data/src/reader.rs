//! CSV discovery and loading for incident exports.
//!
//! Selects the configured columns, normalises missing values and parses
//! dates, yielding [`IncidentRecord`]s for the aggregator.

use std::io::Read;
use std::path::{Path, PathBuf};

use incident_core::error::{ReportError, Result};
use incident_core::models::IncidentRecord;
use incident_core::normalize::{DateTimeParser, MatchPredicate, MissingValues};
use tracing::{debug, warn};

// ── Column selection ──────────────────────────────────────────────────────────

/// Header names of the columns the report reads. Matching is
/// case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Grouping column (required).
    pub category: String,
    /// Column the predicate is evaluated on (required).
    pub predicate: String,
    pub incident_key: String,
    pub occur_date: String,
    pub occur_time: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            category: "BORO".to_string(),
            predicate: "VIC_RACE".to_string(),
            incident_key: "INCIDENT_KEY".to_string(),
            occur_date: "OCCUR_DATE".to_string(),
            occur_time: "OCCUR_TIME".to_string(),
        }
    }
}

/// Everything the loader needs to turn rows into records.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub columns: ColumnSpec,
    pub predicate: MatchPredicate,
}

impl LoadOptions {
    pub fn new(columns: ColumnSpec, predicate_value: &str) -> Self {
        Self {
            columns,
            predicate: MatchPredicate::equals(predicate_value),
        }
    }
}

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_read: usize,
    pub rows_read: usize,
    /// Rows the CSV parser rejected outright. Short rows and cells that
    /// are not valid UTF-8 are kept and read as missing values.
    pub rows_skipped: usize,
}

/// Resolved header positions for one file.
#[derive(Debug)]
struct ColumnIndex {
    category: usize,
    predicate: usize,
    incident_key: Option<usize>,
    occur_date: Option<usize>,
    occur_time: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::ByteRecord, spec: &ColumnSpec) -> Result<Self> {
        let find = |name: &str| {
            let wanted = name.trim();
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim().eq_ignore_ascii_case(wanted))
        };
        let require = |name: &str| find(name).ok_or_else(|| ReportError::MissingColumn(name.to_string()));

        let index = Self {
            category: require(&spec.category)?,
            predicate: require(&spec.predicate)?,
            incident_key: find(&spec.incident_key),
            occur_date: find(&spec.occur_date),
            occur_time: find(&spec.occur_time),
        };

        if index.occur_date.is_none() {
            warn!("Column {} not found; histogram will be empty", spec.occur_date);
        }
        Ok(index)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// List the CSV files at `path`.
///
/// A file path is returned as-is; a directory is walked recursively for
/// `.csv` files, sorted by path.
pub fn find_csv_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    if !path.exists() {
        warn!("Data path does not exist: {}", path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every CSV file under `path` into records.
pub fn load_incidents(path: &Path, options: &LoadOptions) -> Result<(Vec<IncidentRecord>, LoadStats)> {
    let files = find_csv_files(path);
    if files.is_empty() {
        return Err(ReportError::NoDataFiles(path.to_path_buf()));
    }

    let mut stats = LoadStats::default();
    let mut records = Vec::new();

    for file_path in &files {
        let file = std::fs::File::open(file_path).map_err(|source| ReportError::FileRead {
            path: file_path.clone(),
            source,
        })?;
        let before = records.len();
        read_incidents(file, options, &mut records, &mut stats)?;
        stats.files_read += 1;

        debug!(
            "File {}: {} records",
            file_path.display(),
            records.len() - before
        );
    }

    debug!(
        "Loaded {} records from {} files ({} rows skipped)",
        records.len(),
        stats.files_read,
        stats.rows_skipped
    );

    Ok((records, stats))
}

/// Parse CSV from any reader, appending records to `out`.
///
/// Rows may be shorter or longer than the header. Absent cells and cells
/// that are not valid UTF-8 read as missing values.
pub fn read_incidents<R: Read>(
    input: R,
    options: &LoadOptions,
    out: &mut Vec<IncidentRecord>,
    stats: &mut LoadStats,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.byte_headers()?.clone();
    let index = ColumnIndex::resolve(&headers, &options.columns)?;

    for (row_no, result) in reader.byte_records().enumerate() {
        stats.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping CSV row {}: {}", row_no + 1, e);
                stats.rows_skipped += 1;
                continue;
            }
        };
        out.push(map_to_record(&row, &index, &options.predicate));
    }

    Ok(())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn map_to_record(row: &csv::ByteRecord, index: &ColumnIndex, predicate: &MatchPredicate) -> IncidentRecord {
    let cell = |i: Option<usize>| {
        i.and_then(|i| row.get(i))
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    };

    let category = MissingValues::category(cell(Some(index.category)));
    let victim_group = MissingValues::category(cell(Some(index.predicate)));
    let matches_predicate = predicate.matches(&victim_group);

    IncidentRecord {
        incident_key: cell(index.incident_key).trim().to_string(),
        occurred_on: DateTimeParser::parse_date(cell(index.occur_date)),
        occurred_at: DateTimeParser::parse_time(cell(index.occur_time)),
        category,
        victim_group,
        matches_predicate,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use chrono::NaiveDate;
    use incident_core::models::Category;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "INCIDENT_KEY,OCCUR_DATE,OCCUR_TIME,BORO,PRECINCT,VIC_AGE_GROUP,VIC_RACE,Latitude";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).expect("create");
        for line in lines {
            writeln!(file, "{}", line).expect("write");
        }
        path
    }

    fn read_str(data: &str, options: &LoadOptions) -> Result<(Vec<IncidentRecord>, LoadStats)> {
        let mut out = Vec::new();
        let mut stats = LoadStats::default();
        read_incidents(data.as_bytes(), options, &mut out, &mut stats)?;
        Ok((out, stats))
    }

    fn default_options() -> LoadOptions {
        LoadOptions::new(ColumnSpec::default(), "BLACK")
    }

    #[test]
    fn test_read_selects_and_normalises_columns() {
        let data = format!(
            "{HEADER}\n\
             24050482,08/27/2006,05:35:00,BRONX,52,18-24,BLACK,40.85\n\
             77673979,03/11/2011,12:03:00,Queens,106,25-44,WHITE HISPANIC,40.67\n"
        );
        let (records, stats) = read_str(&data, &default_options()).expect("read");

        assert_eq!(stats.rows_read, 2);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.incident_key, "24050482");
        assert_eq!(first.occurred_on, NaiveDate::from_ymd_opt(2006, 8, 27));
        assert_eq!(first.category, Category::known("BRONX"));
        assert_eq!(first.victim_group, Category::known("BLACK"));
        assert!(first.matches_predicate);

        let second = &records[1];
        assert_eq!(second.category, Category::known("QUEENS"));
        assert!(!second.matches_predicate);
    }

    #[test]
    fn test_read_maps_sentinels_to_unknown() {
        let data = format!(
            "{HEADER}\n\
             1,01/01/2020,00:00:00,(null),1,UNKNOWN,UNKNOWN,0\n\
             2,,,,1,18-24,,0\n"
        );
        let (records, _) = read_str(&data, &default_options()).expect("read");

        for r in &records {
            assert_eq!(r.category, Category::Unknown);
            assert_eq!(r.victim_group, Category::Unknown);
            assert!(!r.matches_predicate);
        }
        assert!(records[1].occurred_on.is_none());
        assert!(records[1].occurred_at.is_none());
    }

    #[test]
    fn test_read_header_match_is_case_insensitive() {
        let data = "incident_key, boro ,vic_race\n9,BROOKLYN,BLACK\n";
        let (records, _) = read_str(data, &default_options()).expect("read");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, Category::known("BROOKLYN"));
        assert!(records[0].occurred_on.is_none());
    }

    #[test]
    fn test_read_missing_required_column() {
        let data = "INCIDENT_KEY,VIC_RACE\n1,BLACK\n";
        let err = read_str(data, &default_options()).expect_err("BORO is missing");
        assert!(matches!(err, ReportError::MissingColumn(ref c) if c == "BORO"));
    }

    #[test]
    fn test_read_keeps_short_and_long_rows() {
        let data = "BORO,VIC_RACE\nBRONX,BLACK\nBRONX\nQUEENS,WHITE,EXTRA\n\"\"\n";
        let (records, stats) = read_str(data, &default_options()).expect("read");

        assert_eq!(records.len(), 4);
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_skipped, 0);

        assert_eq!(records[1].category, Category::known("BRONX"));
        assert_eq!(records[1].victim_group, Category::Unknown);
        assert!(!records[1].matches_predicate);
        assert_eq!(records[2].victim_group, Category::known("WHITE"));
        assert_eq!(records[3].category, Category::Unknown);

        let table = aggregate(&records);
        let bronx = table.get(&Category::known("BRONX")).expect("bronx row");
        assert_eq!((bronx.total_count, bronx.matched_count), (2, 1));
        assert_eq!(table.get(&Category::Unknown).map(|r| r.total_count), Some(1));
    }

    #[test]
    fn test_read_invalid_utf8_cells_become_unknown() {
        let data: &[u8] = b"BORO,VIC_RACE,OCCUR_DATE\nBRONX,BLACK,01/02/2020\nBR\xffNX,BLACK,01/02/2020\nQUEENS,WH\xfeTE,\xff1/02/2020\n";
        let mut records = Vec::new();
        let mut stats = LoadStats::default();
        read_incidents(data, &default_options(), &mut records, &mut stats).expect("read");

        assert_eq!(records.len(), 3);
        assert_eq!(stats.rows_skipped, 0);

        assert_eq!(records[1].category, Category::Unknown);
        assert!(records[1].matches_predicate);
        assert_eq!(records[2].category, Category::known("QUEENS"));
        assert_eq!(records[2].victim_group, Category::Unknown);
        assert!(records[2].occurred_on.is_none());

        let table = aggregate(&records);
        let unknown = table.get(&Category::Unknown).expect("unknown row");
        assert_eq!((unknown.total_count, unknown.matched_count), (1, 1));
        assert_eq!(table.totals().0, 3);
    }

    #[test]
    fn test_read_custom_columns() {
        let options = LoadOptions::new(
            ColumnSpec {
                category: "PRECINCT".to_string(),
                predicate: "VIC_AGE_GROUP".to_string(),
                ..ColumnSpec::default()
            },
            "18-24",
        );
        let data = format!("{HEADER}\n1,08/27/2006,05:35:00,BRONX,52,18-24,BLACK,40.85\n");
        let (records, _) = read_str(&data, &options).expect("read");

        assert_eq!(records[0].category, Category::known("52"));
        assert!(records[0].matches_predicate);
    }

    #[test]
    fn test_find_csv_files_single_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_csv(tmp.path(), "data.csv", &["BORO,VIC_RACE"]);
        assert_eq!(find_csv_files(&path), vec![path]);
    }

    #[test]
    fn test_find_csv_files_directory_sorted_and_filtered() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join("nested")).expect("mkdir");
        let b = write_csv(tmp.path(), "b.csv", &["BORO,VIC_RACE"]);
        let a = write_csv(&tmp.path().join("nested"), "a.CSV", &["BORO,VIC_RACE"]);
        write_csv(tmp.path(), "notes.txt", &["ignore me"]);

        let files = find_csv_files(tmp.path());
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn test_find_csv_files_missing_path() {
        assert!(find_csv_files(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn test_load_incidents_across_files() {
        let tmp = TempDir::new().expect("tempdir");
        write_csv(tmp.path(), "2006.csv", &["BORO,VIC_RACE", "BRONX,BLACK", "QUEENS,WHITE"]);
        write_csv(tmp.path(), "2007.csv", &["BORO,VIC_RACE", "BRONX,ASIAN / PACIFIC ISLANDER"]);

        let (records, stats) = load_incidents(tmp.path(), &default_options()).expect("load");

        assert_eq!(records.len(), 3);
        assert_eq!(stats.files_read, 2);
        assert_eq!(records.iter().filter(|r| r.matches_predicate).count(), 1);
    }

    #[test]
    fn test_load_incidents_empty_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_incidents(tmp.path(), &default_options()).expect_err("no files");
        assert!(matches!(err, ReportError::NoDataFiles(_)));
    }
}
