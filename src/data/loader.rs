use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use super::model::{CellValue, PriceRecord, PriceTable};

// ---------------------------------------------------------------------------
// Errors and options
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV has no header row")]
    MissingHeader,
    #[error("line {line}: cannot parse date '{value}'")]
    InvalidDate { line: u64, value: String },
}

/// What to do with a row whose date cell cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Abort the whole load.
    #[default]
    Strict,
    /// Drop the row and keep going.
    SkipRow,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub date_policy: DatePolicy,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and normalize a price series from a CSV file.
///
/// A missing file yields [`LoadError::NotFound`] so callers can tell it apart
/// from a file that exists but holds no rows.
pub fn load_price_table(path: &Path, options: LoadOptions) -> Result<PriceTable, LoadError> {
    if !path.exists() {
        log::warn!("Price file {} not found", path.display());
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_price_csv(file, options)?;
    log::info!(
        "Loaded {} rows from {} with columns {:?}",
        table.len(),
        path.display(),
        table.column_names()
    );
    Ok(table)
}

/// Parse CSV text into a [`PriceTable`].
///
/// Column detection trims headers and compares case-insensitively. When no
/// `date` header exists the first column is used as the date source. Without
/// a `price` header every record's price is `None`.
pub fn parse_price_csv<R: Read>(reader: R, options: LoadOptions) -> Result<PriceTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let layout = ColumnLayout::detect(&headers);
    let extra_columns: Vec<String> = layout
        .extra
        .iter()
        .map(|&i| headers[i].clone())
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;
        let raw_date = record.get(layout.date).unwrap_or("");

        let Some(date) = parse_day_first(raw_date) else {
            match options.date_policy {
                DatePolicy::Strict => {
                    return Err(LoadError::InvalidDate {
                        line: record.position().map(|p| p.line()).unwrap_or(0),
                        value: raw_date.to_string(),
                    });
                }
                DatePolicy::SkipRow => {
                    skipped += 1;
                    continue;
                }
            }
        };

        let price = layout
            .price
            .and_then(|i| record.get(i))
            .and_then(coerce_price);

        let extra = layout
            .extra
            .iter()
            .map(|&i| CellValue::guess(record.get(i).unwrap_or("")))
            .collect();

        records.push(PriceRecord { date, price, extra });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} rows with unparseable dates");
    }

    Ok(PriceTable::new(
        records,
        extra_columns,
        layout.price.is_some(),
    ))
}

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

/// Source column indices for the canonical fields and the passthrough columns.
#[derive(Debug, PartialEq)]
struct ColumnLayout {
    date: usize,
    price: Option<usize>,
    extra: Vec<usize>,
}

impl ColumnLayout {
    fn detect(headers: &[String]) -> Self {
        let is = |h: &str, name: &str| h.trim().eq_ignore_ascii_case(name);

        let date = headers.iter().position(|h| is(h, "date")).unwrap_or(0);
        let price = headers.iter().position(|h| is(h, "price"));

        // Any other column that normalizes to a canonical name would collide.
        let extra = (0..headers.len())
            .filter(|&i| i != date && Some(i) != price)
            .filter(|&i| !is(&headers[i], "date") && !is(&headers[i], "price"))
            .collect();

        Self { date, price, extra }
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a numeric price cell. Blank, non-numeric and NaN cells are missing.
pub fn coerce_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d-%B-%Y",
    "%d %B, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %y",
    "%d-%B-%y",
];

/// Parse a date cell with day-before-month precedence.
///
/// `03/04/2024` is 3 April. A leading four-digit year is read as ISO order.
/// If the day-first reading gives an impossible month (`04/13/2024`) the
/// month-first reading is used instead. A trailing time of day is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = strip_time(raw.trim());
    if s.is_empty() {
        return None;
    }
    if let Some(date) = parse_numeric_date(s) {
        return Some(date);
    }
    NAMED_MONTH_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| d.year() >= 100)
}

fn strip_time(s: &str) -> &str {
    if let Some((head, _)) = s.split_once('T') {
        if head.ends_with(|c: char| c.is_ascii_digit()) {
            return head;
        }
    }
    match s.rsplit_once(' ') {
        Some((head, tail)) if tail.contains(':') => head.trim_end(),
        _ => s,
    }
}

fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let sep = s.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }

    let year = match parts[2].len() {
        4 => nums[2] as i32,
        // POSIX pivot, same as chrono's %y.
        2 if nums[2] < 69 => 2000 + nums[2] as i32,
        2 => 1900 + nums[2] as i32,
        _ => return None,
    };
    let (day, month) = (nums[0], nums[1]);
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        if month > 12 {
            NaiveDate::from_ymd_opt(year, day, month)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn parse(text: &str) -> Result<PriceTable, LoadError> {
        parse_price_csv(text.as_bytes(), LoadOptions::default())
    }

    #[test]
    fn day_first_formats() {
        assert_eq!(parse_day_first("03/04/2024"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("3-4-2024"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("03.04.24"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("2024-04-03"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("2024-04-03T00:00:00"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("03/04/2024 00:00"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("3 Apr 2024"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("03-April-2024"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("April 3, 2024"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("03-Apr-24"), Some(d(2024, 4, 3)));
        assert_eq!(parse_day_first("04/13/2024"), Some(d(2024, 4, 13)));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("yesterday"), None);
        assert_eq!(parse_day_first("31/02/2024"), None);
        assert_eq!(parse_day_first("13/13/2024"), None);
    }

    #[test]
    fn output_is_sorted_by_date() {
        let table = parse("Date,Price\n05/01/2024,3\n01/01/2024,1\n03/01/2024,2\n").unwrap();
        let dates: Vec<_> = table.records.iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(dates[0], d(2024, 1, 1));
        let prices: Vec<_> = table.records.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn headers_match_case_insensitively_after_trim() {
        let table = parse(" Date , PRICE ,Venue\n01/02/2024,100.5,LME\n").unwrap();
        assert!(table.has_price);
        assert_eq!(table.column_names(), vec!["date", "price", "Venue"]);
        assert_eq!(table.records[0].date, d(2024, 2, 1));
        assert_eq!(table.records[0].price, Some(100.5));
        assert_eq!(table.records[0].extra, vec![CellValue::String("LME".into())]);
    }

    #[test]
    fn falls_back_to_first_column_for_dates() {
        let table = parse("Timestamp,price,volume\n10/06/2023,8000,12\n").unwrap();
        assert_eq!(table.records[0].date, d(2023, 6, 10));
        assert_eq!(table.extra_columns, vec!["volume"]);
        assert_eq!(table.records[0].extra, vec![CellValue::Integer(12)]);
    }

    #[test]
    fn missing_price_column_leaves_prices_missing() {
        let table = parse("date,close\n01/01/2024,5\n").unwrap();
        assert!(!table.has_price);
        assert_eq!(table.records[0].price, None);
        assert_eq!(table.column_names(), vec!["date", "close"]);
    }

    #[test]
    fn non_numeric_price_becomes_missing() {
        let mut text = String::from("date,price\n");
        for day in 1..=10 {
            let price = if day == 4 { "N/A".to_string() } else { format!("{}", 100 + day) };
            text.push_str(&format!("{day:02}/01/2024,{price}\n"));
        }
        let table = parse(&text).unwrap();
        assert_eq!(table.len(), 10);
        let missing = table.records.iter().filter(|r| r.price.is_none()).count();
        assert_eq!(missing, 1);
        assert_eq!(table.records[3].price, None);
    }

    #[test]
    fn unparseable_date_aborts_in_strict_mode() {
        let err = parse("date,price\n01/01/2024,1\nnot-a-date,2\n").unwrap_err();
        match err {
            LoadError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skip_row_policy_drops_bad_dates() {
        let options = LoadOptions {
            date_policy: DatePolicy::SkipRow,
        };
        let table =
            parse_price_csv("date,price\n01/01/2024,1\n,2\nbad,3\n".as_bytes(), options).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let table = parse("date,price\n").unwrap();
        assert!(table.is_empty());
        assert!(table.has_price);
    }

    #[test]
    fn empty_file_has_no_header() {
        assert!(matches!(parse(""), Err(LoadError::MissingHeader)));
    }

    #[test]
    fn nonexistent_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LME_Missing.csv");
        let err = load_price_table(&path, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(p) if p == path));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Price").unwrap();
        writeln!(file, "02/01/2024,8500.25").unwrap();
        writeln!(file, "01/01/2024,8400").unwrap();
        let table = load_price_table(file.path(), LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].price, Some(8400.0));
    }
}
