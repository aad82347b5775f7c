use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single passthrough cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell from a column that is neither `date` nor `price`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Guess the type of a raw CSV cell.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if !f.is_nan() {
                return CellValue::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Numeric view used by the spreadsheet writer.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// PriceRecord – one row of a price series
// ---------------------------------------------------------------------------

/// One normalized row: canonical `date` and `price`, plus passthrough cells.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    /// `None` when the source cell was blank or not numeric.
    pub price: Option<f64>,
    /// Same length and order as [`PriceTable::extra_columns`].
    pub extra: Vec<CellValue>,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, price: Option<f64>) -> Self {
        Self {
            date,
            price,
            extra: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PriceTable – a loaded, date-sorted series
// ---------------------------------------------------------------------------

/// A normalized price series, sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    pub records: Vec<PriceRecord>,
    /// Passthrough column names in source order.
    pub extra_columns: Vec<String>,
    /// Whether the source file had a `price` column at all.
    pub has_price: bool,
}

impl PriceTable {
    /// Build a table from records, sorting them by date.
    pub fn new(mut records: Vec<PriceRecord>, extra_columns: Vec<String>, has_price: bool) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            records,
            extra_columns,
            has_price,
        }
    }

    /// An empty table sharing this table's column layout.
    pub fn empty_like(&self) -> Self {
        Self {
            records: Vec::new(),
            extra_columns: self.extra_columns.clone(),
            has_price: self.has_price,
        }
    }

    /// Canonical column names: `date`, `price` (if detected), then passthrough.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["date".to_string()];
        if self.has_price {
            names.push("price".to_string());
        }
        names.extend(self.extra_columns.iter().cloned());
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date, or `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        let last = self.records.last()?.date;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_sorts_by_date_stably() {
        let mut a = PriceRecord::new(d(2024, 1, 2), Some(1.0));
        a.extra.push(CellValue::String("first".into()));
        let mut b = PriceRecord::new(d(2024, 1, 2), Some(2.0));
        b.extra.push(CellValue::String("second".into()));
        let c = PriceRecord::new(d(2023, 12, 31), None);

        let table = PriceTable::new(vec![a, b, c], vec!["note".into()], true);
        let dates: Vec<_> = table.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2023, 12, 31), d(2024, 1, 2), d(2024, 1, 2)]);
        assert_eq!(table.records[1].price, Some(1.0));
        assert_eq!(table.date_bounds(), Some((d(2023, 12, 31), d(2024, 1, 2))));
    }

    #[test]
    fn column_names_omit_price_when_not_detected() {
        let table = PriceTable::new(Vec::new(), vec!["volume".into()], false);
        assert_eq!(table.column_names(), vec!["date", "volume"]);
        assert_eq!(table.date_bounds(), None);
    }

    #[test]
    fn guess_cell_types() {
        assert_eq!(CellValue::guess(" 42 "), CellValue::Integer(42));
        assert_eq!(CellValue::guess("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::guess("LME"), CellValue::String("LME".into()));
        assert_eq!(CellValue::guess("NaN"), CellValue::String("NaN".into()));
    }
}
