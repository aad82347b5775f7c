use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};

use super::model::PriceTable;

// ---------------------------------------------------------------------------
// Filter predicate: date range, month, year
// ---------------------------------------------------------------------------

/// Active filters for one price series. `None` in any field means "All".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSpec {
    /// Inclusive `(start, end)` bounds.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.month.is_none() && self.year.is_none()
    }

    /// Whether a single date passes all active filters.
    ///
    /// Checked in a fixed order: date range, then month, then year.
    pub fn matches(&self, date: NaiveDate) -> bool {
        if let Some((start, end)) = self.date_range {
            if date < start || date > end {
                return false;
            }
        }
        if let Some(month) = self.month {
            if date.month() != month.number_from_month() {
                return false;
            }
        }
        if let Some(year) = self.year {
            if date.year() != year {
                return false;
            }
        }
        true
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(table: &PriceTable, spec: &FilterSpec) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r.date))
        .map(|(i, _)| i)
        .collect()
}

/// Build a new table holding only the records that pass `spec`.
///
/// The source table is left untouched; an empty result keeps its columns.
pub fn filter_table(table: &PriceTable, spec: &FilterSpec) -> PriceTable {
    if spec.is_empty() {
        return table.clone();
    }
    let mut out = table.empty_like();
    out.records = filtered_indices(table, spec)
        .into_iter()
        .map(|i| table.records[i].clone())
        .collect();
    out
}

// ---------------------------------------------------------------------------
// Selector values
// ---------------------------------------------------------------------------

pub const ALL: &str = "All";

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The twelve months in calendar order.
pub fn month_options() -> &'static [Month] {
    &MONTHS
}

/// Distinct years present in the table, most recent first.
pub fn year_options(table: &PriceTable) -> Vec<i32> {
    let years: BTreeSet<i32> = table.records.iter().map(|r| r.date.year()).collect();
    years.into_iter().rev().collect()
}

/// Parse a month selector value. `"All"` and unknown names give `None`.
pub fn parse_month(name: &str) -> Option<Month> {
    let name = name.trim();
    if name.eq_ignore_ascii_case(ALL) {
        return None;
    }
    Month::from_str(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PriceRecord;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(dates: &[NaiveDate]) -> PriceTable {
        let records = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| PriceRecord::new(date, Some(i as f64)))
            .collect();
        PriceTable::new(records, Vec::new(), true)
    }

    fn dates(table: &PriceTable) -> Vec<NaiveDate> {
        table.records.iter().map(|r| r.date).collect()
    }

    #[test]
    fn empty_spec_is_identity() {
        let t = table(&[d(2022, 1, 1), d(2023, 5, 5), d(2024, 12, 31)]);
        assert_eq!(filter_table(&t, &FilterSpec::default()), t);
        assert_eq!(filtered_indices(&t, &FilterSpec::default()), vec![0, 1, 2]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let t = table(&[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        let spec = FilterSpec {
            date_range: Some((d(2024, 1, 2), d(2024, 1, 3))),
            ..Default::default()
        };
        assert_eq!(dates(&filter_table(&t, &spec)), vec![d(2024, 1, 2), d(2024, 1, 3)]);
    }

    #[test]
    fn inverted_range_is_empty() {
        let t = table(&[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        let spec = FilterSpec {
            date_range: Some((d(2024, 1, 3), d(2024, 1, 1))),
            ..Default::default()
        };
        let out = filter_table(&t, &spec);
        assert!(out.is_empty());
        assert!(out.has_price);
    }

    #[test]
    fn month_and_year_combine() {
        let t = table(&[d(2023, 3, 1), d(2023, 3, 15), d(2022, 3, 10), d(2023, 4, 1)]);
        let spec = FilterSpec {
            month: parse_month("March"),
            year: Some(2023),
            ..Default::default()
        };
        assert_eq!(dates(&filter_table(&t, &spec)), vec![d(2023, 3, 1), d(2023, 3, 15)]);
    }

    #[test]
    fn month_alone_spans_years() {
        let t = table(&[d(2022, 3, 10), d(2023, 3, 1), d(2023, 4, 1)]);
        let spec = FilterSpec {
            month: Some(Month::March),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&t, &spec), vec![0, 1]);
    }

    #[test]
    fn filtering_does_not_mutate_source() {
        let t = table(&[d(2023, 1, 1), d(2024, 1, 1)]);
        let before = t.clone();
        let spec = FilterSpec {
            year: Some(2024),
            ..Default::default()
        };
        let out = filter_table(&t, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(t, before);
    }

    #[test]
    fn year_options_are_distinct_and_descending() {
        let t = table(&[d(2021, 1, 1), d(2023, 1, 1), d(2023, 6, 1), d(2022, 1, 1)]);
        assert_eq!(year_options(&t), vec![2023, 2022, 2021]);
    }

    #[test]
    fn month_names() {
        assert_eq!(parse_month("All"), None);
        assert_eq!(parse_month("march"), Some(Month::March));
        assert_eq!(parse_month("Sep"), Some(Month::September));
        assert_eq!(parse_month("Smarch"), None);
        assert_eq!(month_options().len(), 12);
        assert_eq!(month_options()[0].name(), "January");
    }
}
