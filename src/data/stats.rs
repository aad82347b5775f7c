use super::model::PriceTable;

/// Headline numbers for a (possibly filtered) price series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// All rows, priced or not.
    pub records: usize,
    /// Rows with a non-missing price.
    pub priced: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Compute the summary over non-missing prices. Undefined values are `None`.
pub fn summarize(table: &PriceTable) -> Summary {
    let prices: Vec<f64> = table.records.iter().filter_map(|r| r.price).collect();
    if prices.is_empty() {
        return Summary {
            records: table.len(),
            ..Default::default()
        };
    }

    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;

    Summary {
        records: table.len(),
        priced: prices.len(),
        mean: Some(mean),
        min: Some(min),
        max: Some(max),
    }
}

/// Render a price metric, e.g. `$8512.40`, or `No data`.
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "No data".to_string(),
    }
}
