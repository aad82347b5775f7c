use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::data::model::PriceTable;

// ---------------------------------------------------------------------------
// Price chart (central panel)
// ---------------------------------------------------------------------------

/// Dates are plotted as days from the common era so grid marks map back exactly.
fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Split the series at missing prices so gaps are drawn as gaps.
pub fn line_segments(table: &PriceTable) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for record in &table.records {
        match record.price {
            Some(price) => current.push([date_to_x(record.date), price]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Render the price line chart for one metal.
pub fn price_chart(ui: &mut Ui, name: &str, color: Color32, table: &PriceTable) {
    let series_name = format!("{name} price");

    Plot::new(format!("{name}_price_plot"))
        .height(400.0)
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("Price ($)")
        .x_axis_formatter(|mark, _range| x_to_label(mark.value))
        .label_formatter(|_name, point| format!("{}\n${:.2}", x_to_label(point.x), point.y))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for segment in line_segments(table) {
                let line = Line::new(PlotPoints::from(segment))
                    .name(&series_name)
                    .color(color)
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PriceRecord;

    #[test]
    fn missing_prices_break_the_line() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prices = [Some(1.0), Some(2.0), None, None, Some(3.0), None];
        let records = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceRecord::new(start + chrono::Days::new(i as u64), p))
            .collect();
        let table = PriceTable::new(records, Vec::new(), true);

        let segments = line_segments(&table);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1], vec![[date_to_x(start) + 4.0, 3.0]]);
    }

    #[test]
    fn axis_labels_round_trip_dates() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
        assert_eq!(x_to_label(date_to_x(date)), "2023-03-15");
        assert_eq!(x_to_label(date_to_x(date) + 0.4), "2023-03-15");
    }
}
