use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::PriceTable;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable data table with the canonical column order.
pub fn data_table(ui: &mut Ui, id: &str, table: &PriceTable) {
    let columns = table.column_names();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(90.0), columns.len())
            .min_scrolled_height(0.0)
            .max_scroll_height(300.0)
            .header(20.0, |mut header| {
                for name in &columns {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let record = &table.records[row.index()];
                    row.col(|ui| {
                        ui.label(record.date.format("%Y-%m-%d").to_string());
                    });
                    if table.has_price {
                        row.col(|ui| {
                            ui.label(record.price.map(|p| format!("{p:.2}")).unwrap_or_default());
                        });
                    }
                    for cell in &record.extra {
                        row.col(|ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
