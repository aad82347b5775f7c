use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::DashboardConfig;
use crate::data::filter::{month_options, year_options, ALL};
use crate::data::stats::{format_price, Summary};
use crate::export::{export_file_name, save_xlsx, ExportScope, XLSX_EXTENSION};
use crate::state::{AppState, MetalView, SourceState};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu bar and the metal tabs.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        for i in 0..state.metals.len() {
            let label = state.metals[i].source.label();
            if ui.selectable_label(state.active == i, label).clicked() {
                state.active = i;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filters, downloads, file list
// ---------------------------------------------------------------------------

/// Render the left panel for the active metal.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let mut requested = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let Some(metal) = state.active_metal_mut() else {
                ui.label("No metals configured.");
                return;
            };

            if filter_widgets(ui, metal) {
                metal.refilter();
            }

            if metal.table().is_some() {
                ui.separator();
                ui.strong("Download Options");
                requested = download_buttons(ui, metal);
            }

            ui.separator();
            data_files(ui, &state.config);
        });

    if let Some(scope) = requested {
        let Some(metal) = state.active_metal() else {
            return;
        };
        match export_dialog(metal, scope) {
            Ok(Some(path)) => log::info!("Saved {} export to {}", metal.source.name, path.display()),
            Ok(None) => {}
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Year, month and date-range widgets. Returns whether anything changed.
fn filter_widgets(ui: &mut Ui, metal: &mut MetalView) -> bool {
    let Some(table) = metal.table() else {
        ui.label("No data loaded.");
        return false;
    };
    let years = year_options(table);
    let bounds = table.date_bounds();
    let salt = metal.source.name.clone();

    let Some(controls) = metal.controls.as_mut() else {
        return false;
    };
    let before = controls.clone();

    ui.strong("Select Year");
    let year_text = controls
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| ALL.to_string());
    egui::ComboBox::from_id_salt(format!("{salt}_year"))
        .selected_text(year_text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut controls.year, None, ALL);
            for y in &years {
                ui.selectable_value(&mut controls.year, Some(*y), y.to_string());
            }
        });

    ui.strong("Select Month");
    let month_text = controls.month.map(|m| m.name()).unwrap_or(ALL);
    egui::ComboBox::from_id_salt(format!("{salt}_month"))
        .selected_text(month_text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut controls.month, None, ALL);
            for m in month_options() {
                ui.selectable_value(&mut controls.month, Some(*m), m.name());
            }
        });

    ui.add_space(4.0);
    ui.checkbox(&mut controls.use_date_range, "Use Date Range");
    if controls.use_date_range {
        egui::Grid::new(format!("{salt}_range"))
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.label("Start Date");
                ui.add(DatePickerButton::new(&mut controls.start).id_salt("range_start"));
                ui.end_row();
                ui.label("End Date");
                ui.add(DatePickerButton::new(&mut controls.end).id_salt("range_end"));
                ui.end_row();
            });
        if let Some((lo, hi)) = bounds {
            controls.start = controls.start.clamp(lo, hi);
            controls.end = controls.end.clamp(lo, hi);
        }
    }

    let changed = *controls != before;

    ui.add_space(4.0);
    if ui.small_button("Reset filters").clicked() {
        metal.reset_filters();
        return false;
    }

    changed
}

fn download_buttons(ui: &mut Ui, metal: &MetalView) -> Option<ExportScope> {
    let filtered = metal.view.as_ref().map(|v| v.table.len()).unwrap_or(0);
    let complete = metal.table().map(|t| t.len()).unwrap_or(0);

    let mut requested = None;
    if ui
        .button(format!("Download Filtered Data ({filtered} records)"))
        .clicked()
    {
        requested = Some(ExportScope::Filtered);
    }
    if ui
        .button(format!("Download Complete Dataset ({complete} records)"))
        .clicked()
    {
        requested = Some(ExportScope::Complete);
    }
    requested
}

fn data_files(ui: &mut Ui, config: &DashboardConfig) {
    ui.label(RichText::new("Data files loaded from:").small());
    for metal in &config.metals {
        ui.label(RichText::new(format!("• {}", config.path_for(metal).display())).small());
    }
}

// ---------------------------------------------------------------------------
// Central panel pieces
// ---------------------------------------------------------------------------

/// Warning or error banner for a metal without a table. Returns `true` if shown.
pub fn source_banner(ui: &mut Ui, metal: &MetalView) -> bool {
    match &metal.state {
        SourceState::Loaded(_) => false,
        SourceState::NotFound(path) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(
                    RichText::new(format!(
                        "⚠ {} data file not found. Please ensure {} exists.",
                        metal.source.name,
                        path.display()
                    ))
                    .color(Color32::YELLOW)
                    .heading(),
                );
            });
            true
        }
        SourceState::Failed(msg) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(msg).color(Color32::RED).heading());
            });
            true
        }
    }
}

/// The four headline metrics.
pub fn metrics_row(ui: &mut Ui, summary: &Summary) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Records", summary.records.to_string());
        metric(&mut cols[1], "Average Price", format_price(summary.mean));
        metric(&mut cols[2], "Min Price", format_price(summary.min));
        metric(&mut cols[3], "Max Price", format_price(summary.max));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

/// Ask for a destination and write the workbook. `Ok(None)` if cancelled.
pub fn export_dialog(metal: &MetalView, scope: ExportScope) -> Result<Option<PathBuf>> {
    let table = match scope {
        ExportScope::Filtered => metal.view.as_ref().map(|v| &v.table),
        ExportScope::Complete => metal.table(),
    }
    .context("no data to export")?;

    let file_name = export_file_name(&metal.source.name, scope);
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save spreadsheet")
        .set_file_name(&file_name)
        .add_filter("Excel workbook", &[XLSX_EXTENSION])
        .save_file()
    else {
        return Ok(None);
    };

    save_xlsx(table, &path).with_context(|| format!("exporting to {}", path.display()))?;
    Ok(Some(path))
}
