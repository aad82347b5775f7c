use std::path::{Path, PathBuf};

use chrono::{Month, NaiveDate};
use eframe::egui::Color32;

use crate::color::series_color;
use crate::config::{DashboardConfig, MetalSource};
use crate::data::filter::{filter_table, FilterSpec};
use crate::data::loader::{load_price_table, LoadError, LoadOptions};
use crate::data::model::PriceTable;
use crate::data::stats::{summarize, Summary};

// ---------------------------------------------------------------------------
// Load outcome
// ---------------------------------------------------------------------------

/// What happened when a source file was read.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState {
    Loaded(PriceTable),
    /// The file does not exist; rendered as a warning, not an error.
    NotFound(PathBuf),
    /// The file exists but could not be read; holds a user-facing message.
    Failed(String),
}

/// Load one source, folding every failure into a [`SourceState`].
pub fn load_source(path: &Path, options: LoadOptions) -> SourceState {
    match load_price_table(path, options) {
        Ok(table) => SourceState::Loaded(table),
        Err(LoadError::NotFound(p)) => SourceState::NotFound(p),
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            SourceState::Failed(format!("Error loading {}: {e}", path.display()))
        }
    }
}

// ---------------------------------------------------------------------------
// Filter controls and derived view
// ---------------------------------------------------------------------------

/// Widget values for one tab. Converted to a [`FilterSpec`] on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControls {
    pub year: Option<i32>,
    pub month: Option<Month>,
    pub use_date_range: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterControls {
    /// "All" everywhere, with the range pickers preset to the table bounds.
    pub fn for_table(table: &PriceTable) -> Self {
        let (start, end) = table.date_bounds().unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            (today, today)
        });
        Self {
            year: None,
            month: None,
            use_date_range: false,
            start,
            end,
        }
    }

    pub fn spec(&self) -> FilterSpec {
        FilterSpec {
            date_range: self.use_date_range.then_some((self.start, self.end)),
            month: self.month,
            year: self.year,
        }
    }
}

/// Result of one filter interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub table: PriceTable,
    pub summary: Summary,
}

/// `(table, spec) → (filtered table, summary)`.
pub fn evaluate(table: &PriceTable, spec: &FilterSpec) -> FilteredView {
    let table = filter_table(table, spec);
    let summary = summarize(&table);
    FilteredView { table, summary }
}

// ---------------------------------------------------------------------------
// Per-metal tab state
// ---------------------------------------------------------------------------

pub struct MetalView {
    pub source: MetalSource,
    pub path: PathBuf,
    pub color: Color32,
    pub state: SourceState,
    pub controls: Option<FilterControls>,
    /// Filtered rows for the current controls (cached).
    pub view: Option<FilteredView>,
}

impl MetalView {
    pub fn load(source: MetalSource, path: PathBuf, color: Color32, options: LoadOptions) -> Self {
        let state = load_source(&path, options);
        let mut metal = Self {
            source,
            path,
            color,
            state,
            controls: None,
            view: None,
        };
        metal.reset_filters();
        metal
    }

    pub fn table(&self) -> Option<&PriceTable> {
        match &self.state {
            SourceState::Loaded(table) => Some(table),
            _ => None,
        }
    }

    /// Put every control back to "All" and recompute.
    pub fn reset_filters(&mut self) {
        self.controls = self.table().map(FilterControls::for_table);
        self.refilter();
    }

    /// Recompute `view` after a control change.
    pub fn refilter(&mut self) {
        self.view = match (self.table(), &self.controls) {
            (Some(table), Some(controls)) => Some(evaluate(table, &controls.spec())),
            _ => None,
        };
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub metals: Vec<MetalView>,
    /// Index into `metals` of the selected tab.
    pub active: usize,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            config,
            metals: Vec::new(),
            active: 0,
            status_message: None,
        };
        state.reload();
        state
    }

    /// Re-read every source file. Filter selections are reset.
    pub fn reload(&mut self) {
        let options = self.config.load_options();
        let count = self.config.metals.len();
        self.metals = self
            .config
            .metals
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let path = self.config.path_for(source);
                let color = series_color(source.color.as_deref(), i, count);
                MetalView::load(source.clone(), path, color, options)
            })
            .collect();
        self.active = self.active.min(count.saturating_sub(1));
        self.status_message = None;
    }

    pub fn active_metal(&self) -> Option<&MetalView> {
        self.metals.get(self.active)
    }

    pub fn active_metal_mut(&mut self) -> Option<&mut MetalView> {
        self.metals.get_mut(self.active)
    }
}
