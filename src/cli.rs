//! Headless subcommands: print statistics or write an export without the GUI.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::DashboardConfig;
use crate::data::filter::{parse_month, FilterSpec, ALL};
use crate::data::loader::load_price_table;
use crate::data::model::PriceTable;
use crate::data::stats::format_price;
use crate::export::{export_file_name, save_xlsx, ExportScope};
use crate::state::evaluate;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print record count and mean/min/max for a filtered series
    Summary {
        /// Metal name or symbol, e.g. `copper` or `Cu`
        #[arg(short, long)]
        metal: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write a series to an .xlsx workbook
    Export {
        #[arg(short, long)]
        metal: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Export every row and ignore the filters
        #[arg(long)]
        complete: bool,
        /// Destination file (defaults to `<metal>_<scope>_data.xlsx`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Calendar year
    #[arg(long)]
    pub year: Option<i32>,
    /// Month name (`March`, `mar`) or `All`
    #[arg(long)]
    pub month: Option<String>,
    /// Inclusive range start, YYYY-MM-DD
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Inclusive range end, YYYY-MM-DD
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn spec(&self) -> Result<FilterSpec> {
        let month = match self.month.as_deref() {
            Some(name) if !name.trim().eq_ignore_ascii_case(ALL) => {
                Some(parse_month(name).ok_or_else(|| anyhow!("unknown month '{name}'"))?)
            }
            _ => None,
        };
        Ok(FilterSpec {
            date_range: self.from.zip(self.to),
            month,
            year: self.year,
        })
    }
}

pub fn run(command: Command, config: &DashboardConfig, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Summary { metal, filters } => summary(config, &metal, &filters, out),
        Command::Export {
            metal,
            filters,
            complete,
            output,
        } => export(config, &metal, &filters, complete, output, out),
    }
}

fn load(config: &DashboardConfig, key: &str) -> Result<(String, PriceTable)> {
    let metal = config
        .find_metal(key)
        .with_context(|| format!("unknown metal '{key}'"))?;
    let path = config.path_for(metal);
    let table = load_price_table(&path, config.load_options())
        .with_context(|| format!("loading {} data", metal.name))?;
    Ok((metal.name.clone(), table))
}

fn summary(
    config: &DashboardConfig,
    key: &str,
    filters: &FilterArgs,
    out: &mut impl Write,
) -> Result<()> {
    let (name, table) = load(config, key)?;
    let view = evaluate(&table, &filters.spec()?);
    let s = view.summary;

    writeln!(out, "{name}")?;
    writeln!(out, "Total Records: {}", s.records)?;
    writeln!(out, "Average Price: {}", format_price(s.mean))?;
    writeln!(out, "Min Price: {}", format_price(s.min))?;
    writeln!(out, "Max Price: {}", format_price(s.max))?;
    Ok(())
}

fn export(
    config: &DashboardConfig,
    key: &str,
    filters: &FilterArgs,
    complete: bool,
    output: Option<PathBuf>,
    out: &mut impl Write,
) -> Result<()> {
    let (name, table) = load(config, key)?;
    let (scope, rows) = if complete {
        (ExportScope::Complete, table)
    } else {
        (ExportScope::Filtered, evaluate(&table, &filters.spec()?).table)
    };
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(&name, scope)));
    if path.is_dir() {
        bail!("{} is a directory", path.display());
    }

    save_xlsx(&rows, &path).with_context(|| format!("exporting to {}", path.display()))?;
    writeln!(out, "Wrote {} records to {}", rows.len(), path.display())?;
    Ok(())
}
