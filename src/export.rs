//! Spreadsheet Export Module
//! Writes a price table to a single-sheet `.xlsx` workbook.
//!
//! The workbook is assembled directly as OOXML parts inside a ZIP archive:
//! one worksheet named `Data`, inline strings, and a date number format.

use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::data::model::{CellValue, PriceTable};

pub const SHEET_NAME: &str = "Data";
pub const XLSX_EXTENSION: &str = "xlsx";

/// Style indices into `cellXfs` in [`styles_xml`].
const STYLE_DATE: u8 = 1;
const STYLE_HEADER: u8 = 2;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("building workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("writing workbook: {0}")]
    Io(#[from] std::io::Error),
}

/// Which rows an export covers; decides the suggested file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Filtered,
    Complete,
}

/// `copper_filtered_data.xlsx` / `copper_complete_data.xlsx`.
pub fn export_file_name(metal: &str, scope: ExportScope) -> String {
    let suffix = match scope {
        ExportScope::Filtered => "filtered",
        ExportScope::Complete => "complete",
    };
    format!("{}_{suffix}_data.{XLSX_EXTENSION}", metal.to_lowercase())
}

/// Serialize `table` into xlsx bytes: header row, then one row per record.
pub fn write_xlsx(table: &PriceTable) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml().as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels_xml().as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml().as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml().as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(styles_xml().as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(sheet_xml(table).as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

/// Write the workbook for `table` to `path`.
pub fn save_xlsx(table: &PriceTable, path: &Path) -> Result<(), ExportError> {
    let bytes = write_xlsx(table)?;
    std::fs::write(path, bytes)?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Worksheet
// ---------------------------------------------------------------------------

fn sheet_xml(table: &PriceTable) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (col, name) in table.column_names().iter().enumerate() {
        push_string_cell(&mut xml, col, 1, name, Some(STYLE_HEADER));
    }
    xml.push_str("</row>");

    for (i, record) in table.records.iter().enumerate() {
        let row = i + 2;
        xml.push_str(&format!(r#"<row r="{row}">"#));

        let mut col = 0;
        xml.push_str(&format!(
            r#"<c r="{}" s="{STYLE_DATE}"><v>{}</v></c>"#,
            cell_ref(col, row),
            excel_serial(record.date)
        ));
        col += 1;

        if table.has_price {
            if let Some(price) = record.price {
                push_number_cell(&mut xml, col, row, price);
            }
            col += 1;
        }

        for cell in &record.extra {
            match cell {
                CellValue::Null => {}
                CellValue::Bool(b) => xml.push_str(&format!(
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    cell_ref(col, row),
                    u8::from(*b)
                )),
                CellValue::String(s) => push_string_cell(&mut xml, col, row, s, None),
                CellValue::Integer(_) | CellValue::Float(_) => {
                    if let Some(v) = cell.as_f64() {
                        push_number_cell(&mut xml, col, row, v);
                    }
                }
            }
            col += 1;
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_number_cell(xml: &mut String, col: usize, row: usize, value: f64) {
    if value.is_finite() {
        xml.push_str(&format!(r#"<c r="{}"><v>{value}</v></c>"#, cell_ref(col, row)));
    } else {
        push_string_cell(xml, col, row, &value.to_string(), None);
    }
}

fn push_string_cell(xml: &mut String, col: usize, row: usize, text: &str, style: Option<u8>) {
    let style = style.map(|s| format!(r#" s="{s}""#)).unwrap_or_default();
    xml.push_str(&format!(
        r#"<c r="{}"{style} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref(col, row),
        escape_xml(text)
    ));
}

/// `num_days_from_ce` of 1899-12-30, day zero of the 1900 date system.
const EXCEL_EPOCH_CE_DAYS: i32 = 693_594;

/// Days since the 1900 date system epoch (valid from March 1900 on).
fn excel_serial(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EXCEL_EPOCH_CE_DAYS
}

/// `A1`-style reference for zero-based `col`, one-based `row`.
fn cell_ref(col: usize, row: usize) -> String {
    format!("{}{row}", column_letters(col))
}

fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Not representable in XML 1.0.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Package parts
// ---------------------------------------------------------------------------

fn content_types_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#
        .to_string()
}

fn root_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
        .to_string()
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{SHEET_NAME}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#
    )
}

fn workbook_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
        .to_string()
}

fn styles_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
  </cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PriceRecord;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut text = String::new();
        part.read_to_string(&mut text).unwrap();
        text
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_table_exports_header_only() {
        let table = PriceTable::new(Vec::new(), Vec::new(), true);
        let bytes = write_xlsx(&table).unwrap();

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert_eq!(workbook.matches("<sheet ").count(), 1);
        assert!(workbook.contains(r#"name="Data""#));

        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 1);
        assert!(sheet.contains(">date</t>"));
        assert!(sheet.contains(">price</t>"));
    }

    #[test]
    fn rows_follow_table_order() {
        let mut a = PriceRecord::new(d(2024, 1, 2), Some(8500.5));
        a.extra.push(CellValue::String("R&D <desk>".into()));
        let mut b = PriceRecord::new(d(2024, 1, 3), None);
        b.extra.push(CellValue::Integer(7));
        let table = PriceTable::new(vec![a, b], vec!["note".into()], true);

        let sheet = read_part(&write_xlsx(&table).unwrap(), "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 3);
        // 2024-01-02 is serial 45293.
        assert!(sheet.contains(r#"<c r="A2" s="1"><v>45293</v></c>"#));
        assert!(sheet.contains(r#"<c r="B2"><v>8500.5</v></c>"#));
        assert!(sheet.contains("R&amp;D &lt;desk&gt;"));
        // Missing price leaves B3 empty.
        assert!(!sheet.contains(r#"r="B3""#));
        assert!(sheet.contains(r#"<c r="C3"><v>7</v></c>"#));
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn file_names_follow_scope() {
        assert_eq!(
            export_file_name("Copper", ExportScope::Filtered),
            "copper_filtered_data.xlsx"
        );
        assert_eq!(
            export_file_name("Aluminum", ExportScope::Complete),
            "aluminum_complete_data.xlsx"
        );
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iron_complete_data.xlsx");
        let table = PriceTable::new(vec![PriceRecord::new(d(2024, 5, 1), Some(1.0))], Vec::new(), true);
        save_xlsx(&table, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(read_part(&bytes, "[Content_Types].xml").contains("spreadsheetml"));
    }
}
