use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use serde_json::{json, Value};
use tracing::debug;

use crate::convert::{column_names, float_value, record};
use crate::error::DatexError;
use crate::model::ParsedTable;

/// Records and shape of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub data: Vec<Value>,
    pub rows: usize,
    pub columns: usize,
}

/// Load every sheet of an xls/xlsx/xlsb/ods workbook.
pub fn parse_workbook(path: &Path) -> Result<ParsedTable, DatexError> {
    let mut workbook = open_workbook_auto(path)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        debug!(sheet = %name, size = ?range.get_size(), "reading sheet");
        sheets.push(sheet_table(name, &range));
    }

    Ok(aggregate_sheets(sheets))
}

/// Convert one sheet. The first row of the used range is the header.
pub fn sheet_table(sheet_name: String, range: &Range<Data>) -> SheetTable {
    let mut rows = range.rows();
    let header: Vec<Option<String>> = match rows.next() {
        Some(cells) => cells.iter().map(header_text).collect(),
        None => {
            return SheetTable {
                sheet_name,
                data: vec![],
                rows: 0,
                columns: 0,
            }
        }
    };
    let columns = column_names(&header);

    let data: Vec<Value> = rows
        .map(|cells| record(&columns, cells.iter().map(cell_value).collect()))
        .collect();

    SheetTable {
        sheet_name,
        rows: data.len(),
        columns: columns.len(),
        data,
    }
}

/// Combine per-sheet tables: rows add up, columns take the widest sheet.
pub fn aggregate_sheets(sheets: Vec<SheetTable>) -> ParsedTable {
    let pages = sheets.len();
    let rows = sheets.iter().map(|s| s.rows).sum();
    let columns = sheets.iter().map(|s| s.columns).max().unwrap_or(0);

    let data = sheets
        .into_iter()
        .map(|s| {
            json!({
                "sheet_name": s.sheet_name,
                "data": s.data,
                "rows": s.rows,
                "columns": s.columns,
            })
        })
        .collect();

    ParsedTable {
        data: Value::Array(data),
        pages,
        rows,
        columns,
    }
}

fn header_text(cell: &Data) -> Option<String> {
    match cell_value(cell) {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// JSON value for one cell. Dates are stringified as `YYYY-MM-DD HH:MM:SS`.
pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::from(*f as i64)
            } else {
                float_value(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::String(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}
