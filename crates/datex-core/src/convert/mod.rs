pub mod csv;
pub mod excel;
pub mod json;
pub mod pdf;
pub mod xml;

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::DatexError;
use crate::extraction::PdfExtractor;
use crate::model::{FormatTag, ParsedTable};

/// Run the converter registered for `tag` on a local file.
pub fn convert(
    tag: FormatTag,
    path: &Path,
    pdf: &dyn PdfExtractor,
) -> Result<ParsedTable, DatexError> {
    match tag {
        FormatTag::Csv => csv::parse_csv(path),
        FormatTag::Xlsx | FormatTag::Xls => excel::parse_workbook(path),
        FormatTag::Pdf => pdf::parse_pdf(path, pdf),
        FormatTag::Xml => xml::parse_xml(path),
        FormatTag::Json => json::parse_json(path),
    }
}

/// Turn raw header cells into unique column names.
///
/// Blank cells become `Unnamed: {index}`; repeats get `.1`, `.2`, ...
/// appended in order of appearance.
pub fn column_names<S: AsRef<str>>(raw: &[Option<S>]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, cell) in raw.iter().enumerate() {
        let base = match cell.as_ref().map(|s| s.as_ref()) {
            Some(s) if !s.trim().is_empty() => s.to_string(),
            _ => format!("Unnamed: {idx}"),
        };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

/// Zip column names with one row of values into a record.
///
/// Missing trailing values become `null`.
pub fn record(columns: &[String], values: Vec<Value>) -> Value {
    let mut values = values.into_iter();
    let map: Map<String, Value> = columns
        .iter()
        .map(|c| (c.clone(), values.next().unwrap_or(Value::Null)))
        .collect();
    Value::Object(map)
}

/// JSON value for a float. Non-finite values have no JSON form and are
/// written as their string spelling.
pub fn float_value(f: f64) -> Value {
    match Number::from_f64(f) {
        Some(n) => Value::Number(n),
        None => Value::String(f.to_string()),
    }
}

/// Width of a record: key count for objects, 0 otherwise.
pub fn object_width(value: &Value) -> usize {
    value.as_object().map(Map::len).unwrap_or(0)
}
