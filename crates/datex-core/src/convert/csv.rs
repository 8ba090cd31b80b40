use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::convert::{column_names, float_value, record};
use crate::error::DatexError;
use crate::model::ParsedTable;

/// Load a CSV file as a single table.
///
/// The first line is the header. Each column gets one scalar type, chosen
/// from its non-empty cells: integer, then float, then boolean, else string.
pub fn parse_csv(path: &Path) -> Result<ParsedTable, DatexError> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(file)
}

pub fn parse_csv_reader<R: Read>(reader: R) -> Result<ParsedTable, DatexError> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = match records.next() {
        Some(rec) => rec?,
        None => {
            return Err(DatexError::EmptyData(
                "No columns to parse from file".into(),
            ))
        }
    };
    let raw: Vec<Option<&str>> = header.iter().map(Some).collect();
    let columns = column_names(&raw);

    let mut cells: Vec<Vec<String>> = Vec::new();
    for rec in records {
        let rec = rec?;
        if rec.len() > columns.len() {
            let line = rec.position().map(|p| p.line()).unwrap_or_default();
            return Err(DatexError::Malformed(format!(
                "Error tokenizing data. Expected {} fields in line {}, saw {}",
                columns.len(),
                line,
                rec.len()
            )));
        }
        cells.push(rec.iter().map(str::to_string).collect());
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| ColumnKind::infer(cells.iter().filter_map(|row| row.get(col))))
        .collect();

    let data: Vec<Value> = cells
        .into_iter()
        .map(|row| {
            let values = row
                .iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect();
            record(&columns, values)
        })
        .collect();

    Ok(ParsedTable {
        rows: data.len(),
        columns: columns.len(),
        pages: 1,
        data: Value::Array(data),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Narrowest kind every non-empty cell satisfies. An all-empty column
    /// is text (every cell ends up `null` anyway).
    fn infer<'a>(cells: impl Iterator<Item = &'a String>) -> ColumnKind {
        let mut kind: Option<ColumnKind> = None;
        for cell in cells {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let this = if cell.parse::<i64>().is_ok() {
                ColumnKind::Integer
            } else if cell.parse::<f64>().is_ok() {
                ColumnKind::Float
            } else if parse_bool(cell).is_some() {
                ColumnKind::Boolean
            } else {
                return ColumnKind::Text;
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                _ => return ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Text)
    }

    fn convert(&self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(cell.to_string())),
            ColumnKind::Float => trimmed
                .parse::<f64>()
                .map(float_value)
                .unwrap_or_else(|_| Value::String(cell.to_string())),
            ColumnKind::Boolean => parse_bool(trimmed)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::String(cell.to_string())),
            ColumnKind::Text => Value::String(cell.to_string()),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<ParsedTable, DatexError> {
        parse_csv_reader(text.as_bytes())
    }

    #[test]
    fn three_by_three_table() {
        let table = parse(
            "Name,Age,City\nAlice,30,Paris\nBob,25,London\nCarla,41,Rome\n",
        )
        .unwrap();
        assert_eq!((table.pages, table.rows, table.columns), (1, 3, 3));
        assert_eq!(
            table.data,
            json!([
                {"Name": "Alice", "Age": 30, "City": "Paris"},
                {"Name": "Bob", "Age": 25, "City": "London"},
                {"Name": "Carla", "Age": 41, "City": "Rome"}
            ])
        );
    }

    #[test]
    fn mixed_numeric_column_becomes_float() {
        let table = parse("x,y\n1,a\n2.5,b\n").unwrap();
        assert_eq!(table.data, json!([{"x": 1.0, "y": "a"}, {"x": 2.5, "y": "b"}]));
    }

    #[test]
    fn empty_cells_and_short_rows_are_null() {
        let table = parse("a,b,c\n1,,x\n2\n").unwrap();
        assert_eq!(
            table.data,
            json!([
                {"a": 1, "b": null, "c": "x"},
                {"a": 2, "b": null, "c": null}
            ])
        );
    }

    #[test]
    fn booleans_and_text_fallback() {
        let table = parse("flag,code\nTrue,007\nfalse,abc\n").unwrap();
        assert_eq!(
            table.data,
            json!([
                {"flag": true, "code": "007"},
                {"flag": false, "code": "abc"}
            ])
        );
    }

    #[test]
    fn header_only_has_zero_rows() {
        let table = parse("a,b\n").unwrap();
        assert_eq!((table.rows, table.columns), (0, 2));
        assert_eq!(table.data, json!([]));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse("").unwrap_err();
        assert_eq!(err.to_string(), "No columns to parse from file");
    }

    #[test]
    fn long_row_is_an_error() {
        let err = parse("a,b\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("Expected 2 fields"));
    }

    #[test]
    fn duplicate_headers_are_renamed() {
        let table = parse("id,id,\n1,2,3\n").unwrap();
        assert_eq!(table.data, json!([{"id": 1, "id.1": 2, "Unnamed: 2": 3}]));
    }

    #[test]
    fn non_ascii_survives() {
        let table = parse("stad,namn\nGöteborg,Åsa\n").unwrap();
        assert_eq!(table.data, json!([{"stad": "Göteborg", "namn": "Åsa"}]));
    }
}
