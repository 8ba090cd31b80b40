use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::convert::object_width;
use crate::error::DatexError;
use crate::model::ParsedTable;

pub fn parse_json(path: &Path) -> Result<ParsedTable, DatexError> {
    let file = std::fs::File::open(path)?;
    let data: Value = serde_json::from_reader(BufReader::new(file))?;
    Ok(shape_json(data))
}

/// Arrays count elements (width from the first element when it is an
/// object), objects are one row, scalars are 1x1.
pub fn shape_json(data: Value) -> ParsedTable {
    let (rows, columns) = match &data {
        Value::Array(items) => (items.len(), items.first().map(object_width).unwrap_or(0)),
        Value::Object(map) => (1, map.len()),
        _ => (1, 1),
    };
    ParsedTable {
        data,
        pages: 1,
        rows,
        columns,
    }
}
