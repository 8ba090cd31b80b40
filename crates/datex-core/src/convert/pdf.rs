use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

use crate::convert::{column_names, record};
use crate::error::DatexError;
use crate::extraction::table::find_tables;
use crate::extraction::{PageContent, PdfExtractor};
use crate::model::ParsedTable;

/// Extract every table from a PDF.
pub fn parse_pdf(path: &Path, extractor: &dyn PdfExtractor) -> Result<ParsedTable, DatexError> {
    let bytes = std::fs::read(path)?;
    let pages = extractor.extract_pages(&bytes)?;
    debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted PDF text"
    );
    Ok(tables_from_pages(&pages))
}

/// One entry per detected table, numbered from 1 on each page. Pages
/// without tables still count toward `pages`.
pub fn tables_from_pages(pages: &[PageContent]) -> ParsedTable {
    let mut all_tables = Vec::new();
    let mut total_rows = 0;
    let mut max_columns = 0;

    for page in pages {
        for (idx, table) in find_tables(page).into_iter().enumerate() {
            let raw: Vec<Option<&str>> = table.header.iter().map(|h| Some(h.as_str())).collect();
            let columns = column_names(&raw);

            let data: Vec<Value> = table
                .rows
                .into_iter()
                .map(|row| {
                    let values = row
                        .into_iter()
                        .map(|cell| cell.map(Value::String).unwrap_or(Value::Null))
                        .collect();
                    record(&columns, values)
                })
                .collect();

            total_rows += data.len();
            max_columns = max_columns.max(columns.len());
            all_tables.push(json!({
                "page": page.page_number,
                "table": idx + 1,
                "rows": data.len(),
                "columns": columns.len(),
                "data": data,
            }));
        }
    }

    ParsedTable {
        data: Value::Array(all_tables),
        pages: pages.len(),
        rows: total_rows,
        columns: max_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize, lines: &[&str]) -> PageContent {
        PageContent {
            page_number: number,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn tables_across_pages() {
        let pages = vec![
            page(
                1,
                &[
                    "Invoice summary",
                    "",
                    "Item      Qty    Price",
                    "Pen       3      1.50",
                    "Paper     10     4.00",
                ],
            ),
            page(2, &["Terms and conditions apply."]),
            page(
                3,
                &["Code    Desc", "A1      First", "", "K    V    W    X", "1    2    3    4"],
            ),
        ];

        let table = tables_from_pages(&pages);
        assert_eq!(table.pages, 3);
        assert_eq!(table.rows, 4);
        assert_eq!(table.columns, 4);

        let tables = table.data.as_array().unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0]["page"], 1);
        assert_eq!(tables[0]["table"], 1);
        assert_eq!(tables[0]["data"][1], json!({"Item": "Paper", "Qty": "10", "Price": "4.00"}));
        assert_eq!(tables[1]["page"], 3);
        assert_eq!(tables[2]["table"], 2);
        assert_eq!(tables[2]["columns"], 4);
    }

    #[test]
    fn no_tables_keeps_page_count() {
        let table = tables_from_pages(&[page(1, &["just prose"]), page(2, &[])]);
        assert_eq!((table.pages, table.rows, table.columns), (2, 0, 0));
        assert_eq!(table.data, json!([]));
    }
}
