use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// The closed set of formats a converter exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Csv,
    Xlsx,
    Xls,
    Pdf,
    Xml,
    Json,
}

impl FormatTag {
    pub const ALL: [FormatTag; 6] = [
        FormatTag::Csv,
        FormatTag::Xlsx,
        FormatTag::Xls,
        FormatTag::Pdf,
        FormatTag::Xml,
        FormatTag::Json,
    ];

    /// Look up a tag case-insensitively. Returns `None` for anything
    /// without a converter, including the `unknown` sentinel.
    pub fn from_tag(s: &str) -> Option<FormatTag> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(FormatTag::Csv),
            "xlsx" => Some(FormatTag::Xlsx),
            "xls" => Some(FormatTag::Xls),
            "pdf" => Some(FormatTag::Pdf),
            "xml" => Some(FormatTag::Xml),
            "json" => Some(FormatTag::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Csv => "csv",
            FormatTag::Xlsx => "xlsx",
            FormatTag::Xls => "xls",
            FormatTag::Pdf => "pdf",
            FormatTag::Xml => "xml",
            FormatTag::Json => "json",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FormatTag::Csv => "single table, header from the first line",
            FormatTag::Xlsx | FormatTag::Xls => "every sheet, header from each sheet's first row",
            FormatTag::Pdf => "tables detected per page from layout text",
            FormatTag::Xml => "element tree as nested objects, flattened on repeated tags",
            FormatTag::Json => "document loaded verbatim",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converter output: the records plus shape metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub data: Value,
    /// Sheets for workbooks, pages for PDFs, otherwise 1.
    pub pages: usize,
    pub rows: usize,
    /// Widest sub-table for multi-table sources, never a sum.
    pub columns: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// The one value every parse call returns.
///
/// Fields are public so callers can read and serialize them. The parse
/// entry points only build envelopes through [`Envelope::success`] and
/// [`Envelope::failure`]: a success carries an artifact path and a failure
/// has zeroed counters. A hand-built envelope can break that pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub error: Option<String>,
    pub json_path: Option<PathBuf>,
    pub pages: usize,
    pub rows: usize,
    pub columns: usize,
}

impl Envelope {
    pub fn success(json_path: PathBuf, table: &ParsedTable) -> Self {
        Envelope {
            status: Status::Success,
            error: None,
            json_path: Some(json_path),
            pages: table.pages,
            rows: table.rows,
            columns: table.columns,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Envelope {
            status: Status::Failure,
            error: Some(error.into()),
            json_path: None,
            pages: 0,
            rows: 0,
            columns: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_tag_is_case_insensitive() {
        assert_eq!(FormatTag::from_tag("CSV"), Some(FormatTag::Csv));
        assert_eq!(FormatTag::from_tag(" Xlsx "), Some(FormatTag::Xlsx));
        assert_eq!(FormatTag::from_tag("unknown"), None);
        assert_eq!(FormatTag::from_tag("docx"), None);
    }

    #[test]
    fn failure_envelope_serializes_with_nulls_and_zeroes() {
        let env = Envelope::failure("File not found: missing.csv");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "failure",
                "error": "File not found: missing.csv",
                "json_path": null,
                "pages": 0,
                "rows": 0,
                "columns": 0
            })
        );
    }

    #[test]
    fn success_envelope_copies_counters() {
        let table = ParsedTable {
            data: json!([]),
            pages: 2,
            rows: 7,
            columns: 4,
        };
        let env = Envelope::success(PathBuf::from("output/book_parsed.json"), &table);
        assert!(env.is_success());
        assert_eq!(env.error, None);
        assert_eq!((env.pages, env.rows, env.columns), (2, 7, 4));
    }
}
