use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatexError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Spreadsheet(String),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Input parsed but holds nothing to tabulate (no header, no root).
    #[error("{0}")]
    EmptyData(String),

    #[error("{0}")]
    Malformed(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for DatexError {
    fn from(e: calamine::Error) -> Self {
        DatexError::Spreadsheet(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DatexError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        DatexError::Xml(e.into())
    }
}
