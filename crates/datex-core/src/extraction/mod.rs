pub mod pdftotext;
pub mod table;

use crate::error::DatexError;

/// Layout text of a single PDF page.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract layout-preserving text from PDF bytes, one PageContent per
    /// page, blank pages included.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, DatexError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
