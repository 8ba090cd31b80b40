use std::path::Path;

use tracing::debug;

/// Returned when neither the extension nor the MIME sniffer names a format.
pub const UNKNOWN_FORMAT: &str = "unknown";

/// Extension used for downloads whose content type maps to nothing.
pub const FALLBACK_EXTENSION: &str = "dat";

/// MIME types recognized as a concrete format tag.
const MIME_TO_TAG: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("text/csv", "csv"),
    ("application/vnd.ms-excel", "xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("application/json", "json"),
];

/// Resolve the format tag for a local file.
///
/// A non-empty hint wins verbatim (lower-cased, never checked against the
/// content). Otherwise the extension decides, then the MIME sniffer, then
/// [`UNKNOWN_FORMAT`].
pub fn detect_format(path: &Path, hint: Option<&str>) -> String {
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        return hint.to_lowercase();
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .unwrap_or_default();
    if !ext.is_empty() {
        debug!(path = %path.display(), tag = %ext, "format from extension");
        return ext;
    }

    let sniffed = mime_guess::from_path(path)
        .first()
        .and_then(|mime| tag_for_mime(mime.essence_str()));
    match sniffed {
        Some(tag) => {
            debug!(path = %path.display(), tag, "format from mime type");
            tag.to_string()
        }
        None => UNKNOWN_FORMAT.to_string(),
    }
}

/// Map a MIME type (parameters allowed) onto a format tag.
pub fn tag_for_mime(content_type: &str) -> Option<&'static str> {
    let essence = mime_essence(content_type);
    MIME_TO_TAG
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, tag)| *tag)
}

/// File extension (no dot) for a response `Content-Type`.
pub fn extension_for_mime(content_type: &str) -> String {
    if let Some(tag) = tag_for_mime(content_type) {
        return tag.to_string();
    }
    mime_guess::get_mime_extensions_str(&mime_essence(content_type))
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
