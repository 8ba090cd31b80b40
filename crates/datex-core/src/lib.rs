pub mod config;
pub mod convert;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod format;
pub mod model;
pub mod output;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use config::ParserConfig;
use error::DatexError;
use extraction::pdftotext::PdftotextExtractor;
use extraction::PdfExtractor;
use model::{Envelope, FormatTag, ParsedTable};

/// Main API entry point: parse a local path or URL into a JSON artifact.
///
/// Never fails: every error becomes a failure envelope. Uses the pdftotext
/// backend for PDF sources.
pub fn parse(source: &str, format_hint: Option<&str>, config: &ParserConfig) -> Envelope {
    parse_source(source, format_hint, config, &PdftotextExtractor::new())
}

/// Like [`parse`], with an explicit PDF extraction backend.
pub fn parse_source(
    source: &str,
    format_hint: Option<&str>,
    config: &ParserConfig,
    pdf: &dyn PdfExtractor,
) -> Envelope {
    match run(source, format_hint, config, pdf) {
        Ok((json_path, table)) => Envelope::success(json_path, &table),
        Err(e) => {
            warn!(source, error = %e, "parse failed");
            Envelope::failure(e.to_string())
        }
    }
}

fn run(
    source: &str,
    format_hint: Option<&str>,
    config: &ParserConfig,
    pdf: &dyn PdfExtractor,
) -> Result<(PathBuf, ParsedTable), DatexError> {
    let is_url = fetch::is_url(source);

    // Dropping the guard deletes the download on every return path.
    let download = if is_url {
        Some(fetch::fetch_remote(source, config)?)
    } else {
        None
    };
    let path = download.as_deref().unwrap_or_else(|| Path::new(source));

    if !path.exists() {
        return Err(DatexError::FileNotFound(path.to_path_buf()));
    }

    let table = parse_local(path, format_hint, pdf)?;

    let stem = output::artifact_stem(source, is_url);
    let json_path = output::write_artifact(&config.output_dir, &stem, &table.data)?;
    info!(
        path = %json_path.display(),
        pages = table.pages,
        rows = table.rows,
        columns = table.columns,
        "wrote artifact"
    );

    Ok((json_path, table))
}

/// Detect the format of an existing local file and run its converter,
/// without persisting anything.
pub fn parse_local(
    path: &Path,
    format_hint: Option<&str>,
    pdf: &dyn PdfExtractor,
) -> Result<ParsedTable, DatexError> {
    let tag = format::detect_format(path, format_hint);
    // Unsupported hints are reported as given, not lower-cased.
    let reported = format_hint
        .filter(|h| !h.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| tag.clone());

    let format = FormatTag::from_tag(&tag).ok_or(DatexError::UnsupportedFormat(reported))?;
    debug!(path = %path.display(), %format, "dispatching converter");

    convert::convert(format, path, pdf)
}
