use datex_core::error::DatexError;
use datex_core::extraction::pdftotext::PdftotextExtractor;
use datex_core::format::detect_format;
use datex_core::model::FormatTag;
use std::path::Path;

pub fn run(path: &Path, format_hint: Option<&str>) -> Result<(), DatexError> {
    if !path.exists() {
        return Err(DatexError::FileNotFound(path.to_path_buf()));
    }

    let tag = detect_format(path, format_hint);
    match FormatTag::from_tag(&tag) {
        Some(format) => println!("{}: {format} ({})", path.display(), format.description()),
        None => println!("{}: {tag} (no converter)", path.display()),
    }
    Ok(())
}

pub fn formats() {
    for format in FormatTag::ALL {
        println!("  {:<6} {}", format.as_str(), format.description());
    }
    if !PdftotextExtractor::is_available() {
        println!("\n  note: pdftotext not found, pdf sources will fail until poppler is installed");
    }
}
