use datex_core::config::ParserConfig;
use datex_core::error::DatexError;
use std::path::PathBuf;
use std::time::Duration;

use crate::output;

/// Run one parse and print its envelope. Returns whether it succeeded.
pub fn run(
    source: &str,
    format_hint: Option<&str>,
    output_dir: PathBuf,
    timeout_secs: u64,
    output_format: &str,
) -> Result<bool, DatexError> {
    let config = ParserConfig::default()
        .with_output_dir(output_dir)
        .with_fetch_timeout(Duration::from_secs(timeout_secs));

    let envelope = datex_core::parse(source, format_hint, &config);

    match output_format {
        "json" => output::json::print(&envelope)?,
        _ => output::table::print(source, &envelope),
    }

    Ok(envelope.is_success())
}
