use datex_core::model::Envelope;

pub fn print(source: &str, envelope: &Envelope) {
    print!("{}", format_envelope(source, envelope));
}

/// Human-readable summary of one parse.
pub fn format_envelope(source: &str, envelope: &Envelope) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {source} ===\n\n"));
    out.push_str(&format!("  Status:  {}\n", envelope.status));

    if let Some(ref error) = envelope.error {
        out.push_str(&format!("  Error:   {error}\n"));
    }

    if let Some(ref path) = envelope.json_path {
        out.push_str(&format!("  Output:  {}\n", path.display()));
        out.push_str(&format!(
            "  Shape:   {} page(s), {} row(s), {} column(s)\n",
            envelope.pages, envelope.rows, envelope.columns
        ));
    }

    out
}
