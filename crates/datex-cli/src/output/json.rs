use datex_core::error::DatexError;
use datex_core::model::Envelope;

pub fn print(envelope: &Envelope) -> Result<(), DatexError> {
    let json = serde_json::to_string_pretty(envelope)?;
    println!("{json}");
    Ok(())
}
