use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::DatexError;

/// Stem used for artifacts of remote sources.
pub const DOWNLOADED_STEM: &str = "downloaded_file";

const ARTIFACT_SUFFIX: &str = "_parsed.json";

/// Stem of the artifact name: the source's file stem, or
/// [`DOWNLOADED_STEM`] for URLs.
pub fn artifact_stem(source: &str, is_url: bool) -> String {
    if is_url {
        return DOWNLOADED_STEM.to_string();
    }
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write `data` as pretty JSON to `{output_dir}/{stem}_parsed.json`.
///
/// Creates the directory when missing and overwrites an existing artifact.
pub fn write_artifact(output_dir: &Path, stem: &str, data: &Value) -> Result<PathBuf, DatexError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{stem}{ARTIFACT_SUFFIX}"));

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stem_from_local_path() {
        assert_eq!(artifact_stem("/data/housing.csv", false), "housing");
        assert_eq!(artifact_stem("archive.tar.gz", false), "archive.tar");
        assert_eq!(artifact_stem("https://x.org/a.csv", true), "downloaded_file");
    }

    #[test]
    fn writes_pretty_utf8_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("output");
        let data = json!([{"stad": "Malmö", "n": 1}]);

        let path = write_artifact(&out, "cities", &data).unwrap();
        assert_eq!(path, out.join("cities_parsed.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Malmö"));
        assert!(text.contains("\n  {\n    \"stad\""));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn overwrites_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "s", &json!([1, 2, 3, 4, 5])).unwrap();
        let path = write_artifact(dir.path(), "s", &json!([])).unwrap();
        let back: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, json!([]));
    }
}
