use std::io::Write;
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tempfile::TempPath;
use tracing::debug;
use url::Url;

use crate::config::ParserConfig;
use crate::error::DatexError;
use crate::format::extension_for_mime;

/// Filename prefix of every downloaded temp file.
pub const DOWNLOAD_PREFIX: &str = "datex-";

/// True for `http://` and `https://` source references.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Download `url` into a uniquely named temp file.
///
/// The returned guard removes the file when dropped; removal errors are
/// ignored. Non-2xx responses and timeouts come back as
/// [`DatexError::Network`].
pub fn fetch_remote(url: &str, config: &ParserConfig) -> Result<TempPath, DatexError> {
    let client = Client::builder()
        .timeout(config.fetch_timeout)
        .user_agent(config.user_agent())
        .build()?;

    let response = client.get(url).send()?.error_for_status()?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.bytes()?;

    let filename = download_filename(url, &content_type)?;
    let suffix = Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut builder = tempfile::Builder::new();
    builder.prefix(DOWNLOAD_PREFIX).suffix(&suffix);
    let mut tmp = match config.temp_dir {
        Some(ref dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    tmp.write_all(&body)?;
    tmp.flush()?;

    debug!(
        url,
        bytes = body.len(),
        path = %tmp.path().display(),
        "downloaded remote source"
    );
    Ok(tmp.into_temp_path())
}

/// Local filename for a download: the last URL path segment when it has an
/// extension, else `download.<ext>` from the content type.
pub fn download_filename(url: &str, content_type: &str) -> Result<String, DatexError> {
    let parsed = Url::parse(url)?;
    let from_path = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && name.contains('.'))
        .map(str::to_string);

    Ok(from_path.unwrap_or_else(|| format!("download.{}", extension_for_mime(content_type))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(content_type: &str, body: &str, path: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{addr}{path}")
    }

    #[test]
    fn download_is_removed_when_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParserConfig::default().with_temp_dir(dir.path());
        let url = serve_once("text/csv", "a,b\n1,2\n", "/data/sales.csv");

        let guard = fetch_remote(&url, &config).unwrap();
        let path = guard.to_path_buf();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(DOWNLOAD_PREFIX));
        assert_eq!(path.extension().unwrap(), "csv");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");

        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn url_classification() {
        assert!(is_url("http://example.com/a.csv"));
        assert!(is_url("https://example.com/a.csv"));
        assert!(!is_url("ftp://example.com/a.csv"));
        assert!(!is_url("data/http.csv"));
    }

    #[test]
    fn filename_from_url_path() {
        let name = download_filename("https://example.com/files/sales.csv?x=1", "").unwrap();
        assert_eq!(name, "sales.csv");
    }

    #[test]
    fn filename_from_content_type_when_path_has_no_extension() {
        let name =
            download_filename("https://example.com/export", "application/json; charset=utf-8")
                .unwrap();
        assert_eq!(name, "download.json");

        let name = download_filename("https://example.com/", "text/csv").unwrap();
        assert_eq!(name, "download.csv");
    }

    #[test]
    fn filename_defaults_to_generic_extension() {
        let name = download_filename("https://example.com/blob", "").unwrap();
        assert_eq!(name, "download.dat");
    }

    #[test]
    fn invalid_url_is_an_error() {
        assert!(download_filename("http://", "").is_err());
    }
}
