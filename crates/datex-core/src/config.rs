use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory artifacts land in when none is configured, relative to the
/// working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call settings for the extractor.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Where `<stem>_parsed.json` artifacts are written. Created on demand.
    pub output_dir: PathBuf,
    /// Upper bound on a remote fetch, connect through body.
    pub fetch_timeout: Duration,
    /// User-Agent header for remote fetches. `None` sends `datex/<version>`.
    pub user_agent: Option<String>,
    /// Directory for downloaded sources. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: None,
            temp_dir: None,
        }
    }
}

impl ParserConfig {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_temp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("datex/{}", env!("CARGO_PKG_VERSION")))
    }
}
