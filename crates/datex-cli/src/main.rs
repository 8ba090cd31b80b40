mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "datex",
    version,
    about = "Extract CSV, Excel, PDF tables, XML and JSON into normalized JSON records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a local file or URL and write <stem>_parsed.json
    Parse {
        /// Local path or http(s) URL
        source: String,

        /// Format tag overriding detection (csv, xlsx, xls, pdf, xml, json)
        #[arg(short, long = "format", value_name = "TAG")]
        format: Option<String>,

        /// Directory the parsed JSON is written to
        #[arg(long, env = "DATEX_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Timeout for remote fetches, in seconds
        #[arg(long, env = "DATEX_FETCH_TIMEOUT", default_value_t = 30)]
        timeout: u64,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show which format a local file would be parsed as
    Detect {
        /// Path to the file
        path: PathBuf,

        /// Format tag overriding detection
        #[arg(short, long = "format", value_name = "TAG")]
        format: Option<String>,
    },
    /// List supported format tags
    Formats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            source,
            format,
            output_dir,
            timeout,
            output,
        } => commands::parse::run(&source, format.as_deref(), output_dir, timeout, &output),
        Commands::Detect { path, format } => {
            commands::detect::run(&path, format.as_deref()).map(|_| true)
        }
        Commands::Formats => {
            commands::detect::formats();
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        // A failure envelope was printed; signal it to scripts.
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
