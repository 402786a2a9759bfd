//! Metron CLI
//!
//! Reads conversion requests from stdin, one per line, and writes one JSON
//! object per line to stdout:
//!
//! ```text
//! $ echo "20 degC to degF" | metron
//! {"success":true,"value":"68","formatted":"68",...}
//! ```
//!
//! Blank lines produce `{"empty":true}`. Logs go to stderr (`RUST_LOG`,
//! default `info`).
//!
//! Environment:
//! - `METRON_CONFIG_DIR`: load every `*.json` category file from this
//!   directory instead of the bundled set

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use metron_core::ErrorDetails;
use metron_units::{initialize_with, load_all, load_sources, Converter, LineResult, Registry};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn config_dir() -> Option<PathBuf> {
    env::var_os("METRON_CONFIG_DIR").map(PathBuf::from)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Read `(category, json)` pairs from every `*.json` file in `dir`,
/// sorted by file name. The category name is the file stem.
async fn read_config_dir(dir: &Path) -> Result<Vec<(String, String)>, ErrorDetails> {
    let unreadable = |e: std::io::Error| {
        ErrorDetails::configuration(format!("Cannot read configuration directory {}", dir.display()))
            .with_context(e.to_string())
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ErrorDetails::configuration(format!("Cannot read {}", path.display())).with_context(e.to_string())
        })?;
        debug!(category = %name, path = %path.display(), "Read category file");
        sources.push((name, text));
    }
    Ok(sources)
}

async fn load_registry() -> Result<Registry, ErrorDetails> {
    match config_dir() {
        Some(dir) => {
            info!(dir = %dir.display(), "Loading unit configuration from directory");
            load_sources(read_config_dir(&dir).await?)
        }
        None => load_all(),
    }
}

/// JSON line for one input line
fn respond(converter: &Converter, line: &str) -> String {
    let result = match converter.convert_lines(line).into_iter().next() {
        Some(result) => result,
        None => LineResult::empty(),
    };
    serde_json::to_string(&result).unwrap_or_else(|e| {
        serde_json::json!({
            "success": false,
            "error": ErrorDetails::internal(e.to_string()),
        })
        .to_string()
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    info!("Metron v{} starting", VERSION);

    let registry = match load_registry().await {
        Ok(registry) => registry,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.render());
            return ExitCode::FAILURE;
        }
    };
    for w in registry.warnings() {
        warn!("{}", w);
    }

    let converter = Converter::new(initialize_with(registry));

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let mut out = respond(&converter, &line);
        out.push('\n');
        if let Err(e) = stdout.write_all(out.as_bytes()).await {
            error!("Error writing stdout: {}", e);
            return ExitCode::FAILURE;
        }
        if let Err(e) = stdout.flush().await {
            error!("Error flushing stdout: {}", e);
            return ExitCode::FAILURE;
        }
    }

    debug!("stdin closed");
    ExitCode::SUCCESS
}
