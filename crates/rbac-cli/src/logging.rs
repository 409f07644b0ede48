//! Subscriber setup: stdout plus an optional plain-text log file

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Open `path` for appending; `None` when the path is empty
pub fn open_log_file(path: &Path) -> Result<Option<File>> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(Some(file))
}

/// Install the global subscriber. Events go to stdout and, when `log_file`
/// is non-empty, are appended to it without ANSI colours.
pub fn init(verbose: bool, log_file: &Path) -> Result<()> {
    let stdout_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    let installed = match open_log_file(log_file)? {
        Some(file) => {
            let file_layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(filter(verbose)))
                .with(file_layer.with_filter(filter(verbose)))
                .try_init()
        }
        None => tracing_subscriber::registry()
            .with(stdout_layer.with_filter(filter(verbose)))
            .try_init(),
    };
    installed.context("Failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_selects_debug() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
    }

    #[test]
    fn empty_path_disables_the_file() {
        assert!(open_log_file(Path::new("")).unwrap().is_none());
    }

    #[test]
    fn log_file_is_appended() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("application.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let mut file = open_log_file(&path).unwrap().unwrap();
        writeln!(file, "this run").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier run\nthis run\n"
        );
    }
}
