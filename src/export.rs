//! Hands the compiled document to its destination.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;

/// Where a "copy" lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Printed once the terminal has been restored.
    Stdout,
    File(PathBuf),
}

impl ExportTarget {
    pub fn from_config(config: &Config) -> Self {
        if config.output_is_stdout() {
            Self::Stdout
        } else {
            Self::File(config.output_path())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdout => "stdout".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Write `document` to a file, creating its parent directories on demand.
/// Returns the path written.
pub fn write_document(document: &str, path: &Path) -> Result<PathBuf, String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            warn!(path = ?parent, error = %e, "export_failed");
            format!("Could not create {}: {}", parent.display(), e)
        })?;
    }

    fs::write(path, document).map_err(|e| {
        warn!(path = ?path, error = %e, "export_failed");
        format!("Could not write {}: {}", path.display(), e)
    })?;

    info!(path = ?path, bytes = document.len(), "document_exported");
    Ok(path.to_path_buf())
}

/// Export to `target`. A stdout target cannot be written while the TUI owns the
/// terminal, so the caller keeps the document and calls `print_document` on exit.
pub fn export_document(document: &str, target: &ExportTarget) -> Result<PathBuf, String> {
    match target {
        ExportTarget::Stdout => {
            info!(bytes = document.len(), "document_queued_for_stdout");
            Ok(PathBuf::from("-"))
        }
        ExportTarget::File(path) => write_document(document, path),
    }
}

/// Print a document to stdout with a trailing newline.
pub fn print_document(document: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", document)?;
    out.flush()
}
