//! Error types for the semfit library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`SemFitError`] — **Fatal** for the current upload: the document cannot
//!   be resolved, opened or parsed, or an output cannot be written. Returned as
//!   `Err(SemFitError)` from the top-level `analyze*` functions. The shell
//!   halts the upload instead of extracting from empty or garbage text.
//!
//! * [`IndexParseFailure`] — **Non-fatal**, per index: a numeric-looking token
//!   followed the label but did not parse as a number. The index degrades to
//!   "absent" and is listed in [`crate::output::AnalysisOutput::parse_failures`].
//!
//! * [`DiagramError`] — **Non-fatal but user-visible**: the external modeling
//!   tool failed or produced no image. The shell shows a warning and moves on.

use crate::fit_index::FitIndexName;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the semfit library.
#[derive(Debug, Error)]
pub enum SemFitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' could not be read: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium system-wide, or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// plotters failed while drawing the bar chart.
    #[error("Failed to render fit-index chart: {0}")]
    ChartRenderFailed(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SemFitError {
    /// True for every failure that means "the uploaded document could not be
    /// read". Extraction must not run after one of these.
    pub fn is_document_read_error(&self) -> bool {
        matches!(
            self,
            SemFitError::FileNotFound { .. }
                | SemFitError::PermissionDenied { .. }
                | SemFitError::InvalidInput { .. }
                | SemFitError::DownloadFailed { .. }
                | SemFitError::DownloadTimeout { .. }
                | SemFitError::NotAPdf { .. }
                | SemFitError::CorruptPdf { .. }
                | SemFitError::PasswordRequired { .. }
                | SemFitError::WrongPassword { .. }
                | SemFitError::PdfiumBindingFailed(_)
        )
    }
}

/// A numeric-looking token that followed an index label but failed to parse.
///
/// Only that one index becomes absent; extraction of the others continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("{index}: token {token:?} is not a number")]
pub struct IndexParseFailure {
    pub index: FitIndexName,
    pub token: String,
}

/// Failure of the external diagram generator.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// The modeling program (e.g. `Rscript`) is not installed or not on PATH.
    #[error("Diagram renderer '{program}' was not found.\nInstall R with the lavaan and semPlot packages, or pass --rscript <PATH>.")]
    RendererNotFound { program: String },

    /// The script ran but exited unsuccessfully.
    #[error("Diagram script exited with status {status}: {stderr}")]
    ScriptFailed { status: String, stderr: String },

    /// The script did not finish within the configured timeout.
    #[error("Diagram script timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The script finished but the expected image file is not there.
    #[error("Diagram script finished but produced no image at '{path}'")]
    OutputMissing { path: PathBuf },

    /// The produced file is not a decodable image.
    #[error("Diagram image at '{path}' is invalid: {detail}")]
    InvalidImage { path: PathBuf, detail: String },

    /// Filesystem error around the script or output file.
    #[error("Diagram I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_pdf_is_document_read_error() {
        let e = SemFitError::CorruptPdf {
            path: PathBuf::from("report.pdf"),
            detail: "bad xref".into(),
        };
        assert!(e.is_document_read_error());
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn output_errors_are_not_document_read_errors() {
        let e = SemFitError::ChartRenderFailed("boom".into());
        assert!(!e.is_document_read_error());
        let e = SemFitError::InvalidConfig("x".into());
        assert!(!e.is_document_read_error());
    }

    #[test]
    fn index_parse_failure_display() {
        let e = IndexParseFailure {
            index: FitIndexName::Cfi,
            token: "-".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("CFI"), "got: {msg}");
        assert!(msg.contains("\"-\""), "got: {msg}");
    }

    #[test]
    fn diagram_timeout_display() {
        let e = DiagramError::Timeout { secs: 30 };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn diagram_output_missing_display() {
        let e = DiagramError::OutputMissing {
            path: PathBuf::from("sem_diagram.png"),
        };
        assert!(e.to_string().contains("sem_diagram.png"));
    }
}
