//! Result types returned by the analysis entry points.

use crate::error::IndexParseFailure;
use crate::fit_index::FitIndexReport;
use crate::pipeline::chart::BarChart;
use crate::pipeline::table::FitTable;
use serde::Serialize;
use std::path::PathBuf;

/// Everything derived from one uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// Full extracted text. Not serialised; see `preview`.
    #[serde(skip)]
    pub source_text: String,
    /// First `preview_chars` characters of the extracted text.
    pub preview: String,
    pub report: FitIndexReport,
    /// Indices whose numeric-looking token failed to parse.
    pub parse_failures: Vec<IndexParseFailure>,
    /// `None` when no index has a value.
    pub chart: Option<BarChart>,
    pub metadata: DocumentMetadata,
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    pub fn table(&self) -> FitTable {
        FitTable::from_report(&self.report)
    }

    /// True when no fit index was found at all.
    pub fn is_empty_result(&self) -> bool {
        self.report.has_no_values()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub page_count: usize,
    /// Characters (not bytes) of extracted text.
    pub source_chars: usize,
    pub indices_found: usize,
    pub read_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Document-level metadata reported by the PDF parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// A successfully generated path diagram.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub png: Vec<u8>,
    pub duration_ms: u64,
}
