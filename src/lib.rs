//! # semfit
//!
//! Extract structural-equation-modeling (SEM) fit indices from the text of a
//! PDF report and present them as a table and a bar chart. A path diagram for
//! a fixed model can also be generated through R's `lavaan` + `semPlot`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Text     page texts via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Indices  first number after each of 13 known labels
//!  ├─ 4. Table    one row per index, "n/a" where missing
//!  ├─ 5. Chart    bars for the present values (SVG)
//!  └─ 6. Diagram  on request: Rscript → PNG
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use semfit::{analyze, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::default();
//!     let output = analyze("fit_report.pdf", &config).await?;
//!     print!("{}", output.table().render_text());
//!     Ok(())
//! }
//! ```
//!
//! Text that is already in memory skips the PDF step entirely:
//!
//! ```rust
//! use semfit::{extract_fit_indices, FitIndexName};
//!
//! let report = extract_fit_indices("Model fit: CFI = 0.97, RMSEA=0.045, SRMR .031");
//! assert_eq!(report.get(FitIndexName::Cfi), Some(0.97));
//! assert_eq!(report.get(FitIndexName::Tli), None);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `semfit` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod display;
pub mod error;
pub mod fit_index;
pub mod model_script;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_bytes, analyze_document, analyze_sync, analyze_text, generate_diagram,
    inspect, write_output,
};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ChartStyle, ExtractionOptions, LabelAnchoring,
};
pub use display::DisplayBlock;
pub use error::{DiagramError, IndexParseFailure, SemFitError};
pub use fit_index::{FitIndexName, FitIndexReport};
pub use output::{AnalysisOutput, AnalysisStats, DiagramOutput, DocumentMetadata};
pub use pipeline::chart::BarChart;
pub use pipeline::diagram::{DiagramRenderer, DiagramSpec, RscriptRenderer};
pub use pipeline::indices::{extract_fit_indices, FitIndexExtractor};
pub use pipeline::table::FitTable;
pub use pipeline::text::{DocumentReader, ExtractedDocument, PdfiumReader};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
