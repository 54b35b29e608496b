//! Configuration types for fit-index analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. The diagram step has its own configuration
//! object, [`crate::pipeline::diagram::DiagramSpec`], because its inputs are
//! unrelated to the uploaded document.

use crate::error::SemFitError;
use crate::pipeline::text::DocumentReader;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for analysing one document.
///
/// # Example
/// ```rust
/// use semfit::{AnalysisConfig, LabelAnchoring};
///
/// let config = AnalysisConfig::builder()
///     .anchoring(LabelAnchoring::WordBoundary)
///     .preview_chars(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.preview_chars, 500);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// How index labels are matched in the source text.
    pub extraction: ExtractionOptions,

    /// Number of characters of extracted text shown as a preview. Default: 2000.
    pub preview_chars: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Appearance of the fit-index bar chart.
    pub chart: ChartStyle,

    /// Pre-constructed document reader. If None, pdfium is used.
    pub reader: Option<Arc<dyn DocumentReader>>,

    /// Receives stage events while the pipeline runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionOptions::default(),
            preview_chars: 2000,
            password: None,
            download_timeout_secs: 120,
            chart: ChartStyle::default(),
            reader: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("extraction", &self.extraction)
            .field("preview_chars", &self.preview_chars)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("chart", &self.chart)
            .field("reader", &self.reader.as_ref().map(|_| "<dyn DocumentReader>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn extraction(mut self, options: ExtractionOptions) -> Self {
        self.config.extraction = options;
        self
    }

    pub fn anchoring(mut self, anchoring: LabelAnchoring) -> Self {
        self.config.extraction.anchoring = anchoring;
        self
    }

    pub fn span_lines(mut self, v: bool) -> Self {
        self.config.extraction.span_lines = v;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn chart(mut self, style: ChartStyle) -> Self {
        self.config.chart = style;
        self
    }

    pub fn reader(mut self, reader: Arc<dyn DocumentReader>) -> Self {
        self.config.reader = Some(reader);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, SemFitError> {
        let c = &self.config;
        if c.chart.width < 100 || c.chart.height < 100 {
            return Err(SemFitError::InvalidConfig(format!(
                "Chart size must be at least 100x100 px, got {}x{}",
                c.chart.width, c.chart.height
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(SemFitError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Extraction options ───────────────────────────────────────────────────

/// How an index label must be delimited to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelAnchoring {
    /// Bare literal label. "NFI" also matches inside "NNFI" or "PNFI". (default)
    #[default]
    Prefix,
    /// Label must stand as a whole word, so "NFI" no longer matches "NNFI".
    WordBoundary,
}

/// Options for the fit-index extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionOptions {
    pub anchoring: LabelAnchoring,
    /// Let the gap between label and number cross line breaks. Default: false,
    /// so a label only picks up a number on its own line.
    pub span_lines: bool,
}

// ── Chart style ──────────────────────────────────────────────────────────

/// Size, captions and bar colour of the fit-index bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub y_label: String,
    /// Bar fill as RGB. Default: sky blue.
    pub color: (u8, u8, u8),
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: "SEM Fit Indices".to_string(),
            y_label: "Value".to_string(),
            color: (135, 206, 235),
        }
    }
}
