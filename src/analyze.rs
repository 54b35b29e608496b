//! Analysis entry points: one document in, one [`AnalysisOutput`] out.
//!
//! Each call handles a single document from start to finish and keeps no
//! state afterwards. A document that cannot be read fails the whole call;
//! index-level problems only make the affected index absent.

use crate::config::AnalysisConfig;
use crate::error::{DiagramError, SemFitError};
use crate::output::{AnalysisOutput, AnalysisStats, DiagramOutput, DocumentMetadata};
use crate::pipeline::chart::BarChart;
use crate::pipeline::diagram::{self, DiagramRenderer, DiagramSpec};
use crate::pipeline::indices::FitIndexExtractor;
use crate::pipeline::input;
use crate::pipeline::text::{self, DocumentReader, ExtractedDocument, PdfiumReader};
use crate::progress::Stage;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analyse a PDF file or URL.
///
/// # Errors
/// Returns `Err(SemFitError)` when the document cannot be resolved, opened or
/// parsed. A document without any fit index is *not* an error; check
/// [`AnalysisOutput::is_empty_result`].
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SemFitError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting analysis: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = staged(config, Stage::ResolveInput, async {
        input::resolve_input(input_str, config.download_timeout_secs).await
    })
    .await?;

    // ── Step 2: Read text ────────────────────────────────────────────────
    let read_start = Instant::now();
    let document = staged(
        config,
        Stage::ReadDocument,
        read_document(resolved.path(), config),
    )
    .await?;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;

    // ── Step 3: Extract, tabulate, chart ─────────────────────────────────
    let mut output = analyze_document(&document, config)?;
    output.stats.read_duration_ms = read_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Analysis complete: {}/{} indices found, {}ms total",
        output.stats.indices_found,
        crate::FitIndexName::COUNT,
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Analyse PDF bytes held in memory, e.g. an uploaded file.
///
/// The bytes are written to a managed temp file that is removed on return.
pub async fn analyze_bytes(
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SemFitError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("semfit-upload-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| SemFitError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| SemFitError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    analyze(&path, config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SemFitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SemFitError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(input_str, config))
}

/// Run extraction, table and chart on an already-read document.
pub fn analyze_document(
    document: &ExtractedDocument,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SemFitError> {
    let mut output = analyze_text(document.source_text(), config)?;
    output.stats.page_count = document.pages.len();
    output.metadata = document.metadata.clone();
    Ok(output)
}

/// Run extraction, table and chart on plain text.
pub fn analyze_text(
    source_text: String,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SemFitError> {
    let extract_start = Instant::now();
    notify_start(config, Stage::ExtractIndices);
    let extractor = FitIndexExtractor::new(config.extraction)?;
    let (report, parse_failures) = extractor.extract_with_diagnostics(&source_text);
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    notify_complete(config, Stage::ExtractIndices, extract_duration_ms);
    debug!(
        "{} indices found, {} parse failures",
        report.found_count(),
        parse_failures.len()
    );

    let chart_start = Instant::now();
    notify_start(config, Stage::BuildChart);
    let chart = BarChart::from_report(&report, &config.chart);
    notify_complete(
        config,
        Stage::BuildChart,
        chart_start.elapsed().as_millis() as u64,
    );

    let stats = AnalysisStats {
        page_count: 0,
        source_chars: source_text.chars().count(),
        indices_found: report.found_count(),
        read_duration_ms: 0,
        extract_duration_ms,
        total_duration_ms: extract_start.elapsed().as_millis() as u64,
    };

    Ok(AnalysisOutput {
        preview: text::preview(&source_text, config.preview_chars),
        source_text,
        report,
        parse_failures,
        chart,
        metadata: DocumentMetadata::default(),
        stats,
    })
}

/// Extract PDF metadata without analysing content.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<DocumentMetadata, SemFitError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let path = resolved.path().to_path_buf();
    let reader = reader_for(config);
    let password = config.password.clone();
    tokio::task::spawn_blocking(move || reader.read_metadata(&path, password.as_deref()))
        .await
        .map_err(|e| SemFitError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Generate the path diagram, reporting [`Stage::GenerateDiagram`] to the
/// configured progress callback.
///
/// Independent of any analysed document; only the callback is taken from
/// `config`.
pub async fn generate_diagram(
    spec: &DiagramSpec,
    renderer: &dyn DiagramRenderer,
    config: &AnalysisConfig,
) -> Result<DiagramOutput, DiagramError> {
    staged(
        config,
        Stage::GenerateDiagram,
        diagram::generate(spec, renderer),
    )
    .await
}

/// Write `contents` to `path` atomically (temp file + rename).
pub async fn write_output(path: impl AsRef<Path>, contents: &[u8]) -> Result<(), SemFitError> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| SemFitError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn reader_for(config: &AnalysisConfig) -> Arc<dyn DocumentReader> {
    match config.reader {
        Some(ref reader) => Arc::clone(reader),
        None => Arc::new(PdfiumReader),
    }
}

/// Read the document on the blocking pool.
async fn read_document(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<ExtractedDocument, SemFitError> {
    let reader = reader_for(config);
    let path = path.to_path_buf();
    let password = config.password.clone();

    let document = tokio::task::spawn_blocking(move || reader.read(&path, password.as_deref()))
        .await
        .map_err(|e| SemFitError::Internal(format!("Read task panicked: {}", e)))??;

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_read(document.pages.len(), document.source_text().chars().count());
    }
    Ok(document)
}

/// Run `fut`, reporting start/complete/error for `stage`.
async fn staged<T, E: std::fmt::Display>(
    config: &AnalysisConfig,
    stage: Stage,
    fut: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let start = Instant::now();
    notify_start(config, stage);
    match fut.await {
        Ok(v) => {
            notify_complete(config, stage, start.elapsed().as_millis() as u64);
            Ok(v)
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}

fn notify_start(config: &AnalysisConfig, stage: Stage) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn notify_complete(config: &AnalysisConfig, stage: Stage, elapsed_ms: u64) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit_index::FitIndexName;
    use crate::progress::AnalysisProgressCallback;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    #[test]
    fn analyze_text_end_to_end() {
        let config = AnalysisConfig::default();
        let out = analyze_text(
            "Model fit: CFI = 0.97, RMSEA=0.045, SRMR .031".to_string(),
            &config,
        )
        .unwrap();
        assert_eq!(out.report.get(FitIndexName::Cfi), Some(0.97));
        assert_eq!(out.report.get(FitIndexName::Rmsea), Some(0.045));
        assert_eq!(out.report.get(FitIndexName::Srmr), Some(0.031));
        assert_eq!(out.stats.indices_found, 3);
        assert_eq!(out.chart.as_ref().map(|c| c.bars.len()), Some(3));
        assert!(!out.is_empty_result());
    }

    #[test]
    fn analyze_text_without_indices() {
        let out = analyze_text("Nothing to see here.".to_string(), &AnalysisConfig::default())
            .unwrap();
        assert!(out.is_empty_result());
        assert!(out.chart.is_none());
        assert_eq!(out.report.len(), 13);
    }

    #[test]
    fn preview_is_truncated() {
        let config = AnalysisConfig::builder().preview_chars(5).build().unwrap();
        let out = analyze_text("CFI = 0.97 and more".to_string(), &config).unwrap();
        assert_eq!(out.preview, "CFI =");
        assert_eq!(out.stats.source_chars, 19);
    }

    #[derive(Default)]
    struct StageLog {
        events: Mutex<Vec<(&'static str, Stage)>>,
    }

    impl AnalysisProgressCallback for StageLog {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(("start", stage));
        }
        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(("complete", stage));
        }
        fn on_stage_error(&self, stage: Stage, _error: &str) {
            self.events.lock().unwrap().push(("error", stage));
        }
    }

    struct WritePng;

    impl DiagramRenderer for WritePng {
        fn render<'a>(
            &'a self,
            _script: &'a str,
            spec: &'a DiagramSpec,
        ) -> BoxFuture<'a, Result<(), DiagramError>> {
            Box::pin(async move {
                image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]))
                    .save(&spec.output_path)
                    .map_err(|e| DiagramError::Io(std::io::Error::other(e.to_string())))
            })
        }
    }

    struct Fails;

    impl DiagramRenderer for Fails {
        fn render<'a>(
            &'a self,
            _script: &'a str,
            _spec: &'a DiagramSpec,
        ) -> BoxFuture<'a, Result<(), DiagramError>> {
            Box::pin(async { Err(DiagramError::Timeout { secs: 1 }) })
        }
    }

    fn logged_config() -> (Arc<StageLog>, AnalysisConfig) {
        let log = Arc::new(StageLog::default());
        let config = AnalysisConfig::builder()
            .progress_callback(log.clone())
            .build()
            .unwrap();
        (log, config)
    }

    #[tokio::test]
    async fn diagram_stage_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let spec = DiagramSpec::default().with_output_path(dir.path().join("d.png"));
        let (log, config) = logged_config();

        generate_diagram(&spec, &WritePng, &config).await.unwrap();

        assert_eq!(
            *log.events.lock().unwrap(),
            vec![
                ("start", Stage::GenerateDiagram),
                ("complete", Stage::GenerateDiagram)
            ]
        );
    }

    #[tokio::test]
    async fn diagram_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let spec = DiagramSpec::default().with_output_path(dir.path().join("d.png"));
        let (log, config) = logged_config();

        let err = generate_diagram(&spec, &Fails, &config).await.unwrap_err();

        assert!(matches!(err, DiagramError::Timeout { secs: 1 }));
        assert_eq!(
            *log.events.lock().unwrap(),
            vec![
                ("start", Stage::GenerateDiagram),
                ("error", Stage::GenerateDiagram)
            ]
        );
    }

    #[tokio::test]
    async fn write_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/chart.svg");
        write_output(&path, b"<svg/>").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");
        assert!(!dir.path().join("nested/out/chart.svg.tmp").exists());
    }
}
