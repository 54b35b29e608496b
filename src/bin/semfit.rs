//! CLI binary for semfit.
//!
//! A thin shim over the library crate: maps CLI flags to `AnalysisConfig`,
//! runs one document through the pipeline and prints the display blocks.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use semfit::display::{self, DisplayBlock};
use semfit::{
    analyze, generate_diagram, inspect, write_output, AnalysisConfig, AnalysisOutput,
    AnalysisProgressCallback, DiagramError, DiagramSpec, LabelAnchoring, ProgressCallback,
    RscriptRenderer, Stage,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner with one log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("semfit");
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<28} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.2}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_document_read(&self, page_count: usize, chars: usize) {
        self.bar.println(format!(
            "  {} {}",
            dim("·"),
            dim(&format!("{page_count} pages, {chars} chars of text")),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {:<28} {}", red("✗"), stage.to_string(), red(first_line)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract fit indices and print the table + text bar chart
  semfit results.pdf

  # Save the bar chart and a self-contained HTML report
  semfit results.pdf --chart fit.svg --html report.html

  # Markdown report (table as a GFM pipe table)
  semfit results.pdf --markdown report.md

  # Also generate the SEM path diagram (requires R + lavaan + semPlot)
  semfit results.pdf --diagram --diagram-output sem_diagram.png

  # Match labels on word boundaries only (NFI no longer matches inside NNFI)
  semfit --word-boundary results.pdf

  # Analyse a PDF from a URL, JSON output
  semfit --json https://example.com/fit_report.pdf > fit.json

  # Inspect PDF metadata only
  semfit --inspect-only results.pdf

RECOGNISED FIT INDICES:
  CFI  TLI  NNFI  NFI  PNFI  RFI  IFI  RNI  RMSEA  SRMR  GFI  MFI  ECVI

  The first number after each label is taken; labels are case-sensitive.
  Indices that appear only inside images cannot be found.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (default: system library search path)
  RUST_LOG          Override log filter (e.g. semfit=debug)
  SEMFIT_*          Every flag has an env var, e.g. SEMFIT_PREVIEW_CHARS=500
"#;

/// Extract SEM fit indices from a PDF and visualise them.
#[derive(Parser, Debug)]
#[command(
    name = "semfit",
    version,
    about = "Extract SEM fit indices from a PDF and visualise them",
    long_about = "Extract structural-equation-modeling fit indices (CFI, TLI, RMSEA, SRMR, …) \
from the text of a PDF report. Shows a text preview, a table of all 13 indices and a bar chart \
of the ones found. Optionally generates an SEM path diagram through R's lavaan and semPlot.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SEMFIT_PASSWORD")]
    password: Option<String>,

    /// Characters of extracted text shown in the preview.
    #[arg(long, env = "SEMFIT_PREVIEW_CHARS", default_value_t = 2000)]
    preview_chars: usize,

    /// Require word boundaries around index labels.
    #[arg(long, env = "SEMFIT_WORD_BOUNDARY")]
    word_boundary: bool,

    /// Let the search for a value continue across line breaks.
    #[arg(long, env = "SEMFIT_SPAN_LINES")]
    span_lines: bool,

    /// Write the bar chart as SVG to this file.
    #[arg(long, env = "SEMFIT_CHART")]
    chart: Option<PathBuf>,

    /// Write a self-contained HTML report to this file.
    #[arg(long, env = "SEMFIT_HTML")]
    html: Option<PathBuf>,

    /// Write a Markdown report to this file.
    #[arg(long, env = "SEMFIT_MARKDOWN")]
    markdown: Option<PathBuf>,

    /// Print structured JSON (AnalysisOutput) instead of the text report.
    #[arg(long, env = "SEMFIT_JSON")]
    json: bool,

    /// Generate the SEM path diagram after the analysis.
    #[arg(long, env = "SEMFIT_DIAGRAM")]
    diagram: bool,

    /// Where the diagram PNG is written (overwritten on every run).
    #[arg(long, env = "SEMFIT_DIAGRAM_OUTPUT", default_value = "sem_diagram.png")]
    diagram_output: PathBuf,

    /// Text file with lavaan model syntax replacing the built-in model.
    #[arg(long, env = "SEMFIT_MODEL_FILE")]
    model_file: Option<PathBuf>,

    /// Rscript executable used for the diagram.
    #[arg(long, env = "SEMFIT_RSCRIPT", default_value = "Rscript")]
    rscript: PathBuf,

    /// Diagram script timeout in seconds.
    #[arg(long, env = "SEMFIT_DIAGRAM_TIMEOUT", default_value_t = 120)]
    diagram_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SEMFIT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print PDF metadata only, no analysis.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress spinner.
    #[arg(long, env = "SEMFIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SEMFIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SEMFIT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level feedback; keep library logs to errors.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(&cli, progress.clone())?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, &config).await;
        if let Some(ref p) = progress {
            p.finish();
        }
        let meta = meta.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Analysis ─────────────────────────────────────────────────────────
    let result = analyze(&cli.input, &config).await;
    if result.is_err() {
        if let Some(ref p) = progress {
            p.finish();
        }
    }
    let output = result.context("Analysis failed")?;

    let mut blocks = display::document_blocks(&output, &config.chart);

    // ── Diagram (only on request) ────────────────────────────────────────
    if cli.diagram {
        let spec = diagram_spec(&cli).await;
        let diagram = match spec {
            Ok(spec) => {
                let renderer =
                    RscriptRenderer::new(&cli.rscript, Duration::from_secs(cli.diagram_timeout));
                generate_diagram(&spec, &renderer, &config).await
            }
            Err(e) => Err(e),
        };
        if let Err(ref e) = diagram {
            tracing::warn!("Diagram generation failed: {}", e);
        }
        blocks.extend(display::diagram_blocks(&diagram));
    }
    if let Some(ref p) = progress {
        p.finish();
    }
    blocks.extend(display::closing_blocks());

    // ── Files ────────────────────────────────────────────────────────────
    if let Some(ref path) = cli.chart {
        match chart_svg(&blocks) {
            Some(svg) => {
                write_output(path, svg.as_bytes())
                    .await
                    .context("Failed to write chart")?;
                report_written(&cli, "chart", path);
            }
            None => {
                if !cli.quiet {
                    eprintln!(
                        "{} No chart written: no drawable fit indices were found",
                        yellow("⚠")
                    );
                }
            }
        }
    }
    if let Some(ref path) = cli.markdown {
        write_output(path, display::render_markdown(&blocks).as_bytes())
            .await
            .context("Failed to write Markdown report")?;
        report_written(&cli, "Markdown report", path);
    }
    if let Some(ref path) = cli.html {
        write_output(path, display::render_html(&blocks).as_bytes())
            .await
            .context("Failed to write HTML report")?;
        report_written(&cli, "HTML report", path);
    }

    // ── Stdout ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(display::render_terminal(&blocks).as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<AnalysisConfig> {
    let anchoring = if cli.word_boundary {
        LabelAnchoring::WordBoundary
    } else {
        LabelAnchoring::Prefix
    };

    let mut builder = AnalysisConfig::builder()
        .anchoring(anchoring)
        .span_lines(cli.span_lines)
        .preview_chars(cli.preview_chars)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb as ProgressCallback);
    }

    builder.build().context("Invalid configuration")
}

async fn diagram_spec(cli: &Cli) -> Result<DiagramSpec, DiagramError> {
    let mut spec = DiagramSpec::default().with_output_path(&cli.diagram_output);
    if let Some(ref path) = cli.model_file {
        spec = spec.with_model(tokio::fs::read_to_string(path).await?);
    }
    Ok(spec)
}

fn chart_svg(blocks: &[DisplayBlock]) -> Option<&str> {
    blocks.iter().find_map(|b| match b {
        DisplayBlock::Chart { svg, .. } => Some(svg.as_str()),
        _ => None,
    })
}

fn report_written(cli: &Cli, what: &str, path: &std::path::Path) {
    if !cli.quiet {
        eprintln!("{} Wrote {} → {}", green("✔"), what, bold(&path.display().to_string()));
    }
}

fn print_summary(output: &AnalysisOutput) {
    let stats = &output.stats;
    eprintln!(
        "{}  {}/{} indices  {} pages  {}ms",
        if output.is_empty_result() {
            yellow("⚠")
        } else {
            green("✔")
        },
        stats.indices_found,
        semfit::FitIndexName::COUNT,
        stats.page_count,
        stats.total_duration_ms,
    );
    for failure in &output.parse_failures {
        eprintln!("   {} {}", yellow("·"), dim(&failure.to_string()));
    }
}
