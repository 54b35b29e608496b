//! Path-diagram generation through an external modeling tool.
//!
//! The diagram is independent of the uploaded document: a fixed model
//! ([`DiagramSpec::model`]) is fitted to a synthetic covariance matrix and
//! drawn to [`DiagramSpec::output_path`], which is overwritten on every run.
//!
//! The tool sits behind [`DiagramRenderer`]. [`RscriptRenderer`] writes the
//! script to a temp file and runs `Rscript` on it; tests substitute a stub that
//! writes a PNG directly. Whatever the renderer reports, the output is only
//! accepted if the expected file exists and decodes as an image.

use crate::error::DiagramError;
use crate::model_script::{r_string_literal, DEFAULT_MODEL, R_SCRIPT_TEMPLATE};
use crate::output::DiagramOutput;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything the diagram step needs. None of it comes from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    /// lavaan model syntax.
    pub model: String,
    /// Where the PNG is written. Default: `sem_diagram.png`.
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Rows of synthetic data behind the covariance matrix. Default: 200.
    pub sample_nobs: u32,
    /// semPlot layout name. Default: "tree".
    pub layout: String,
    pub edge_label_cex: f32,
}

impl Default for DiagramSpec {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            output_path: PathBuf::from("sem_diagram.png"),
            width: 800,
            height: 600,
            sample_nobs: 200,
            layout: "tree".to_string(),
            edge_label_cex: 1.2,
        }
    }
}

impl DiagramSpec {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Render [`R_SCRIPT_TEMPLATE`] for this spec.
    pub fn script(&self) -> String {
        R_SCRIPT_TEMPLATE
            .replace("{model}", &r_string_literal(&self.model))
            .replace(
                "{output}",
                &r_string_literal(&self.output_path.to_string_lossy()),
            )
            .replace("{nobs}", &self.sample_nobs.to_string())
            .replace("{width}", &self.width.to_string())
            .replace("{height}", &self.height.to_string())
            .replace("{layout}", &r_string_literal(&self.layout))
            .replace("{edge_label_cex}", &self.edge_label_cex.to_string())
    }
}

/// Runs a diagram script. Success only means the tool reported success;
/// the caller still checks for the output file.
pub trait DiagramRenderer: Send + Sync {
    fn render<'a>(
        &'a self,
        script: &'a str,
        spec: &'a DiagramSpec,
    ) -> BoxFuture<'a, Result<(), DiagramError>>;
}

/// Runs the script with R's `Rscript` in a child process.
#[derive(Debug, Clone)]
pub struct RscriptRenderer {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for RscriptRenderer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("Rscript"),
            timeout: Duration::from_secs(120),
        }
    }
}

impl RscriptRenderer {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn run(&self, script: &str) -> Result<(), DiagramError> {
        let mut file = tempfile::Builder::new()
            .prefix("semfit-diagram-")
            .suffix(".R")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;

        let program = self.program.to_string_lossy().to_string();
        debug!("Running {} {}", program, file.path().display());

        let child = tokio::process::Command::new(&self.program)
            .arg("--vanilla")
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DiagramError::RendererNotFound {
                        program: program.clone(),
                    }
                } else {
                    DiagramError::Io(e)
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DiagramError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiagramError::ScriptFailed {
                status: output.status.to_string(),
                stderr: tail(&stderr, 20),
            });
        }
        Ok(())
    }
}

impl DiagramRenderer for RscriptRenderer {
    fn render<'a>(
        &'a self,
        script: &'a str,
        _spec: &'a DiagramSpec,
    ) -> BoxFuture<'a, Result<(), DiagramError>> {
        Box::pin(self.run(script))
    }
}

/// Generate the path diagram and load the resulting image.
///
/// Any stale image at the output path is removed first, so an image that is
/// present afterwards was produced by this run.
pub async fn generate(
    spec: &DiagramSpec,
    renderer: &dyn DiagramRenderer,
) -> Result<DiagramOutput, DiagramError> {
    let start = Instant::now();
    remove_stale(&spec.output_path).await?;

    let script = spec.script();
    renderer.render(&script, spec).await?;

    let png = match tokio::fs::read(&spec.output_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DiagramError::OutputMissing {
                path: spec.output_path.clone(),
            });
        }
        Err(e) => return Err(DiagramError::Io(e)),
    };

    let img = image::load_from_memory(&png).map_err(|e| DiagramError::InvalidImage {
        path: spec.output_path.clone(),
        detail: e.to_string(),
    })?;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Diagram written to {} ({}x{} px, {}ms)",
        spec.output_path.display(),
        img.width(),
        img.height(),
        duration_ms
    );

    Ok(DiagramOutput {
        path: spec.output_path.clone(),
        width: img.width(),
        height: img.height(),
        png,
        duration_ms,
    })
}

async fn remove_stale(path: &Path) -> Result<(), DiagramError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed previous diagram at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!("Could not remove previous diagram {}: {}", path.display(), e);
            Err(DiagramError::Io(e))
        }
    }
}

/// Last `n` lines of `s`.
fn tail(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
