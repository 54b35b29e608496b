//! The display surface: an ordered list of blocks, rendered to a terminal,
//! to Markdown or to a self-contained HTML page.
//!
//! The shell builds blocks in this order for each document: title, intro,
//! text preview, fit-index table, then either the chart or a "no indices"
//! warning. On request a diagram section follows, holding the image or a
//! warning if the modeling tool failed. A closing tip ends the page.

use crate::config::ChartStyle;
use crate::error::DiagramError;
use crate::output::{AnalysisOutput, DiagramOutput};
use crate::pipeline::chart::BarChart;
use crate::pipeline::encode;
use crate::pipeline::table::FitTable;
use std::path::PathBuf;
use tracing::warn;

pub const TITLE: &str = "Structural Equation Modeling (SEM) Results Visualization";

pub const INTRO: &str = "Extracts fit indices from SEM analysis results (PDF) and visualises \
them as a table and a bar chart. An SEM path diagram can also be generated with R's lavaan \
and semPlot.";

pub const NO_INDICES_WARNING: &str =
    "No fit indices were found in the PDF. Please check the formatting.";

pub const TIP: &str = "Tip: make sure the PDF contains numerical fit indices as text, not as images.";

/// One rendered unit of output.
#[derive(Debug, Clone)]
pub enum DisplayBlock {
    Title(String),
    Heading(String),
    Paragraph(String),
    /// Verbatim text, shown in a preformatted box.
    TextPreview(String),
    Table(FitTable),
    Chart { chart: BarChart, svg: String },
    Warning(String),
    Image {
        path: PathBuf,
        png: Vec<u8>,
        caption: String,
    },
}

/// Blocks for one analysed document.
///
/// A chart that cannot be drawn becomes a warning; the table still shows
/// every value.
pub fn document_blocks(output: &AnalysisOutput, style: &ChartStyle) -> Vec<DisplayBlock> {
    let mut blocks = vec![
        DisplayBlock::Title(TITLE.to_string()),
        DisplayBlock::Paragraph(INTRO.to_string()),
        DisplayBlock::Heading("Extracted Text Preview".to_string()),
        DisplayBlock::TextPreview(output.preview.clone()),
        DisplayBlock::Heading("Extracted Fit Indices".to_string()),
        DisplayBlock::Table(output.table()),
    ];

    match output.chart {
        Some(ref chart) => {
            blocks.push(DisplayBlock::Heading("Fit Indices Bar Chart".to_string()));
            blocks.push(chart_block(chart, style));
        }
        None => blocks.push(DisplayBlock::Warning(NO_INDICES_WARNING.to_string())),
    }

    blocks
}

fn chart_block(chart: &BarChart, style: &ChartStyle) -> DisplayBlock {
    match chart.render_svg(style) {
        Ok(svg) => DisplayBlock::Chart {
            chart: chart.clone(),
            svg,
        },
        Err(e) => {
            warn!("Chart skipped: {}", e);
            DisplayBlock::Warning(format!("Could not draw the bar chart: {e}"))
        }
    }
}

/// Blocks for the diagram section: the image, or a warning on failure.
pub fn diagram_blocks(result: &Result<DiagramOutput, DiagramError>) -> Vec<DisplayBlock> {
    let body = match result {
        Ok(diagram) => DisplayBlock::Image {
            path: diagram.path.clone(),
            png: diagram.png.clone(),
            caption: "SEM Path Diagram".to_string(),
        },
        Err(e) => DisplayBlock::Warning(format!("Could not display the path diagram: {e}")),
    };
    vec![
        DisplayBlock::Heading("Generate SEM Path Diagram".to_string()),
        body,
    ]
}

pub fn closing_blocks() -> Vec<DisplayBlock> {
    vec![DisplayBlock::Paragraph(TIP.to_string())]
}

// ── Terminal ─────────────────────────────────────────────────────────────

const BAR_WIDTH: usize = 40;

/// Plain-text rendering; charts become horizontal text bars.
pub fn render_terminal(blocks: &[DisplayBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            DisplayBlock::Title(t) => {
                out.push_str(t);
                out.push('\n');
                out.push_str(&"=".repeat(t.chars().count()));
                out.push_str("\n\n");
            }
            DisplayBlock::Heading(h) => {
                out.push_str(h);
                out.push('\n');
                out.push_str(&"-".repeat(h.chars().count()));
                out.push_str("\n\n");
            }
            DisplayBlock::Paragraph(p) => {
                out.push_str(p);
                out.push_str("\n\n");
            }
            DisplayBlock::TextPreview(text) => {
                for line in text.lines() {
                    out.push_str("  │ ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
            }
            DisplayBlock::Table(table) => {
                out.push_str(&table.render_text());
                out.push('\n');
            }
            DisplayBlock::Chart { chart, .. } => {
                out.push_str(&text_bars(chart));
                out.push('\n');
            }
            DisplayBlock::Warning(w) => {
                out.push_str("⚠ ");
                out.push_str(w);
                out.push_str("\n\n");
            }
            DisplayBlock::Image { path, caption, .. } => {
                out.push_str(&format!("{caption}: {}\n\n", path.display()));
            }
        }
    }
    out
}

fn text_bars(chart: &BarChart) -> String {
    let label_w = chart
        .bars
        .iter()
        .map(|b| b.index.label().len())
        .max()
        .unwrap_or(0);
    let max_abs = chart
        .drawable()
        .map(|b| b.value.abs())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for bar in &chart.bars {
        let len = if bar.value.is_finite() && max_abs > 0.0 {
            ((bar.value.abs() / max_abs) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let fill = if bar.value < 0.0 { "░" } else { "█" };
        out.push_str(&format!(
            "{:<label_w$}  {:<BAR_WIDTH$}  {}\n",
            bar.index.label(),
            fill.repeat(len),
            bar.value
        ));
    }
    out
}

// ── Markdown ─────────────────────────────────────────────────────────────

/// GitHub-flavoured Markdown. The chart is embedded as an SVG data URI; the
/// diagram is linked by path.
pub fn render_markdown(blocks: &[DisplayBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            DisplayBlock::Title(t) => out.push_str(&format!("# {t}\n\n")),
            DisplayBlock::Heading(h) => out.push_str(&format!("## {h}\n\n")),
            DisplayBlock::Paragraph(p) => out.push_str(&format!("{p}\n\n")),
            DisplayBlock::TextPreview(text) => {
                let fence = if text.contains("```") { "````" } else { "```" };
                out.push_str(&format!("{fence}text\n{}\n{fence}\n\n", text.trim_end()));
            }
            DisplayBlock::Table(table) => {
                out.push_str(&table.render_markdown());
                out.push('\n');
            }
            DisplayBlock::Chart { chart, svg } => out.push_str(&format!(
                "![{}]({})\n\n",
                chart.title,
                encode::svg_data_uri(svg)
            )),
            DisplayBlock::Warning(w) => out.push_str(&format!("> **Warning:** {w}\n\n")),
            DisplayBlock::Image { path, caption, .. } => {
                out.push_str(&format!("![{caption}]({})\n\n", path.display()))
            }
        }
    }
    out
}

// ── HTML ─────────────────────────────────────────────────────────────────

/// Self-contained HTML page; images are embedded as data URIs.
pub fn render_html(blocks: &[DisplayBlock]) -> String {
    let title = blocks
        .iter()
        .find_map(|b| match b {
            DisplayBlock::Title(t) => Some(t.as_str()),
            _ => None,
        })
        .unwrap_or(TITLE);

    let mut body = String::new();
    for block in blocks {
        match block {
            DisplayBlock::Title(t) => body.push_str(&format!("<h1>{}</h1>\n", escape_html(t))),
            DisplayBlock::Heading(h) => body.push_str(&format!("<h2>{}</h2>\n", escape_html(h))),
            DisplayBlock::Paragraph(p) => body.push_str(&format!("<p>{}</p>\n", escape_html(p))),
            DisplayBlock::TextPreview(text) => {
                body.push_str(&format!("<pre class=\"preview\">{}</pre>\n", escape_html(text)))
            }
            DisplayBlock::Table(table) => body.push_str(&html_table(table)),
            DisplayBlock::Chart { chart, svg } => body.push_str(&format!(
                "<figure><img alt=\"{}\" src=\"{}\"></figure>\n",
                escape_html(&chart.title),
                encode::svg_data_uri(svg)
            )),
            DisplayBlock::Warning(w) => {
                body.push_str(&format!("<p class=\"warning\">{}</p>\n", escape_html(w)))
            }
            DisplayBlock::Image { png, caption, .. } => match encode::png_data_uri(png) {
                Ok(uri) => body.push_str(&format!(
                    "<figure><img alt=\"{0}\" src=\"{1}\"><figcaption>{0}</figcaption></figure>\n",
                    escape_html(caption),
                    uri
                )),
                Err(e) => {
                    warn!("Skipping image '{}': {}", caption, e);
                    body.push_str(&format!(
                        "<p class=\"warning\">Could not embed {}: {}</p>\n",
                        escape_html(caption),
                        escape_html(&e.to_string())
                    ));
                }
            },
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        HTML_STYLE,
        body
    )
}

const HTML_STYLE: &str = "body{font-family:sans-serif;max-width:56rem;margin:2rem auto;padding:0 1rem}\
pre.preview{background:#f6f8fa;padding:1rem;max-height:24rem;overflow:auto;white-space:pre-wrap}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .75rem}\
td.value{text-align:right}p.warning{background:#fff4e5;border-left:4px solid #f0a020;padding:.5rem 1rem}\
figure img{max-width:100%}";

fn html_table(table: &FitTable) -> String {
    let mut out = format!(
        "<table>\n<thead><tr><th>{}</th><th>{}</th></tr></thead>\n<tbody>\n",
        FitTable::HEADERS[0],
        FitTable::HEADERS[1]
    );
    for row in &table.rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"value\">{}</td></tr>\n",
            row.index,
            escape_html(&row.value_cell())
        ));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::analyze::analyze_text;

    fn output(text: &str) -> AnalysisOutput {
        analyze_text(text.to_string(), &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn blocks_with_indices_end_in_chart() {
        let out = output("CFI = 0.97, RMSEA = 0.045");
        let blocks = document_blocks(&out, &ChartStyle::default());
        assert!(matches!(blocks[0], DisplayBlock::Title(_)));
        assert!(matches!(blocks[3], DisplayBlock::TextPreview(_)));
        assert!(matches!(blocks[5], DisplayBlock::Table(_)));
        match blocks.last().unwrap() {
            DisplayBlock::Chart { chart, svg } => {
                assert_eq!(chart.bars.len(), 2);
                assert!(svg.contains("RMSEA"));
            }
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn blocks_without_indices_end_in_warning() {
        let out = output("no statistics in this document");
        let blocks = document_blocks(&out, &ChartStyle::default());
        assert!(!blocks.iter().any(|b| matches!(b, DisplayBlock::Chart { .. })));
        match blocks.last().unwrap() {
            DisplayBlock::Warning(w) => assert_eq!(w, NO_INDICES_WARNING),
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn diagram_failure_becomes_warning() {
        let result = Err(DiagramError::Timeout { secs: 5 });
        let blocks = diagram_blocks(&result);
        assert_eq!(blocks.len(), 2);
        match &blocks[1] {
            DisplayBlock::Warning(w) => assert!(w.contains("timed out")),
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn terminal_rendering() {
        let out = output("CFI = 0.97\nSRMR = 0.031");
        let mut blocks = document_blocks(&out, &ChartStyle::default());
        blocks.extend(closing_blocks());
        let text = render_terminal(&blocks);
        assert!(text.starts_with(TITLE));
        assert!(text.contains("  │ CFI = 0.97"));
        assert!(text.contains(&"█".repeat(BAR_WIDTH)));
        assert!(text.trim_end().ends_with(TIP));
    }

    #[test]
    fn html_rendering_escapes_preview() {
        let out = output("CFI <0.97> & more");
        let blocks = document_blocks(&out, &ChartStyle::default());
        let html = render_html(&blocks);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("CFI &lt;0.97&gt; &amp; more"));
        assert!(html.contains("<td>CFI</td><td class=\"value\">0.97</td>"));
        assert!(html.contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn html_rendering_reports_bad_image() {
        let blocks = vec![DisplayBlock::Image {
            path: PathBuf::from("sem_diagram.png"),
            png: b"nope".to_vec(),
            caption: "SEM Path Diagram".to_string(),
        }];
        let html = render_html(&blocks);
        assert!(html.contains("Could not embed SEM Path Diagram"));
    }

    #[test]
    fn undrawable_chart_becomes_warning() {
        let out = output("CFI 1e308\nMFI -1e308");
        assert_eq!(out.stats.indices_found, 2);
        let blocks = document_blocks(&out, &ChartStyle::default());
        assert!(!blocks.iter().any(|b| matches!(b, DisplayBlock::Chart { .. })));
        match blocks.last().unwrap() {
            DisplayBlock::Warning(w) => assert!(w.starts_with("Could not draw the bar chart")),
            other => panic!("expected warning, got {other:?}"),
        }
        let text = render_terminal(&blocks);
        assert!(text.contains("100000000000000000000"));
    }

    #[test]
    fn infinite_value_has_no_text_bar() {
        let out = output("CFI 0.95\nECVI 1e999");
        let blocks = document_blocks(&out, &ChartStyle::default());
        let chart = match blocks.last().unwrap() {
            DisplayBlock::Chart { chart, .. } => chart,
            other => panic!("expected chart, got {other:?}"),
        };
        let bars = text_bars(chart);
        let lines: Vec<&str> = bars.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&"█".repeat(BAR_WIDTH)));
        assert!(lines[1].starts_with("ECVI"));
        assert!(!lines[1].contains('█'));
        assert!(lines[1].trim_end().ends_with("inf"));
    }

    #[test]
    fn markdown_rendering() {
        let out = output("CFI = 0.97");
        let mut blocks = document_blocks(&out, &ChartStyle::default());
        blocks.extend(diagram_blocks(&Err(DiagramError::Timeout { secs: 5 })));
        let md = render_markdown(&blocks);
        assert!(md.starts_with(&format!("# {TITLE}\n")));
        assert!(md.contains("```text\nCFI = 0.97\n```"));
        assert!(md.contains("| --- | ---: |"));
        assert!(md.contains("![SEM Fit Indices](data:image/svg+xml;base64,"));
        assert!(md.contains("> **Warning:** Could not display the path diagram"));
    }
}
