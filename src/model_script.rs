//! Model text and R script template for the path-diagram step.
//!
//! The diagram is drawn by R (`lavaan` + `semPlot`). Keeping the script here
//! as data means the model can be swapped through
//! [`crate::pipeline::diagram::DiagramSpec::model`] and the rendered script
//! can be inspected in tests without running R.

/// Five-factor measurement model drawn by default: 25 indicators, five each.
pub const DEFAULT_MODEL: &str = "\
CM  =~ DIDS_1 + DIDS_2 + DIDS_3 + DIDS_4 + DIDS_5
EiB =~ DIDS_6 + DIDS_7 + DIDS_8 + DIDS_9 + DIDS_10
RE  =~ DIDS_11 + DIDS_12 + DIDS_13 + DIDS_14 + DIDS_15
IwC =~ DIDS_16 + DIDS_17 + DIDS_18 + DIDS_19 + DIDS_20
EiD =~ DIDS_21 + DIDS_22 + DIDS_23 + DIDS_24 + DIDS_25";

/// R script run by the diagram renderer.
///
/// The covariance matrix is synthetic: random normal data for the model's
/// observed variables, so the fit is only there to give `semPaths` something
/// to draw. Placeholders: `{model}`, `{output}`, `{nobs}`, `{width}`,
/// `{height}`, `{layout}`, `{edge_label_cex}`. `{model}`, `{output}` and
/// `{layout}` are substituted as quoted R string literals.
pub const R_SCRIPT_TEMPLATE: &str = r#"suppressPackageStartupMessages({
  library(lavaan)
  library(semPlot)
})

model <- {model}

observed <- lavNames(lavaanify(model), type = "ov")
raw <- matrix(rnorm({nobs} * length(observed)), nrow = {nobs})
sample_cov <- cov(raw)
dimnames(sample_cov) <- list(observed, observed)

fit <- cfa(model, sample.cov = sample_cov, sample.nobs = {nobs})

png({output}, width = {width}, height = {height})
semPaths(fit, what = "std", edge.label.cex = {edge_label_cex}, layout = {layout})
invisible(dev.off())
"#;

/// Quote `s` as a double-quoted R string literal.
pub fn r_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_has_five_factors() {
        assert_eq!(DEFAULT_MODEL.lines().count(), 5);
        assert!(DEFAULT_MODEL.lines().all(|l| l.contains("=~")));
        assert!(DEFAULT_MODEL.contains("DIDS_25"));
    }

    #[test]
    fn template_has_every_placeholder() {
        for p in [
            "{model}",
            "{output}",
            "{nobs}",
            "{width}",
            "{height}",
            "{layout}",
            "{edge_label_cex}",
        ] {
            assert!(R_SCRIPT_TEMPLATE.contains(p), "missing {p}");
        }
    }

    #[test]
    fn r_literal_escapes() {
        assert_eq!(r_string_literal("a.png"), "\"a.png\"");
        assert_eq!(r_string_literal("C:\\out\\d.png"), "\"C:\\\\out\\\\d.png\"");
        assert_eq!(r_string_literal("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }
}
