//! Fit-index extraction: label → first numeric-looking run after it.
//!
//! For every [`FitIndexName`], independently and always from the start of the
//! text, the extractor searches for
//!
//! ```text
//! LABEL .*? ([0-9.Ee-]+)
//! ```
//!
//! i.e. the first occurrence of the label that has a run of ASCII digits, `.`,
//! `E`, `e` or `-` somewhere after it (by default on the same line), taking
//! the shortest gap. The captured run is parsed as `f64`. A run that does not
//! parse (a lone `-`, `.`, or the `e` of a following word) makes that one
//! index absent and is reported as an [`IndexParseFailure`].
//!
//! ## Known imprecision
//!
//! Labels are literal and case-sensitive. Under [`LabelAnchoring::Prefix`]
//! (the default) "NFI" also matches the tail of "NNFI" or "PNFI", so the
//! first of those in the text wins. [`LabelAnchoring::WordBoundary`] requires
//! the label to be a whole word.

use crate::config::{ExtractionOptions, LabelAnchoring};
use crate::error::{IndexParseFailure, SemFitError};
use crate::fit_index::{FitIndexName, FitIndexReport};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// The numeric character class that follows a label.
/// ASCII digits only: `str::parse::<f64>` rejects other decimal digits.
const NUMERIC_RUN: &str = r"([0-9.Ee\-]+)";

static DEFAULT_EXTRACTOR: Lazy<FitIndexExtractor> = Lazy::new(|| {
    FitIndexExtractor::new(ExtractionOptions::default())
        .expect("default fit-index patterns are valid regexes")
});

/// Extract every fit index from `text` with the default options.
pub fn extract_fit_indices(text: &str) -> FitIndexReport {
    DEFAULT_EXTRACTOR.extract(text)
}

/// Compiled patterns for all known indices.
#[derive(Debug, Clone)]
pub struct FitIndexExtractor {
    options: ExtractionOptions,
    patterns: Vec<(FitIndexName, Regex)>,
}

impl FitIndexExtractor {
    pub fn new(options: ExtractionOptions) -> Result<Self, SemFitError> {
        let patterns = FitIndexName::ALL
            .iter()
            .map(|&name| {
                let pattern = build_pattern(name, options);
                Regex::new(&pattern)
                    .map(|re| (name, re))
                    .map_err(|e| SemFitError::InvalidConfig(format!("pattern for {name}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { options, patterns })
    }

    pub fn options(&self) -> ExtractionOptions {
        self.options
    }

    /// Extract a report, discarding parse diagnostics.
    pub fn extract(&self, text: &str) -> FitIndexReport {
        self.extract_with_diagnostics(text).0
    }

    /// Extract a report plus one [`IndexParseFailure`] per index whose
    /// numeric-looking token did not parse.
    pub fn extract_with_diagnostics(&self, text: &str) -> (FitIndexReport, Vec<IndexParseFailure>) {
        let mut failures = Vec::new();
        let pairs: Vec<(FitIndexName, Option<f64>)> = self
            .patterns
            .iter()
            .map(|(name, re)| {
                let Some(caps) = re.captures(text) else {
                    return (*name, None);
                };
                let token = &caps[1];
                match token.parse::<f64>() {
                    Ok(v) => {
                        debug!("{name}: matched {token:?} → {v}");
                        (*name, Some(v))
                    }
                    Err(_) => {
                        warn!("{name}: token {token:?} is not a number; treating as absent");
                        failures.push(IndexParseFailure {
                            index: *name,
                            token: token.to_string(),
                        });
                        (*name, None)
                    }
                }
            })
            .collect();

        (FitIndexReport::from_pairs(pairs), failures)
    }
}

fn build_pattern(name: FitIndexName, options: ExtractionOptions) -> String {
    let label = regex::escape(name.label());
    let label = match options.anchoring {
        LabelAnchoring::Prefix => label,
        LabelAnchoring::WordBoundary => format!(r"\b{label}\b"),
    };
    let flags = if options.span_lines { "(?s)" } else { "" };
    format!("{flags}{label}.*?{NUMERIC_RUN}")
}
