//! Bar chart of the present fit indices, rendered to SVG with Plotters.
//!
//! The chart is a plain value: [`BarChart::from_report`] computes the bars and
//! [`BarChart::render_svg`] draws them into a fresh string. No drawing state is
//! shared between calls.
//!
//! Plotters is built without default features, so no system font stack is
//! needed; the SVG backend emits `<text>` elements and leaves glyphs to the
//! viewer.

use crate::config::ChartStyle;
use crate::error::SemFitError;
use crate::fit_index::{FitIndexName, FitIndexReport};
use plotters::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub index: FitIndexName,
    pub value: f64,
}

/// One bar per present index, in report order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Build a chart from the present entries of `report`.
    ///
    /// Returns `None` when nothing is present; the caller shows a
    /// "no data" notice instead.
    pub fn from_report(report: &FitIndexReport, style: &ChartStyle) -> Option<Self> {
        let bars: Vec<Bar> = report
            .present()
            .map(|(index, value)| Bar { index, value })
            .collect();
        if bars.is_empty() {
            return None;
        }
        Some(Self {
            title: style.title.clone(),
            y_label: style.y_label.clone(),
            bars,
        })
    }

    /// Bars that can be placed on a linear axis. Infinite values stay in
    /// the report and the table but are not drawn.
    pub fn drawable(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.bars.iter().filter(|b| b.value.is_finite())
    }

    /// Vertical range covering every drawable bar and zero, with headroom.
    ///
    /// `None` when no bar is drawable or the range itself does not fit in an
    /// `f64`.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut values = self.drawable().map(|b| b.value).peekable();
        values.peek()?;
        let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

        // Halved so the difference cannot overflow; 0.2 * span/2 == 10% of span.
        let half_span = max / 2.0 - min / 2.0;
        if half_span == 0.0 {
            return Some((0.0, 1.0));
        }
        let pad = half_span * 0.2;
        let lo = if min < 0.0 { min - pad } else { 0.0 };
        let hi = if max > 0.0 { max + pad } else { pad };
        (lo.is_finite() && hi.is_finite() && (hi - lo).is_finite()).then_some((lo, hi))
    }

    /// Draw the chart as a standalone SVG document.
    ///
    /// # Errors
    /// [`SemFitError::ChartRenderFailed`] when [`BarChart::y_range`] is `None`;
    /// plotters is never called with a non-finite axis.
    pub fn render_svg(&self, style: &ChartStyle) -> Result<String, SemFitError> {
        let (y0, y1) = self.y_range().ok_or_else(|| {
            SemFitError::ChartRenderFailed(
                "values are too large to share one axis or not finite".to_string(),
            )
        })?;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (style.width, style.height))
                .into_drawing_area();
            self.draw(&root, style, y0..y1)
                .map_err(|e| SemFitError::ChartRenderFailed(e.to_string()))?;
            root.present()
                .map_err(|e| SemFitError::ChartRenderFailed(e.to_string()))?;
        }
        Ok(svg)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, plotters::coord::Shift>,
        style: &ChartStyle,
        y: std::ops::Range<f64>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let n = self.bars.len();
        let labels: Vec<&'static str> = self.bars.iter().map(|b| b.index.label()).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(52)
            .build_cartesian_2d((0usize..n).into_segmented(), y)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).copied().unwrap_or("").to_string()
                }
                SegmentValue::Last => String::new(),
            })
            .y_desc(self.y_label.as_str())
            .draw()?;

        let (r, g, b) = style.color;
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(RGBColor(r, g, b).filled())
                .margin(8)
                .data(
                    self.bars
                        .iter()
                        .enumerate()
                        .filter(|(_, bar)| bar.value.is_finite())
                        .map(|(i, bar)| (i, bar.value)),
                ),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FitIndexReport {
        FitIndexReport::from_pairs([
            (FitIndexName::Cfi, Some(0.97)),
            (FitIndexName::Rmsea, Some(0.045)),
            (FitIndexName::Srmr, Some(0.031)),
        ])
    }

    #[test]
    fn empty_report_produces_no_chart() {
        let chart = BarChart::from_report(&FitIndexReport::default(), &ChartStyle::default());
        assert!(chart.is_none());
    }

    #[test]
    fn one_bar_per_present_index() {
        let chart = BarChart::from_report(&report(), &ChartStyle::default()).unwrap();
        assert_eq!(chart.bars.len(), 3);
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.index.label()).collect();
        assert_eq!(labels, vec!["CFI", "RMSEA", "SRMR"]);
        assert_eq!(chart.bars[1].value, 0.045);
        assert_eq!(chart.title, "SEM Fit Indices");
        assert_eq!(chart.y_label, "Value");
    }

    #[test]
    fn y_range_includes_zero_and_negatives() {
        let chart = BarChart::from_report(&report(), &ChartStyle::default()).unwrap();
        let (lo, hi) = chart.y_range().unwrap();
        assert_eq!(lo, 0.0);
        assert!(hi > 0.97);

        let neg = FitIndexReport::from_pairs([(FitIndexName::Mfi, Some(-0.5))]);
        let chart = BarChart::from_report(&neg, &ChartStyle::default()).unwrap();
        let (lo, hi) = chart.y_range().unwrap();
        assert!(lo < -0.5);
        assert!(hi > 0.0);
    }

    #[test]
    fn svg_contains_labels() {
        let style = ChartStyle::default();
        let chart = BarChart::from_report(&report(), &style).unwrap();
        let svg = chart.render_svg(&style).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("SEM Fit Indices"));
        assert!(svg.contains("CFI"));
        assert!(svg.contains("SRMR"));
    }

    #[test]
    fn repeated_renders_are_identical() {
        let style = ChartStyle::default();
        let chart = BarChart::from_report(&report(), &style).unwrap();
        assert_eq!(chart.render_svg(&style).unwrap(), chart.render_svg(&style).unwrap());
    }

    #[test]
    fn all_zero_values_get_unit_range() {
        let zeros = FitIndexReport::from_pairs([
            (FitIndexName::Cfi, Some(0.0)),
            (FitIndexName::Tli, Some(0.0)),
        ]);
        let chart = BarChart::from_report(&zeros, &ChartStyle::default()).unwrap();
        assert_eq!(chart.y_range(), Some((0.0, 1.0)));
        assert!(chart.render_svg(&ChartStyle::default()).is_ok());
    }

    #[test]
    fn infinite_value_is_kept_but_not_drawn() {
        let report = crate::extract_fit_indices("CFI 0.95\nECVI 1e999");
        assert_eq!(report.get(FitIndexName::Ecvi), Some(f64::INFINITY));

        let style = ChartStyle::default();
        let chart = BarChart::from_report(&report, &style).unwrap();
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.drawable().count(), 1);

        let (lo, hi) = chart.y_range().unwrap();
        assert!(lo.is_finite() && hi.is_finite());
        assert!(hi > 0.95 && hi < 2.0);

        let svg = chart.render_svg(&style).unwrap();
        assert!(svg.contains("ECVI"));
    }

    #[test]
    fn only_infinite_values_cannot_be_drawn() {
        let report = FitIndexReport::from_pairs([(FitIndexName::Ecvi, Some(f64::INFINITY))]);
        let chart = BarChart::from_report(&report, &ChartStyle::default()).unwrap();
        assert_eq!(chart.y_range(), None);
        let err = chart.render_svg(&ChartStyle::default()).unwrap_err();
        assert!(matches!(err, SemFitError::ChartRenderFailed(_)));
    }

    #[test]
    fn opposite_extremes_are_refused_before_drawing() {
        let report = crate::extract_fit_indices("CFI 1e308\nMFI -1e308");
        assert_eq!(report.get(FitIndexName::Cfi), Some(1e308));
        assert_eq!(report.get(FitIndexName::Mfi), Some(-1e308));

        let chart = BarChart::from_report(&report, &ChartStyle::default()).unwrap();
        assert_eq!(chart.y_range(), None);
        assert!(matches!(
            chart.render_svg(&ChartStyle::default()),
            Err(SemFitError::ChartRenderFailed(_))
        ));
    }

    #[test]
    fn single_extreme_value_has_finite_range() {
        let report = FitIndexReport::from_pairs([(FitIndexName::Cfi, Some(1e308))]);
        let chart = BarChart::from_report(&report, &ChartStyle::default()).unwrap();
        let (lo, hi) = chart.y_range().unwrap();
        assert_eq!(lo, 0.0);
        assert!(hi.is_finite() && hi > 1e308);
    }
}
