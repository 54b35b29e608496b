//! Tabular presentation of a [`FitIndexReport`]: one row per index.

use crate::fit_index::{FitIndexName, FitIndexReport};
use serde::Serialize;

/// Shown in the value column when an index is absent.
pub const MISSING_MARKER: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitTableRow {
    pub index: FitIndexName,
    pub value: Option<f64>,
}

impl FitTableRow {
    pub fn value_cell(&self) -> String {
        match self.value {
            Some(v) => v.to_string(),
            None => MISSING_MARKER.to_string(),
        }
    }
}

/// Two-column table (`Index`, `Value`) in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitTable {
    pub rows: Vec<FitTableRow>,
}

impl FitTable {
    pub const HEADERS: [&'static str; 2] = ["Index", "Value"];

    pub fn from_report(report: &FitIndexReport) -> Self {
        let rows = report
            .iter()
            .map(|(index, value)| FitTableRow { index, value })
            .collect();
        Self { rows }
    }

    /// Fixed-width plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let cells: Vec<(String, String)> = self
            .rows
            .iter()
            .map(|r| (r.index.label().to_string(), r.value_cell()))
            .collect();
        let name_w = cells
            .iter()
            .map(|(n, _)| n.len())
            .chain(std::iter::once(Self::HEADERS[0].len()))
            .max()
            .unwrap_or(0);
        let value_w = cells
            .iter()
            .map(|(_, v)| v.len())
            .chain(std::iter::once(Self::HEADERS[1].len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&format!(
            "{:<name_w$}  {:>value_w$}\n",
            Self::HEADERS[0],
            Self::HEADERS[1]
        ));
        out.push_str(&format!("{}  {}\n", "-".repeat(name_w), "-".repeat(value_w)));
        for (name, value) in &cells {
            out.push_str(&format!("{:<name_w$}  {:>value_w$}\n", name, value));
        }
        out
    }

    /// GFM pipe table.
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("| Index | Value |\n| --- | ---: |\n");
        for row in &self.rows {
            out.push_str(&format!("| {} | {} |\n", row.index, row.value_cell()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FitTable {
        FitTable::from_report(&FitIndexReport::from_pairs([
            (FitIndexName::Cfi, Some(0.97)),
            (FitIndexName::Rmsea, Some(0.045)),
        ]))
    }

    #[test]
    fn one_row_per_index_in_order() {
        let table = sample();
        assert_eq!(table.rows.len(), 13);
        assert_eq!(table.rows[0].index, FitIndexName::Cfi);
        assert_eq!(table.rows[12].index, FitIndexName::Ecvi);
    }

    #[test]
    fn missing_values_use_marker() {
        let table = sample();
        assert_eq!(table.rows[0].value_cell(), "0.97");
        assert_eq!(table.rows[1].value_cell(), MISSING_MARKER);
    }

    #[test]
    fn text_rendering_has_header_and_rows() {
        let text = sample().render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 13);
        assert!(lines[0].starts_with("Index"));
        assert!(lines[2].starts_with("CFI"));
        assert!(lines[2].ends_with("0.97"));
        assert!(text.contains("RMSEA"));
    }

    #[test]
    fn markdown_rendering() {
        let md = sample().render_markdown();
        assert!(md.starts_with("| Index | Value |\n| --- | ---: |\n"));
        assert!(md.contains("| CFI | 0.97 |"));
        assert!(md.contains("| TLI | n/a |"));
        assert_eq!(md.lines().count(), 15);
    }

    #[test]
    fn extreme_values_are_shown_as_is() {
        let table = FitTable::from_report(&FitIndexReport::from_pairs([
            (FitIndexName::Cfi, Some(1e308)),
            (FitIndexName::Ecvi, Some(f64::INFINITY)),
            (FitIndexName::Mfi, Some(-1e308)),
        ]));
        assert_eq!(table.rows[0].value_cell(), format!("{}", 1e308));
        assert_eq!(table.rows[12].value_cell(), "inf");
        assert!(table.rows[11].value_cell().starts_with("-1000"));
        let text = table.render_text();
        assert!(text.lines().any(|l| l.starts_with("ECVI") && l.trim_end().ends_with("inf")));
    }
}
