//! The closed set of fit-index names and the per-document report.
//!
//! [`FitIndexReport`] stores one slot per [`FitIndexName`] in a fixed-size
//! array indexed by the enum discriminant, so a report can never hold more or
//! fewer than [`FitIndexName::COUNT`] entries, and iteration always follows
//! declaration order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// A fit index recognised in SEM output. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum FitIndexName {
    #[serde(rename = "CFI")]
    Cfi,
    #[serde(rename = "TLI")]
    Tli,
    #[serde(rename = "NNFI")]
    Nnfi,
    #[serde(rename = "NFI")]
    Nfi,
    #[serde(rename = "PNFI")]
    Pnfi,
    #[serde(rename = "RFI")]
    Rfi,
    #[serde(rename = "IFI")]
    Ifi,
    #[serde(rename = "RNI")]
    Rni,
    #[serde(rename = "RMSEA")]
    Rmsea,
    #[serde(rename = "SRMR")]
    Srmr,
    #[serde(rename = "GFI")]
    Gfi,
    #[serde(rename = "MFI")]
    Mfi,
    #[serde(rename = "ECVI")]
    Ecvi,
}

impl FitIndexName {
    pub const COUNT: usize = 13;

    /// Every index, in declaration order.
    pub const ALL: [FitIndexName; Self::COUNT] = [
        FitIndexName::Cfi,
        FitIndexName::Tli,
        FitIndexName::Nnfi,
        FitIndexName::Nfi,
        FitIndexName::Pnfi,
        FitIndexName::Rfi,
        FitIndexName::Ifi,
        FitIndexName::Rni,
        FitIndexName::Rmsea,
        FitIndexName::Srmr,
        FitIndexName::Gfi,
        FitIndexName::Mfi,
        FitIndexName::Ecvi,
    ];

    /// The literal label searched for in the source text (case-sensitive).
    pub fn label(self) -> &'static str {
        match self {
            FitIndexName::Cfi => "CFI",
            FitIndexName::Tli => "TLI",
            FitIndexName::Nnfi => "NNFI",
            FitIndexName::Nfi => "NFI",
            FitIndexName::Pnfi => "PNFI",
            FitIndexName::Rfi => "RFI",
            FitIndexName::Ifi => "IFI",
            FitIndexName::Rni => "RNI",
            FitIndexName::Rmsea => "RMSEA",
            FitIndexName::Srmr => "SRMR",
            FitIndexName::Gfi => "GFI",
            FitIndexName::Mfi => "MFI",
            FitIndexName::Ecvi => "ECVI",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FitIndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitIndexName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitIndexName::ALL
            .iter()
            .copied()
            .find(|n| n.label() == s)
            .ok_or_else(|| format!("unknown fit index '{s}'"))
    }
}

/// Extracted values for every known index of one document.
///
/// Immutable once built; absent values are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitIndexReport {
    values: [Option<f64>; FitIndexName::COUNT],
}

impl FitIndexReport {
    /// Build a report from `(name, value)` pairs; unmentioned names stay absent.
    /// A later pair for the same name overwrites an earlier one.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (FitIndexName, Option<f64>)>) -> Self {
        let mut values = [None; FitIndexName::COUNT];
        for (name, value) in pairs {
            values[name.slot()] = value;
        }
        Self { values }
    }

    pub fn get(&self, name: FitIndexName) -> Option<f64> {
        self.values[name.slot()]
    }

    /// Always [`FitIndexName::COUNT`].
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true: a report always holds every known index.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All entries in declaration order, absent ones included.
    pub fn iter(&self) -> impl Iterator<Item = (FitIndexName, Option<f64>)> + '_ {
        FitIndexName::ALL.iter().map(|&n| (n, self.values[n.slot()]))
    }

    /// Only the entries with a value, in declaration order.
    pub fn present(&self) -> impl Iterator<Item = (FitIndexName, f64)> + '_ {
        self.iter().filter_map(|(n, v)| v.map(|v| (n, v)))
    }

    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// True when no index has a value (the "empty result set" case).
    pub fn has_no_values(&self) -> bool {
        self.found_count() == 0
    }
}

// Serialised as an ordered map `{"CFI": 0.97, "TLI": null, ...}`.
impl Serialize for FitIndexReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name.label(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_names_in_declaration_order() {
        let labels: Vec<&str> = FitIndexName::ALL.iter().map(|n| n.label()).collect();
        assert_eq!(
            labels,
            vec![
                "CFI", "TLI", "NNFI", "NFI", "PNFI", "RFI", "IFI", "RNI", "RMSEA", "SRMR", "GFI",
                "MFI", "ECVI"
            ]
        );
        for (i, n) in FitIndexName::ALL.iter().enumerate() {
            assert_eq!(n.slot(), i);
        }
    }

    #[test]
    fn parse_label_roundtrip() {
        for n in FitIndexName::ALL {
            assert_eq!(n.label().parse::<FitIndexName>().unwrap(), n);
        }
        assert!("cfi".parse::<FitIndexName>().is_err());
        assert!("AGFI".parse::<FitIndexName>().is_err());
    }

    #[test]
    fn default_report_has_every_key_absent() {
        let r = FitIndexReport::default();
        assert_eq!(r.len(), 13);
        assert_eq!(r.iter().count(), 13);
        assert!(r.has_no_values());
        assert_eq!(r.present().count(), 0);
    }

    #[test]
    fn present_keeps_declaration_order() {
        let r = FitIndexReport::from_pairs([
            (FitIndexName::Srmr, Some(0.031)),
            (FitIndexName::Cfi, Some(0.97)),
            (FitIndexName::Rmsea, Some(0.045)),
        ]);
        let present: Vec<_> = r.present().collect();
        assert_eq!(
            present,
            vec![
                (FitIndexName::Cfi, 0.97),
                (FitIndexName::Rmsea, 0.045),
                (FitIndexName::Srmr, 0.031)
            ]
        );
        assert_eq!(r.found_count(), 3);
        assert_eq!(r.get(FitIndexName::Tli), None);
    }

    #[test]
    fn serialises_as_ordered_map() {
        let r = FitIndexReport::from_pairs([(FitIndexName::Cfi, Some(0.97))]);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.starts_with("{\"CFI\":0.97,\"TLI\":null"), "got: {json}");
        assert!(json.ends_with("\"ECVI\":null}"), "got: {json}");
    }
}
