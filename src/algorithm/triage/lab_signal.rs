//! Lab signal evaluation
//!
//! Classifies each measured blood count against its reference range. The
//! result always has exactly one entry per lab; missing values are `Unknown`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{LabThresholds, ReferenceRange};
use crate::models::lab::{LabName, LabPanel};

/// Categorical classification of one lab value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabSignal {
    /// Within the reference range
    Normal,
    /// Below range
    Low,
    /// Above range
    High,
    /// Far below range
    CriticalLow,
    /// Far above range
    CriticalHigh,
    /// Not measured
    Unknown,
}

impl LabSignal {
    /// `Low` or `High`
    #[must_use]
    pub const fn is_abnormal(self) -> bool {
        matches!(self, Self::Low | Self::High)
    }

    /// `CriticalLow` or `CriticalHigh`
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::CriticalLow | Self::CriticalHigh)
    }

    /// Anything other than `Normal` and `Unknown`
    #[must_use]
    pub const fn is_out_of_range(self) -> bool {
        self.is_abnormal() || self.is_critical()
    }

    /// Direction phrase used in explanations
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Low => "low",
            Self::High => "high",
            Self::CriticalLow => "critically low",
            Self::CriticalHigh => "critically high",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LabSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.direction())
    }
}

/// Classify one value (canonical unit) against a range
#[must_use]
pub fn classify_value(value: f64, range: &ReferenceRange) -> LabSignal {
    if value < range.critical_low {
        LabSignal::CriticalLow
    } else if value < range.low {
        LabSignal::Low
    } else if value > range.critical_high {
        LabSignal::CriticalHigh
    } else if value > range.high {
        LabSignal::High
    } else {
        LabSignal::Normal
    }
}

/// Lab name to signal, iterated in platelet, WBC, RBC order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabSignals(BTreeMap<LabName, LabSignal>);

impl LabSignals {
    /// Signal for a lab
    #[must_use]
    pub fn get(&self, lab: LabName) -> LabSignal {
        self.0.get(&lab).copied().unwrap_or(LabSignal::Unknown)
    }

    /// Iterate `(lab, signal)` in fixed lab order
    pub fn iter(&self) -> impl Iterator<Item = (LabName, LabSignal)> + '_ {
        self.0.iter().map(|(lab, signal)| (*lab, *signal))
    }

    /// Number of entries (always one per lab)
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for evaluator output
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any lab is critical
    #[must_use]
    pub fn any_critical(&self) -> bool {
        self.0.values().any(|s| s.is_critical())
    }

    /// Number of `Low`/`High` labs
    #[must_use]
    pub fn abnormal_count(&self) -> usize {
        self.0.values().filter(|s| s.is_abnormal()).count()
    }

    /// Whether every lab is `Unknown`
    #[must_use]
    pub fn all_unknown(&self) -> bool {
        self.0.values().all(|s| *s == LabSignal::Unknown)
    }

    /// Labs outside their range, in fixed lab order
    pub fn out_of_range(&self) -> impl Iterator<Item = (LabName, LabSignal)> + '_ {
        self.iter().filter(|(_, signal)| signal.is_out_of_range())
    }
}

impl FromIterator<(LabName, LabSignal)> for LabSignals {
    fn from_iter<I: IntoIterator<Item = (LabName, LabSignal)>>(iter: I) -> Self {
        let mut map: BTreeMap<_, _> = LabName::ALL
            .into_iter()
            .map(|lab| (lab, LabSignal::Unknown))
            .collect();
        map.extend(iter);
        Self(map)
    }
}

/// Evaluate every lab of a panel
#[must_use]
pub fn evaluate_labs(panel: &LabPanel, thresholds: &LabThresholds) -> LabSignals {
    LabName::ALL
        .into_iter()
        .map(|lab| {
            let signal = panel.get(lab).map_or(LabSignal::Unknown, |value| {
                classify_value(value.in_unit(lab.canonical_unit()), thresholds.range(lab))
            });
            (lab, signal)
        })
        .collect()
}
