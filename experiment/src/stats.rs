//! Preference statistics over a session's votes.

use std::collections::BTreeMap;

use bestie_core::{PreferenceLog, Strategy};
use serde::Serialize;

/// Aggregated votes. Both known strategies are always present in `counts` and `percentages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceStats {
    pub counts: BTreeMap<Strategy, usize>,
    pub percentages: BTreeMap<Strategy, f64>,
    pub total: usize,
    /// Most-voted strategy; ties go to the first in [`Strategy::ALL`]. `None` without votes.
    pub dominant: Option<Strategy>,
}

impl PreferenceStats {
    pub fn count(&self, strategy: Strategy) -> usize {
        self.counts.get(&strategy).copied().unwrap_or(0)
    }

    pub fn percentage(&self, strategy: Strategy) -> f64 {
        self.percentages.get(&strategy).copied().unwrap_or(0.0)
    }

    /// "Conditional: 2 (66.7%)" style lines, one per strategy.
    pub fn summary_lines(&self) -> Vec<String> {
        Strategy::ALL
            .iter()
            .map(|&s| {
                format!(
                    "{}: {} ({:.1}%)",
                    s.display_name(),
                    self.count(s),
                    self.percentage(s)
                )
            })
            .collect()
    }

    /// Display name of the dominant strategy, or "None".
    pub fn dominant_label(&self) -> &'static str {
        self.dominant.map(Strategy::display_name).unwrap_or("None")
    }
}

/// Folds the preference log into counts, percentages and the dominant strategy.
pub fn compute_stats(log: &PreferenceLog) -> PreferenceStats {
    let mut counts: BTreeMap<Strategy, usize> = Strategy::ALL.iter().map(|&s| (s, 0)).collect();
    for strategy in log.choices() {
        *counts.entry(strategy).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let percentages = counts
        .iter()
        .map(|(&s, &count)| {
            let pct = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            (s, pct)
        })
        .collect();

    let mut dominant: Option<(Strategy, usize)> = None;
    if total > 0 {
        for s in Strategy::ALL {
            let c = counts[&s];
            if dominant.map_or(true, |(_, best)| c > best) {
                dominant = Some((s, c));
            }
        }
    }

    PreferenceStats {
        counts,
        percentages,
        total,
        dominant: dominant.map(|(s, _)| s),
    }
}
