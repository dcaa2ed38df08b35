//! Coverage aggregation
//!
//! - Per-framework ratio of selected to mapped SCF controls
//! - Capped risk and threat scores from the controls' summary references
//! - [`overlap`] between two subjects over the whole catalog
//! - [`risk_threat_coverage`] of one subject by risk and threat summaries
//!
//! Missing catalogs yield zero for their dimension.

pub mod overlap;
pub mod summaries;

use scf_model::{Catalog, Framework};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use overlap::{overlap, Overlap, Subject};
pub use summaries::{
    risk_threat_coverage, ControlStats, RiskThreatCoverage, SummaryCoverage,
};

/// Coverage of one framework by the selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameworkCoverage {
    /// Framework
    pub framework: Framework,
    /// SCF controls reachable through the framework's mapping rows
    pub mapped: usize,
    /// Mapped controls that are selected
    pub selected_mapped: usize,
    /// `selected_mapped / mapped`, 0 when nothing is mapped
    pub ratio: f64,
}

/// Capped reference score for risks or threats
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CappedScore {
    /// Catalog size
    pub total: usize,
    /// Items referenced by at least one selected control
    pub referenced: usize,
    /// Sum of per-item capped reference counts
    pub score: usize,
    /// `score / (cap * total)`, 0 for an empty catalog
    pub ratio: f64,
}

/// Full coverage view for a selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// One entry per tracked framework
    pub frameworks: Vec<FrameworkCoverage>,
    /// Risk score
    pub risks: CappedScore,
    /// Threat score
    pub threats: CappedScore,
}

impl CoverageReport {
    /// Coverage for one framework
    #[must_use]
    pub fn framework(&self, framework: Framework) -> Option<&FrameworkCoverage> {
        self.frameworks.iter().find(|c| c.framework == framework)
    }
}

/// Mapped-control sets, built once per catalog
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    mapped: BTreeMap<Framework, BTreeSet<String>>,
}

impl CoverageIndex {
    /// Index a catalog's mapping rows
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            mapped: catalog.mapped_controls_by_framework(),
        }
    }

    /// Mapped SCF ids for a framework
    #[must_use]
    pub fn mapped(&self, framework: Framework) -> Option<&BTreeSet<String>> {
        self.mapped.get(&framework)
    }

    /// Per-framework coverage, in framework display order
    #[must_use]
    pub fn framework_coverage(&self, selected: &BTreeSet<String>) -> Vec<FrameworkCoverage> {
        Framework::ALL
            .into_iter()
            .map(|framework| {
                let (mapped, selected_mapped) = self.mapped.get(&framework).map_or((0, 0), |ids| {
                    (ids.len(), ids.intersection(selected).count())
                });
                FrameworkCoverage {
                    framework,
                    mapped,
                    selected_mapped,
                    ratio: ratio(selected_mapped, mapped),
                }
            })
            .collect()
    }
}

/// Score catalog items by how many selected controls reference them
///
/// Each item contributes `min(refs, cap)`.
pub fn capped_score<'a>(
    item_ids: impl IntoIterator<Item = &'a str>,
    refs: &HashMap<&str, usize>,
    cap: usize,
) -> CappedScore {
    let mut total = 0;
    let mut referenced = 0;
    let mut score = 0;
    for id in item_ids {
        total += 1;
        let count = refs.get(id).copied().unwrap_or(0);
        if count > 0 {
            referenced += 1;
        }
        score += count.min(cap);
    }
    CappedScore {
        total,
        referenced,
        score,
        ratio: ratio(score, cap.saturating_mul(total)),
    }
}

/// Compute the coverage report for a selection
#[must_use]
pub fn compute(
    catalog: &Catalog,
    index: &CoverageIndex,
    selected: &BTreeSet<String>,
    cap: usize,
) -> CoverageReport {
    let mut risk_refs: HashMap<&str, usize> = HashMap::new();
    let mut threat_refs: HashMap<&str, usize> = HashMap::new();

    for control in selected.iter().filter_map(|id| catalog.control(id)) {
        for risk in control.risk_ids().collect::<BTreeSet<_>>() {
            *risk_refs.entry(risk).or_default() += 1;
        }
        for threat in control.threat_ids().collect::<BTreeSet<_>>() {
            *threat_refs.entry(threat).or_default() += 1;
        }
    }

    CoverageReport {
        frameworks: index.framework_coverage(selected),
        risks: capped_score(
            catalog.risks().iter().map(|r| r.object_id.as_str()),
            &risk_refs,
            cap,
        ),
        threats: capped_score(
            catalog.threats().iter().map(|t| t.object_id.as_str()),
            &threat_refs,
            cap,
        ),
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
