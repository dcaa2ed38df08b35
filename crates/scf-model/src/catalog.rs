//! In-memory catalog snapshot
//!
//! Holds the six read-only catalogs loaded for a session. Any of them may be
//! empty while loading is still in flight or after a failed fetch; consumers
//! treat an empty catalog as "no data" rather than an error.

use crate::control::ScfControl;
use crate::framework::Framework;
use crate::reference::{AssessmentObjective, EvidenceRequest, ScfMapping, ScfRisk, ScfThreat};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Loaded SCF catalogs with a control lookup index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    controls: Vec<ScfControl>,
    control_index: HashMap<String, usize>,
    mappings: Vec<ScfMapping>,
    risks: Vec<ScfRisk>,
    threats: Vec<ScfThreat>,
    assessment_objectives: Vec<AssessmentObjective>,
    evidence_requests: Vec<EvidenceRequest>,
}

impl Catalog {
    /// Create an empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With controls (rebuilds the lookup index; later duplicates win)
    #[must_use]
    pub fn with_controls(mut self, controls: Vec<ScfControl>) -> Self {
        self.control_index = controls
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.object_id.clone(), idx))
            .collect();
        self.controls = controls;
        self
    }

    /// With framework mappings
    #[inline]
    #[must_use]
    pub fn with_mappings(mut self, mappings: Vec<ScfMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    /// With risks
    #[inline]
    #[must_use]
    pub fn with_risks(mut self, risks: Vec<ScfRisk>) -> Self {
        self.risks = risks;
        self
    }

    /// With threats
    #[inline]
    #[must_use]
    pub fn with_threats(mut self, threats: Vec<ScfThreat>) -> Self {
        self.threats = threats;
        self
    }

    /// With assessment objectives
    #[inline]
    #[must_use]
    pub fn with_assessment_objectives(mut self, objectives: Vec<AssessmentObjective>) -> Self {
        self.assessment_objectives = objectives;
        self
    }

    /// With evidence requests
    #[inline]
    #[must_use]
    pub fn with_evidence_requests(mut self, requests: Vec<EvidenceRequest>) -> Self {
        self.evidence_requests = requests;
        self
    }

    /// All controls
    #[inline]
    #[must_use]
    pub fn controls(&self) -> &[ScfControl] {
        &self.controls
    }

    /// Look up a control by object id
    #[inline]
    #[must_use]
    pub fn control(&self, object_id: &str) -> Option<&ScfControl> {
        self.control_index
            .get(object_id)
            .and_then(|idx| self.controls.get(*idx))
    }

    /// Whether a control id exists
    #[inline]
    #[must_use]
    pub fn contains_control(&self, object_id: &str) -> bool {
        self.control_index.contains_key(object_id)
    }

    /// Framework mappings
    #[inline]
    #[must_use]
    pub fn mappings(&self) -> &[ScfMapping] {
        &self.mappings
    }

    /// Risks
    #[inline]
    #[must_use]
    pub fn risks(&self) -> &[ScfRisk] {
        &self.risks
    }

    /// Threats
    #[inline]
    #[must_use]
    pub fn threats(&self) -> &[ScfThreat] {
        &self.threats
    }

    /// Assessment objectives
    #[inline]
    #[must_use]
    pub fn assessment_objectives(&self) -> &[AssessmentObjective] {
        &self.assessment_objectives
    }

    /// Evidence requests
    #[inline]
    #[must_use]
    pub fn evidence_requests(&self) -> &[EvidenceRequest] {
        &self.evidence_requests
    }

    /// SCF control ids reachable through each framework's mapping rows
    ///
    /// Every tracked framework has an entry, possibly empty. Rows naming an
    /// untracked framework are skipped.
    #[must_use]
    pub fn mapped_controls_by_framework(&self) -> BTreeMap<Framework, BTreeSet<String>> {
        let mut mapped: BTreeMap<Framework, BTreeSet<String>> =
            Framework::ALL.into_iter().map(|fw| (fw, BTreeSet::new())).collect();

        for row in &self.mappings {
            let Some(fw) = row.framework() else { continue };
            let scf_id = row.scf_object_id.trim();
            if scf_id.is_empty() {
                continue;
            }
            mapped.entry(fw).or_default().insert(scf_id.to_string());
        }

        mapped
    }

    /// Number of rows per catalog, in load order
    #[must_use]
    pub fn counts(&self) -> [(&'static str, usize); 6] {
        [
            ("controls", self.controls.len()),
            ("mappings", self.mappings.len()),
            ("risks", self.risks.len()),
            ("threats", self.threats.len()),
            ("assessment_objectives", self.assessment_objectives.len()),
            ("evidence_requests", self.evidence_requests.len()),
        ]
    }
}
