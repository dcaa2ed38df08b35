//! Reference catalog rows: mappings, risks, threats, assessment objectives
//! and evidence requests

use crate::control::split_id_list;
use crate::framework::Framework;
use serde::{Deserialize, Serialize};

/// Directed edge from an external framework control to one SCF control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfMapping {
    /// Mapping-table framework name (`SOC2`, `NIST CSF`, ...)
    pub framework: String,
    /// External control identifier
    pub external_id: String,
    /// External control name
    pub external_name: String,
    /// External control description
    pub external_description: String,
    /// Set-theory relationship
    pub strm_relationship: String,
    /// Relationship rationale
    pub strm_rationale: String,
    /// Relationship strength score
    pub strength: i32,
    /// Free-form notes
    pub notes: String,
    /// Target SCF control id
    pub scf_object_id: String,
    /// Target SCF control title
    pub scf_control_title: String,
}

impl ScfMapping {
    /// Create a mapping edge
    #[must_use]
    pub fn new(
        framework: impl Into<String>,
        external_id: impl Into<String>,
        scf_object_id: impl Into<String>,
    ) -> Self {
        Self {
            framework: framework.into(),
            external_id: external_id.into(),
            scf_object_id: scf_object_id.into(),
            ..Self::default()
        }
    }

    /// Typed framework, if the mapping names a tracked one
    #[inline]
    #[must_use]
    pub fn framework(&self) -> Option<Framework> {
        Framework::from_token(&self.framework)
    }
}

/// SCF risk catalog entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfRisk {
    /// Catalog key, e.g. `R-AC-1`
    pub object_id: String,
    /// Risk grouping
    pub grouping: String,
    /// Short risk note
    pub title: String,
    /// Description of the possible risk
    pub description: String,
    /// NIST function, e.g. `Protect`
    pub nist_function: String,
    /// Materiality considerations
    pub materiality: String,
    /// Original catalog record
    pub data: serde_json::Value,
}

impl ScfRisk {
    /// Create a risk with the given id
    #[inline]
    #[must_use]
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            ..Self::default()
        }
    }
}

/// SCF threat catalog entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfThreat {
    /// Catalog key, e.g. `NT-1`
    pub object_id: String,
    /// Threat grouping
    pub grouping: String,
    /// Threat title
    pub title: String,
    /// Threat description
    pub description: String,
    /// Materiality considerations
    pub materiality: String,
    /// Original catalog record
    pub data: serde_json::Value,
}

impl ScfThreat {
    /// Create a threat with the given id
    #[inline]
    #[must_use]
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            ..Self::default()
        }
    }
}

/// SCF assessment objective
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentObjective {
    /// Catalog key, e.g. `AAT-01_A01`
    pub object_id: String,
    /// Newline-delimited SCF control ids
    pub control_mappings: String,
    /// Objective statement
    pub statement: String,
    /// Objective origin(s)
    pub origin: String,
    /// Part of the SCF baseline objectives
    pub is_scf_baseline: bool,
    /// Original catalog record
    pub data: serde_json::Value,
}

impl AssessmentObjective {
    /// Create an objective mapped to the given controls
    #[must_use]
    pub fn new(object_id: impl Into<String>, controls: &[&str]) -> Self {
        Self {
            object_id: object_id.into(),
            control_mappings: controls.join("\n"),
            ..Self::default()
        }
    }

    /// SCF control ids this objective maps to
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        split_id_list(&self.control_mappings)
    }
}

/// SCF evidence request list entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceRequest {
    /// Catalog key, e.g. `E-GOV-01`
    pub object_id: String,
    /// Area of focus
    pub area_of_focus: String,
    /// Documentation artifact
    pub artifact: String,
    /// Artifact description
    pub description: String,
    /// Newline-delimited SCF control ids
    pub control_mappings: String,
    /// Original catalog record
    pub data: serde_json::Value,
}

impl EvidenceRequest {
    /// Create an evidence request mapped to the given controls
    #[must_use]
    pub fn new(object_id: impl Into<String>, controls: &[&str]) -> Self {
        Self {
            object_id: object_id.into(),
            control_mappings: controls.join("\n"),
            ..Self::default()
        }
    }

    /// SCF control ids this request maps to
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        split_id_list(&self.control_mappings)
    }
}
