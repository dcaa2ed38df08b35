//! Project bootstrap export
//!
//! Builds the `scf_config.v1` document handed to the project-creation
//! endpoint. Exported controls are the selected ones plus any marked as
//! priority; assessment objectives and evidence requests are limited to
//! those referencing an exported control.

use crate::error::{EngineError, Result};
use crate::timeline::Goal;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use scf_model::{Catalog, CoreLevel, Framework, ScfControl};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Payload version understood by the bootstrap endpoint
pub const CONFIG_VERSION: &str = "scf_config.v1";

/// Default `source` field
pub const DEFAULT_SOURCE: &str = "scf_configurator";

/// Caller-supplied export fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Project name, required
    pub project_name: String,
    /// Explicit description; derived when absent
    #[serde(default)]
    pub project_description: Option<String>,
    /// Owning organization
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Producer tag
    #[serde(default)]
    pub source: Option<String>,
}

impl ExportRequest {
    /// Request for a named project
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// With an explicit description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.project_description = Some(description.into());
        self
    }

    /// With an organization id
    #[inline]
    #[must_use]
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}

/// One exported control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportControl {
    /// SCF id
    pub object_id: String,
    /// Title
    pub title: String,
    /// Domain
    pub domain: String,
    /// Review cadence
    pub cadence: String,
    /// Weight
    pub weight: i32,
    /// Framework key to coverage flag
    pub coverage: BTreeMap<String, bool>,
    /// Core level key to membership flag
    pub core: BTreeMap<String, bool>,
    /// In the selection
    pub selected: bool,
    /// Marked as priority
    pub priority: bool,
    /// Description
    pub control_description: String,
    /// Referenced risks
    pub risk_ids: Vec<String>,
    /// Referenced threats
    pub threat_ids: Vec<String>,
    /// Assessment objectives mapping to this control
    pub assessment_objective_ids: Vec<String>,
    /// Evidence requests mapping to this control
    pub evidence_request_ids: Vec<String>,
}

/// One exported goal window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportWindow {
    /// Goal id
    pub goal: String,
    /// First month
    pub start_month: u32,
    /// End month
    pub end_month: u32,
}

/// Exported timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTimeline {
    /// Windows in row order
    pub windows: Vec<ExportWindow>,
    /// Axis length
    pub max_months: u32,
    /// Distinct controls across goals
    pub total_unique_controls: usize,
}

/// Exported assessment objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportObjective {
    /// Id
    pub object_id: String,
    /// Raw control list
    pub control_mappings: String,
    /// Statement
    pub statement: String,
    /// Origin
    pub origin: String,
    /// Part of the SCF baseline
    pub is_scf_baseline: bool,
}

/// Exported assessment objective section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSection {
    /// Objectives
    pub items: Vec<ExportObjective>,
    /// Objective id to exported control ids
    pub controls_by_ao_id: IndexMap<String, Vec<String>>,
}

/// Exported evidence request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEvidence {
    /// Id
    pub object_id: String,
    /// Area of focus
    pub area_of_focus: String,
    /// Artifact
    pub artifact: String,
    /// Description
    pub description: String,
}

/// Exported evidence request section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSection {
    /// Requests
    pub items: Vec<ExportEvidence>,
    /// Request id to exported control ids
    pub controls_by_evidence_id: IndexMap<String, Vec<String>>,
}

/// The `scf_config.v1` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScfConfigPayload {
    /// Always [`CONFIG_VERSION`]
    pub version: String,
    /// Build time
    pub generated_at: DateTime<Utc>,
    /// Producer tag
    pub source: String,
    /// Project name
    pub project_name: String,
    /// Owning organization
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub organization_id: Option<String>,
    /// Explicit or derived description
    #[serde(alias = "description")]
    pub project_description: String,
    /// Exported controls in catalog order
    pub controls: Vec<ExportControl>,
    /// Goal windows, when any goal exists
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeline: Option<ExportTimeline>,
    /// Objectives touching exported controls
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assessment_objectives: Option<ObjectiveSection>,
    /// Evidence requests touching exported controls
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evidence_requests: Option<EvidenceSection>,
}

impl ScfConfigPayload {
    /// Build the payload
    ///
    /// # Errors
    /// - `EngineError::Export` for a blank project name or an empty selection
    pub fn build(
        catalog: &Catalog,
        selected: &BTreeSet<String>,
        priorities: &BTreeSet<String>,
        goals: &[Goal],
        max_months: u32,
        request: &ExportRequest,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let project_name = request.project_name.trim();
        if project_name.is_empty() {
            return Err(EngineError::Export("project_name is required".to_string()));
        }
        if !selected.iter().any(|id| catalog.contains_control(id)) {
            return Err(EngineError::Export("no controls selected".to_string()));
        }

        let exported: Vec<&ScfControl> = catalog
            .controls()
            .iter()
            .filter(|c| selected.contains(&c.object_id) || priorities.contains(&c.object_id))
            .collect();
        let exported_ids: BTreeSet<&str> = exported.iter().map(|c| c.object_id.as_str()).collect();

        let mut controls_by_ao_id: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut objectives = Vec::new();
        for ao in catalog.assessment_objectives() {
            let ids: Vec<String> = ao
                .control_ids()
                .filter(|id| exported_ids.contains(id))
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                continue;
            }
            controls_by_ao_id.insert(ao.object_id.clone(), ids);
            objectives.push(ExportObjective {
                object_id: ao.object_id.clone(),
                control_mappings: ao.control_mappings.clone(),
                statement: ao.statement.clone(),
                origin: ao.origin.clone(),
                is_scf_baseline: ao.is_scf_baseline,
            });
        }

        let mut controls_by_evidence_id: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut evidence = Vec::new();
        for er in catalog.evidence_requests() {
            let ids: Vec<String> = er
                .control_ids()
                .filter(|id| exported_ids.contains(id))
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                continue;
            }
            controls_by_evidence_id.insert(er.object_id.clone(), ids);
            evidence.push(ExportEvidence {
                object_id: er.object_id.clone(),
                area_of_focus: er.area_of_focus.clone(),
                artifact: er.artifact.clone(),
                description: er.description.clone(),
            });
        }

        let controls: Vec<ExportControl> = exported
            .iter()
            .map(|c| ExportControl {
                object_id: c.object_id.clone(),
                title: c.title.clone(),
                domain: c.domain.clone(),
                cadence: c.cadence.clone(),
                weight: c.weight,
                coverage: Framework::ALL
                    .iter()
                    .map(|fw| (fw.key().to_string(), c.covers(*fw)))
                    .collect(),
                core: CoreLevel::ALL
                    .iter()
                    .map(|lvl| (lvl.key().to_string(), c.in_core(*lvl)))
                    .collect(),
                selected: selected.contains(&c.object_id),
                priority: priorities.contains(&c.object_id),
                control_description: c.control_description.clone(),
                risk_ids: dedup(c.risk_ids()),
                threat_ids: dedup(c.threat_ids()),
                assessment_objective_ids: owners(&controls_by_ao_id, &c.object_id),
                evidence_request_ids: owners(&controls_by_evidence_id, &c.object_id),
            })
            .collect();

        let timeline = if goals.is_empty() {
            None
        } else {
            let unique: BTreeSet<&String> = goals.iter().flat_map(|g| &g.control_ids).collect();
            Some(ExportTimeline {
                windows: goals
                    .iter()
                    .map(|g| ExportWindow {
                        goal: g.key.goal_id().to_string(),
                        start_month: g.window.start_month,
                        end_month: g.window.end_month,
                    })
                    .collect(),
                max_months,
                total_unique_controls: unique.len(),
            })
        };

        let project_description = match request.project_description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => describe(&controls, timeline.as_ref()),
        };

        Ok(Self {
            version: CONFIG_VERSION.to_string(),
            generated_at,
            source: request
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            project_name: project_name.to_string(),
            organization_id: request.organization_id.clone().filter(|o| !o.trim().is_empty()),
            project_description,
            controls,
            timeline,
            assessment_objectives: (!objectives.is_empty()).then(|| ObjectiveSection {
                items: objectives,
                controls_by_ao_id,
            }),
            evidence_requests: (!evidence.is_empty()).then(|| EvidenceSection {
                items: evidence,
                controls_by_evidence_id,
            }),
        })
    }

    /// Controls with `selected` set
    pub fn selected_controls(&self) -> impl Iterator<Item = &ExportControl> {
        self.controls.iter().filter(|c| c.selected)
    }
}

/// Summarize the selected controls as a one-sentence description
#[must_use]
pub fn describe(controls: &[ExportControl], timeline: Option<&ExportTimeline>) -> String {
    let selected: Vec<&ExportControl> = controls.iter().filter(|c| c.selected).collect();
    let total = selected.len();
    if total == 0 {
        return "SCF project with 0 selected controls.".to_string();
    }

    let coverage: BTreeSet<&str> = selected
        .iter()
        .flat_map(|c| c.coverage.iter().filter(|(_, on)| **on).map(|(k, _)| k.as_str()))
        .collect();
    let core: BTreeSet<&str> = selected
        .iter()
        .flat_map(|c| c.core.iter().filter(|(_, on)| **on).map(|(k, _)| k.as_str()))
        .collect();
    let priority = selected.iter().filter(|c| c.priority).count();

    let mut parts = vec![if total == 1 {
        "SCF project with 1 selected control".to_string()
    } else {
        format!("SCF project with {total} selected controls")
    }];
    if !coverage.is_empty() {
        parts.push(format!("covering {}", coverage.into_iter().collect::<Vec<_>>().join(", ")));
    }
    if !core.is_empty() {
        parts.push(format!("core: {}", core.into_iter().collect::<Vec<_>>().join(", ")));
    }
    if let Some(t) = timeline.filter(|t| t.max_months > 0) {
        parts.push(format!("over {} months", t.max_months));
    }
    if priority == total {
        parts.push("all marked as priority".to_string());
    } else if priority > 0 {
        parts.push(format!("{priority} marked as priority"));
    }
    format!("{}.", parts.join(", "))
}

fn dedup<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ids.filter(|id| seen.insert(*id)).map(str::to_string).collect()
}

fn owners(index: &IndexMap<String, Vec<String>>, control_id: &str) -> Vec<String> {
    index
        .iter()
        .filter(|(_, ids)| ids.iter().any(|id| id == control_id))
        .map(|(owner, _)| owner.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::MonthWindow;
    use pretty_assertions::assert_eq;
    use scf_model::{AssessmentObjective, EvidenceRequest, FilterKey};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_controls(vec![
                ScfControl::new("GOV-01")
                    .with_framework(Framework::Soc2)
                    .with_core(CoreLevel::L0)
                    .with_refs(&["R-1", "R-1", "R-2"], &["T-1"]),
                ScfControl::new("IAC-01").with_framework(Framework::Gdpr),
                ScfControl::new("NET-01"),
            ])
            .with_assessment_objectives(vec![
                AssessmentObjective::new("AO-1", &["GOV-01", "NET-01"]),
                AssessmentObjective::new("AO-2", &["NET-01"]),
            ])
            .with_evidence_requests(vec![EvidenceRequest::new("E-1", &["IAC-01"])])
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn rejects_blank_name_and_empty_selection() {
        let catalog = catalog();
        let err = ScfConfigPayload::build(
            &catalog,
            &ids(&["GOV-01"]),
            &BTreeSet::new(),
            &[],
            24,
            &ExportRequest::new("  "),
            now(),
        );
        assert!(matches!(err, Err(EngineError::Export(_))));

        let err = ScfConfigPayload::build(
            &catalog,
            &BTreeSet::new(),
            &ids(&["GOV-01"]),
            &[],
            24,
            &ExportRequest::new("P"),
            now(),
        );
        assert!(matches!(err, Err(EngineError::Export(_))));
    }

    #[test]
    fn exports_selected_and_priority_controls() {
        let payload = ScfConfigPayload::build(
            &catalog(),
            &ids(&["GOV-01"]),
            &ids(&["IAC-01"]),
            &[],
            24,
            &ExportRequest::new("Pilot").with_organization("org-1"),
            now(),
        )
        .unwrap();

        assert_eq!(payload.version, "scf_config.v1");
        assert_eq!(payload.source, DEFAULT_SOURCE);
        let exported: Vec<(&str, bool, bool)> = payload
            .controls
            .iter()
            .map(|c| (c.object_id.as_str(), c.selected, c.priority))
            .collect();
        assert_eq!(exported, vec![("GOV-01", true, false), ("IAC-01", false, true)]);

        let gov = &payload.controls[0];
        assert_eq!(gov.risk_ids, vec!["R-1".to_string(), "R-2".to_string()]);
        assert_eq!(gov.assessment_objective_ids, vec!["AO-1".to_string()]);
        assert!(gov.coverage["soc2"]);
        assert!(gov.core["core_lvl0"]);

        let aos = payload.assessment_objectives.as_ref().unwrap();
        assert_eq!(aos.items.len(), 1);
        assert_eq!(aos.controls_by_ao_id["AO-1"], vec!["GOV-01".to_string()]);
        let ers = payload.evidence_requests.as_ref().unwrap();
        assert_eq!(ers.controls_by_evidence_id["E-1"], vec!["IAC-01".to_string()]);
        assert_eq!(payload.selected_controls().count(), 1);
    }

    #[test]
    fn derived_description() {
        let goals = vec![Goal {
            key: FilterKey::Framework(Framework::Soc2),
            window: MonthWindow::new(0, 6),
            control_ids: ids(&["GOV-01"]),
            new_control_ids: ids(&["GOV-01"]),
        }];
        let payload = ScfConfigPayload::build(
            &catalog(),
            &ids(&["GOV-01", "IAC-01"]),
            &ids(&["GOV-01"]),
            &goals,
            24,
            &ExportRequest::new("Pilot"),
            now(),
        )
        .unwrap();

        assert_eq!(
            payload.project_description,
            "SCF project with 2 selected controls, covering gdpr, soc2, core: core_lvl0, \
             over 24 months, 1 marked as priority."
        );
        let timeline = payload.timeline.unwrap();
        assert_eq!(timeline.windows[0].goal, "FRAMEWORK_SOC2");
        assert_eq!(timeline.total_unique_controls, 1);
    }

    #[test]
    fn explicit_description_wins() {
        let payload = ScfConfigPayload::build(
            &catalog(),
            &ids(&["NET-01"]),
            &BTreeSet::new(),
            &[],
            24,
            &ExportRequest::new("Pilot").with_description("Custom"),
            now(),
        )
        .unwrap();
        assert_eq!(payload.project_description, "Custom");
        assert!(payload.timeline.is_none());
        assert!(payload.evidence_requests.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["generated_at"], "2026-01-02T03:04:05Z");
        assert!(json.get("organization_id").is_none());
    }
}
