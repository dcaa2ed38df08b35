//! Testing utilities for the SCF configurator workspace
//!
//! Shared catalogs, id helpers and API response bodies.

#![allow(missing_docs)]

use scf_model::{
    AssessmentObjective, Catalog, CoreLevel, EvidenceRequest, Framework, ScfControl, ScfMapping,
    ScfRisk, ScfThreat,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub fn ids(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Two controls: A (weight 5, SOC2) and B (weight 15, GDPR), with one
/// mapping row per framework.
pub fn two_control_catalog() -> Catalog {
    Catalog::new()
        .with_controls(vec![
            ScfControl::new("A").with_weight(5).with_framework(Framework::Soc2),
            ScfControl::new("B").with_weight(15).with_framework(Framework::Gdpr),
        ])
        .with_mappings(vec![
            ScfMapping::new("SOC2", "CC1.1", "B"),
            ScfMapping::new("GDPR", "Art 5", "A"),
        ])
}

pub fn sample_controls() -> Vec<ScfControl> {
    let mut mcr = ScfControl::new("CPL-01")
        .with_title("Statutory, Regulatory & Contractual Compliance")
        .with_weight(10)
        .with_framework(Framework::Soc2)
        .with_framework(Framework::Iso27001)
        .with_core(CoreLevel::L0);
    mcr.domain = "Compliance".to_string();
    mcr.is_mcr = true;

    let mut dsr = ScfControl::new("DCH-01")
        .with_title("Data Protection")
        .with_weight(9)
        .with_framework(Framework::Gdpr)
        .with_framework(Framework::Hipaa)
        .with_core(CoreLevel::L1)
        .with_refs(&["R-AC-1", "R-EX-2"], &["NT-7"]);
    dsr.domain = "Data Classification & Handling".to_string();
    dsr.is_dsr = true;

    let mut controls = vec![
        ScfControl::new("GOV-01")
            .with_title("Cybersecurity & Data Protection Governance Program")
            .with_weight(10)
            .with_framework(Framework::Soc2)
            .with_framework(Framework::Iso27001)
            .with_framework(Framework::NistCsf)
            .with_core(CoreLevel::L0)
            .with_refs(&["R-GV-1", "R-GV-2"], &["NT-1"]),
        ScfControl::new("GOV-02")
            .with_title("Publishing Cybersecurity & Data Protection Documentation")
            .with_weight(6)
            .with_framework(Framework::Soc2)
            .with_core(CoreLevel::L1)
            .with_refs(&["R-GV-1"], &[]),
        ScfControl::new("IAC-01")
            .with_title("Identity & Access Management")
            .with_weight(10)
            .with_framework(Framework::Soc2)
            .with_framework(Framework::Hipaa)
            .with_framework(Framework::NistCsf)
            .with_core(CoreLevel::L0)
            .with_refs(&["R-AC-1", "R-AC-2"], &["NT-2", "NT-3"]),
        ScfControl::new("AAT-01")
            .with_title("Artificial Intelligence Governance")
            .with_weight(7)
            .with_framework(Framework::Iso42001)
            .with_framework(Framework::NistAiRmf)
            .with_core(CoreLevel::AiOps)
            .with_refs(&["R-AI-1"], &["NT-9"]),
        ScfControl::new("NET-01")
            .with_title("Network Security Controls")
            .with_weight(3)
            .with_core(CoreLevel::L2),
        mcr,
        dsr,
    ];
    for control in &mut controls {
        if control.domain.is_empty() {
            control.domain = match control.object_id.split('-').next() {
                Some("GOV") => "Governance",
                Some("IAC") => "Identification & Authentication",
                Some("AAT") => "Artificial Intelligence",
                _ => "Network Security",
            }
            .to_string();
        }
        control.cadence = "Annual".to_string();
    }
    controls
}

/// Catalog with every collection populated
pub fn sample_catalog() -> Catalog {
    Catalog::new()
        .with_controls(sample_controls())
        .with_mappings(vec![
            ScfMapping::new("SOC2", "CC1.1", "GOV-01"),
            ScfMapping::new("SOC2", "CC2.2", "GOV-02"),
            ScfMapping::new("SOC2", "CC6.1", "IAC-01"),
            ScfMapping::new("SOC2", "CC1.2", "CPL-01"),
            ScfMapping::new("GDPR", "Art 32", "DCH-01"),
            ScfMapping::new("HIPAA", "164.308", "IAC-01"),
            ScfMapping::new("HIPAA", "164.312", "DCH-01"),
            ScfMapping::new("ISO27001", "5.1", "GOV-01"),
            ScfMapping::new("NIST CSF", "GV.OC-01", "GOV-01"),
            ScfMapping::new("NIST AI RMF", "GOVERN 1.1", "AAT-01"),
        ])
        .with_risks(
            ["R-GV-1", "R-GV-2", "R-AC-1", "R-AC-2", "R-EX-2", "R-AI-1", "R-BC-1"]
                .into_iter()
                .map(ScfRisk::new)
                .collect(),
        )
        .with_threats(
            ["NT-1", "NT-2", "NT-3", "NT-7", "NT-9"]
                .into_iter()
                .map(ScfThreat::new)
                .collect(),
        )
        .with_assessment_objectives(vec![
            AssessmentObjective::new("GOV-01_A01", &["GOV-01"]),
            AssessmentObjective::new("IAC-01_A01", &["IAC-01", "DCH-01"]),
        ])
        .with_evidence_requests(vec![
            EvidenceRequest::new("E-GOV-01", &["GOV-01", "GOV-02"]),
            EvidenceRequest::new("E-IAC-01", &["IAC-01"]),
        ])
}

/// Paginated response envelope
pub fn envelope(items: &[Value], total: usize, limit: usize, offset: usize) -> Value {
    json!({
        "items": items,
        "total": total,
        "pages": total.div_ceil(limit.max(1)),
        "limit": limit,
        "offset": offset,
    })
}

/// Controls as the catalog API returns them
pub fn control_rows(controls: &[ScfControl]) -> Vec<Value> {
    controls
        .iter()
        .map(|c| serde_json::to_value(c).unwrap())
        .collect()
}
