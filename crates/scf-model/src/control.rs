//! SCF control rows

use crate::framework::{CoreLevel, FilterKey, Framework};
use serde::{Deserialize, Serialize};

/// Split a newline-delimited identifier list, skipping blank lines
///
/// Risk, threat, assessment objective and evidence request associations are
/// stored this way on the catalog rows.
pub fn split_id_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|id| !id.is_empty())
}

/// A single Secure Controls Framework control
///
/// Reference data: loaded once per session and never mutated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfControl {
    /// Catalog key, e.g. `GOV-01`
    pub object_id: String,
    /// Control domain
    pub domain: String,
    /// Control title
    pub title: String,
    /// Review cadence
    pub cadence: String,
    /// Relative importance weight (0-10)
    pub weight: i32,

    /// Covers AICPA TSC / SOC 2
    pub covers_soc2: bool,
    /// Covers EU GDPR
    pub covers_gdpr: bool,
    /// Covers US HIPAA
    pub covers_hipaa: bool,
    /// Covers ISO/IEC 27001
    pub covers_iso27001: bool,
    /// Covers ISO/IEC 42001
    pub covers_iso42001: bool,
    /// Covers NIST CSF
    pub covers_nist_csf: bool,
    /// Covers NIST AI RMF
    pub covers_nist_ai_rmf: bool,

    /// Member of SCF CORE level 0
    pub is_core_lvl0: bool,
    /// Member of SCF CORE level 1
    pub is_core_lvl1: bool,
    /// Member of SCF CORE level 2
    pub is_core_lvl2: bool,
    /// Member of SCF CORE AI-enabled operations
    pub is_core_ai_ops: bool,

    /// Minimum control requirement
    pub is_mcr: bool,
    /// Data security requirement
    pub is_dsr: bool,

    /// Newline-delimited risk ids
    pub risk_threat_summary: String,
    /// Newline-delimited threat ids
    pub control_threat_summary: String,

    /// Full control description
    pub control_description: String,
    /// Guidance for micro/small organizations
    pub micro_small_solutions: String,

    /// Original catalog record
    pub data: serde_json::Value,
}

impl ScfControl {
    /// Create an empty control with the given id
    #[inline]
    #[must_use]
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            ..Self::default()
        }
    }

    /// Whether the control carries the framework's coverage flag
    #[inline]
    #[must_use]
    pub fn covers(&self, framework: Framework) -> bool {
        match framework {
            Framework::Soc2 => self.covers_soc2,
            Framework::Gdpr => self.covers_gdpr,
            Framework::Hipaa => self.covers_hipaa,
            Framework::Iso27001 => self.covers_iso27001,
            Framework::Iso42001 => self.covers_iso42001,
            Framework::NistCsf => self.covers_nist_csf,
            Framework::NistAiRmf => self.covers_nist_ai_rmf,
        }
    }

    /// Whether the control belongs to the core level
    #[inline]
    #[must_use]
    pub fn in_core(&self, level: CoreLevel) -> bool {
        match level {
            CoreLevel::L0 => self.is_core_lvl0,
            CoreLevel::L1 => self.is_core_lvl1,
            CoreLevel::L2 => self.is_core_lvl2,
            CoreLevel::AiOps => self.is_core_ai_ops,
        }
    }

    /// Whether the control satisfies a flag filter
    #[inline]
    #[must_use]
    pub fn satisfies(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Core(level) => self.in_core(level),
            FilterKey::Framework(fw) => self.covers(fw),
        }
    }

    /// Frameworks this control covers
    pub fn frameworks(&self) -> impl Iterator<Item = Framework> + '_ {
        Framework::ALL.into_iter().filter(|fw| self.covers(*fw))
    }

    /// Core levels this control belongs to
    pub fn core_levels(&self) -> impl Iterator<Item = CoreLevel> + '_ {
        CoreLevel::ALL.into_iter().filter(|lvl| self.in_core(*lvl))
    }

    /// Risk ids referenced by the risk summary
    pub fn risk_ids(&self) -> impl Iterator<Item = &str> {
        split_id_list(&self.risk_threat_summary)
    }

    /// Threat ids referenced by the threat summary
    pub fn threat_ids(&self) -> impl Iterator<Item = &str> {
        split_id_list(&self.control_threat_summary)
    }

    /// Set a coverage flag
    #[must_use]
    pub fn with_framework(mut self, framework: Framework) -> Self {
        match framework {
            Framework::Soc2 => self.covers_soc2 = true,
            Framework::Gdpr => self.covers_gdpr = true,
            Framework::Hipaa => self.covers_hipaa = true,
            Framework::Iso27001 => self.covers_iso27001 = true,
            Framework::Iso42001 => self.covers_iso42001 = true,
            Framework::NistCsf => self.covers_nist_csf = true,
            Framework::NistAiRmf => self.covers_nist_ai_rmf = true,
        }
        self
    }

    /// Set a core-level flag
    #[must_use]
    pub fn with_core(mut self, level: CoreLevel) -> Self {
        match level {
            CoreLevel::L0 => self.is_core_lvl0 = true,
            CoreLevel::L1 => self.is_core_lvl1 = true,
            CoreLevel::L2 => self.is_core_lvl2 = true,
            CoreLevel::AiOps => self.is_core_ai_ops = true,
        }
        self
    }

    /// Set the weight
    #[inline]
    #[must_use]
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the newline-delimited risk and threat references
    #[must_use]
    pub fn with_refs(mut self, risks: &[&str], threats: &[&str]) -> Self {
        self.risk_threat_summary = risks.join("\n");
        self.control_threat_summary = threats.join("\n");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_id_list_skips_blank_lines() {
        let ids: Vec<_> = split_id_list("R-AC-1\n\n  R-AM-2 \r\n").collect();
        assert_eq!(ids, vec!["R-AC-1", "R-AM-2"]);
        assert_eq!(split_id_list("").count(), 0);
    }

    #[test]
    fn control_flags() {
        let control = ScfControl::new("GOV-01")
            .with_framework(Framework::Soc2)
            .with_framework(Framework::NistCsf)
            .with_core(CoreLevel::L1);

        assert!(control.covers(Framework::Soc2));
        assert!(!control.covers(Framework::Gdpr));
        assert!(control.in_core(CoreLevel::L1));
        assert!(control.satisfies(FilterKey::Framework(Framework::NistCsf)));
        assert!(!control.satisfies(FilterKey::Core(CoreLevel::L0)));
        assert_eq!(
            control.frameworks().collect::<Vec<_>>(),
            vec![Framework::Soc2, Framework::NistCsf]
        );
        assert_eq!(control.core_levels().collect::<Vec<_>>(), vec![CoreLevel::L1]);
    }

    #[test]
    fn control_decodes_api_view_with_missing_fields() {
        let json = r#"{
            "id": 12,
            "object_id": "IAC-01",
            "title": "Identity & Access Management",
            "weight": 10,
            "covers_soc2": true,
            "is_core_lvl0": true,
            "risk_threat_summary": "R-AC-1\nR-AC-2",
            "control_threat_summary": "NT-1"
        }"#;

        let control: ScfControl = serde_json::from_str(json).unwrap();
        assert_eq!(control.object_id, "IAC-01");
        assert_eq!(control.weight, 10);
        assert!(control.covers_soc2);
        assert!(!control.covers_gdpr);
        assert_eq!(control.risk_ids().collect::<Vec<_>>(), vec!["R-AC-1", "R-AC-2"]);
        assert_eq!(control.threat_ids().collect::<Vec<_>>(), vec!["NT-1"]);
        assert!(control.data.is_null());
    }
}
