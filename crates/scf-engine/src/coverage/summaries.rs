//! How well a subject's controls are described by risk and threat summaries
//!
//! Counts controls whose summary text is non-blank, for the subject and for
//! the whole catalog. No selection is involved.

use super::overlap::Subject;
use super::ratio;
use scf_model::{Catalog, ScfControl};
use serde::Serialize;

/// Subject size against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlStats {
    /// Controls in the subject
    pub subject_controls: usize,
    /// Controls in the catalog
    pub total_controls: usize,
    /// `subject_controls / total_controls` (0-100)
    #[serde(rename = "subject_controls_percent_of_all")]
    pub subject_percent: f64,
}

/// Summary coverage for one dimension (risks or threats)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryCoverage {
    /// Subject controls with a non-blank summary
    pub subject_with_summary: usize,
    /// Catalog controls with a non-blank summary
    pub total_with_summary: usize,
    /// Share of the catalog's summarized controls that are in the subject (0-100)
    pub subject_percent_of_all: f64,
    /// Share of the subject's controls that carry a summary (0-100)
    pub subject_percent_with_summary: f64,
    /// Size of the risk or threat catalog
    pub catalog_items: usize,
}

impl SummaryCoverage {
    fn count(
        subject: &[&ScfControl],
        catalog: &[ScfControl],
        summary: impl Fn(&ScfControl) -> &str,
        catalog_items: usize,
    ) -> Self {
        let has = |c: &ScfControl| !summary(c).trim().is_empty();
        let subject_with_summary = subject.iter().filter(|c| has(c)).count();
        let total_with_summary = catalog.iter().filter(|c| has(c)).count();
        Self {
            subject_with_summary,
            total_with_summary,
            subject_percent_of_all: percent(subject_with_summary, total_with_summary),
            subject_percent_with_summary: percent(subject_with_summary, subject.len()),
            catalog_items,
        }
    }
}

/// Risk and threat summary coverage of a subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskThreatCoverage {
    /// Subject
    pub subject: Subject,
    /// Subject size
    pub control_stats: ControlStats,
    /// Risk summaries
    pub risk_coverage: SummaryCoverage,
    /// Threat summaries
    pub threat_coverage: SummaryCoverage,
    /// One-sentence summary
    pub summary_text: String,
}

/// Risk and threat summary coverage of one subject over the catalog
#[must_use]
pub fn risk_threat_coverage(catalog: &Catalog, subject: Subject) -> RiskThreatCoverage {
    let controls = catalog.controls();
    let members: Vec<&ScfControl> = controls.iter().filter(|c| subject.matches(c)).collect();

    let control_stats = ControlStats {
        subject_controls: members.len(),
        total_controls: controls.len(),
        subject_percent: percent(members.len(), controls.len()),
    };
    let risk_coverage = SummaryCoverage::count(
        &members,
        controls,
        |c| c.risk_threat_summary.as_str(),
        catalog.risks().len(),
    );
    let threat_coverage = SummaryCoverage::count(
        &members,
        controls,
        |c| c.control_threat_summary.as_str(),
        catalog.threats().len(),
    );

    let summary_text = format!(
        "{} uses {} controls ({:.1}% of all SCF controls). {:.1}% of its controls have explicit \
         risk summaries covering {:.1}% of all SCF risk-summarized controls; {:.1}% of its \
         controls have explicit threat summaries covering {:.1}% of all SCF threat-summarized \
         controls.",
        subject.label(),
        control_stats.subject_controls,
        control_stats.subject_percent,
        risk_coverage.subject_percent_with_summary,
        risk_coverage.subject_percent_of_all,
        threat_coverage.subject_percent_with_summary,
        threat_coverage.subject_percent_of_all,
    );

    RiskThreatCoverage {
        subject,
        control_stats,
        risk_coverage,
        threat_coverage,
        summary_text,
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    ratio(part, whole) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use scf_model::{CoreLevel, Framework, ScfRisk};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_controls(vec![
                ScfControl::new("A")
                    .with_framework(Framework::Gdpr)
                    .with_refs(&["R-1"], &["T-1"]),
                ScfControl::new("B")
                    .with_framework(Framework::Gdpr)
                    .with_refs(&["R-2"], &[]),
                ScfControl::new("C").with_refs(&["R-1"], &["T-2"]),
                ScfControl::new("D").with_core(CoreLevel::L2),
            ])
            .with_risks(vec![ScfRisk::new("R-1"), ScfRisk::new("R-2")])
    }

    #[test]
    fn counts_summarized_controls() {
        let result = risk_threat_coverage(&catalog(), Subject::Framework(Framework::Gdpr));

        assert_eq!(result.control_stats.subject_controls, 2);
        assert_eq!(result.control_stats.total_controls, 4);
        assert!((result.control_stats.subject_percent - 50.0).abs() < 1e-9);

        assert_eq!(result.risk_coverage.subject_with_summary, 2);
        assert_eq!(result.risk_coverage.total_with_summary, 3);
        assert!((result.risk_coverage.subject_percent_with_summary - 100.0).abs() < 1e-9);
        assert_eq!(result.risk_coverage.catalog_items, 2);

        assert_eq!(result.threat_coverage.subject_with_summary, 1);
        assert_eq!(result.threat_coverage.total_with_summary, 2);
        assert!((result.threat_coverage.subject_percent_of_all - 50.0).abs() < 1e-9);
        assert_eq!(result.threat_coverage.catalog_items, 0);

        assert!(result.summary_text.starts_with("EU GDPR uses 2 controls (50.0% of all"));
    }

    #[test]
    fn blank_summaries_do_not_count() {
        let mut blank = ScfControl::new("E").with_core(CoreLevel::L2);
        blank.risk_threat_summary = "  \n ".to_string();
        let catalog = Catalog::new().with_controls(vec![blank]);

        let result = risk_threat_coverage(&catalog, Subject::Core(CoreLevel::L2));
        assert_eq!(result.risk_coverage.subject_with_summary, 0);
        assert_eq!(result.risk_coverage.subject_percent_of_all, 0.0);
        assert_eq!(result.threat_coverage.subject_percent_with_summary, 0.0);
    }

    #[test]
    fn empty_catalog_is_zero() {
        let result = risk_threat_coverage(&Catalog::new(), Subject::Mcr);
        assert_eq!(result.control_stats.subject_percent, 0.0);
        assert_eq!(result.control_stats.total_controls, 0);
    }

    #[test]
    fn serializes_subject_and_stats() {
        let result = risk_threat_coverage(&catalog(), Subject::Dsr);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["control_stats"].get("subject_controls_percent_of_all").is_some());
        assert_eq!(json["subject"]["key"], "dsr");
    }
}
