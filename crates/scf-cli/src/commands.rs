//! Subcommand implementations
//!
//! Everything here works on an in-memory [`Catalog`] so it can be driven
//! from tests without a catalog server; only [`load_catalog`] touches the
//! network.

use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use scf_catalog::{CatalogLoader, HttpSource, LoadReport};
use scf_engine::coverage::{overlap, risk_threat_coverage, Overlap, RiskThreatCoverage, Subject};
use scf_engine::{
    Action, BatchReport, ConfiguratorSession, ConfiguratorState, CoverageReport, EngineConfig,
    HistorySnapshot, Source, UiAction,
};
use scf_model::{Catalog, CoreLevel, Framework};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch all six catalogs
///
/// # Errors
/// Returns an error only if the HTTP client cannot be built; per-catalog
/// failures are reported in [`LoadReport::errors`].
pub async fn load_catalog(config: &AppConfig) -> Result<LoadReport> {
    let source = HttpSource::new(config.catalog.clone()).context("failed to build catalog client")?;
    let loader = CatalogLoader::new(source).with_page_limit(config.catalog.page_limit);
    let report = loader.load_all().await;
    for (kind, error) in &report.errors {
        warn!(%kind, %error, "catalog unavailable");
    }
    Ok(report)
}

/// Filter and selection flags shared by several subcommands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Coverage framework tokens
    pub coverage: Vec<String>,
    /// Core level tokens
    pub core: Vec<String>,
    /// Weight floor
    pub min_weight: Option<i32>,
    /// Text query
    pub query: Option<String>,
    /// Extra control ids to select after filtering
    pub select: Vec<String>,
    /// Control ids to mark as priority
    pub priority: Vec<String>,
}

impl FilterArgs {
    fn action(&self) -> Result<Option<Action>> {
        let coverage = self
            .coverage
            .iter()
            .map(|t| t.parse::<Framework>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let core = self
            .core
            .iter()
            .map(|t| t.parse::<CoreLevel>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if coverage.is_empty()
            && core.is_empty()
            && self.min_weight.is_none()
            && self.query.is_none()
        {
            return Ok(None);
        }
        Ok(Some(Action::MergeFilters {
            coverage,
            core,
            min_weight: self.min_weight,
            query: self.query.clone(),
        }))
    }
}

/// Build a settled configurator state from command-line filters
///
/// # Errors
/// Returns an error for an unknown framework or core level token.
pub fn configure(
    catalog: Arc<Catalog>,
    engine: EngineConfig,
    args: &FilterArgs,
) -> Result<ConfiguratorState> {
    let mut state = ConfiguratorState::new(catalog, engine);
    if let Some(action) = args.action()? {
        state.reduce(action, Source::User);
        state.reduce(Action::FiltersSettled, Source::User);
    }
    if !args.select.is_empty() {
        let outcome = state.reduce(Action::SelectIds(args.select.clone()), Source::User);
        for id in outcome.rejected {
            warn!(%id, "unknown control id");
        }
    }
    for id in &args.priority {
        let outcome = state.reduce(Action::TogglePriority(id.clone()), Source::User);
        for id in outcome.rejected {
            warn!(%id, "unknown priority control id");
        }
    }
    state.reduce(Action::SelectionSettled, Source::User);
    Ok(state)
}

/// Parse a `type:key` subject, e.g. `framework:soc2` or `core_level:mcr`
///
/// # Errors
/// Returns an error when the separator is missing or the subject is unknown.
pub fn parse_subject(raw: &str) -> Result<Subject> {
    let Some((subject_type, key)) = raw.split_once(':') else {
        bail!("expected <type>:<key>, got {raw:?}");
    };
    Ok(Subject::parse(subject_type, key)?)
}

/// Overlap between two `type:key` subjects
///
/// # Errors
/// Returns an error for an unparseable subject.
pub fn overlap_subjects(catalog: &Catalog, a: &str, b: &str) -> Result<Overlap> {
    Ok(overlap(catalog, parse_subject(a)?, parse_subject(b)?))
}

/// Risk and threat summary coverage of a `type:key` subject
///
/// # Errors
/// Returns an error for an unparseable subject.
pub fn risk_threat_subject(catalog: &Catalog, subject: &str) -> Result<RiskThreatCoverage> {
    Ok(risk_threat_coverage(catalog, parse_subject(subject)?))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionFile {
    Batch(Vec<UiAction>),
    Wrapped {
        #[serde(rename = "uiActions", alias = "ui_actions")]
        ui_actions: Vec<UiAction>,
    },
}

/// Parse a UI action batch: a bare array or `{"uiActions": [...]}`
///
/// # Errors
/// Returns an error when the document is neither shape.
pub fn parse_actions(raw: &str) -> Result<Vec<UiAction>> {
    let file: ActionFile = serde_json::from_str(raw).context("invalid ui action batch")?;
    Ok(match file {
        ActionFile::Batch(actions) | ActionFile::Wrapped { ui_actions: actions } => actions,
    })
}

/// Apply a UI action batch to a configured state and settle it
pub async fn automate(
    state: ConfiguratorState,
    actions: &[UiAction],
) -> (ConfiguratorSession, BatchReport, HistorySnapshot) {
    let session = ConfiguratorSession::new(state);
    let report = session.apply_ui_actions(actions).await;
    session.flush().await;
    info!(applied = report.applied, ignored = report.ignored, "automation batch settled");
    let snapshot = session.snapshot();
    (session, report, snapshot)
}

/// Human-readable coverage table
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_coverage(report: &CoverageReport, selected: usize) -> String {
    let pct = |ratio: f64| (ratio * 100.0).round() as u32;
    let mut out = String::new();
    let _ = writeln!(out, "Selected controls: {selected}");
    let _ = writeln!(out);
    for fw in &report.frameworks {
        let _ = writeln!(
            out,
            "  {:<32} {:>4}/{:<4} {:>3}%",
            fw.framework.label(),
            fw.selected_mapped,
            fw.mapped,
            pct(fw.ratio)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Risks:   {}/{} referenced, score {} ({}%)",
        report.risks.referenced,
        report.risks.total,
        report.risks.score,
        pct(report.risks.ratio)
    );
    let _ = writeln!(
        out,
        "  Threats: {}/{} referenced, score {} ({}%)",
        report.threats.referenced,
        report.threats.total,
        report.threats.score,
        pct(report.threats.ratio)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_subject_requires_separator() {
        assert!(parse_subject("framework").is_err());
        assert_eq!(parse_subject("framework:soc2").unwrap(), Subject::Framework(Framework::Soc2));
    }

    #[test]
    fn parse_actions_accepts_both_shapes() {
        let bare = r#"[{"scope":"scf","target":"scf","type":"ui.reset_timeline"}]"#;
        let wrapped =
            r#"{"uiActions":[{"scope":"scf","target":"scf","type":"ui.reset_timeline"}]}"#;
        assert_eq!(parse_actions(bare).unwrap(), parse_actions(wrapped).unwrap());
        assert!(parse_actions(r#"{"actions": []}"#).is_err());
    }

    #[test]
    fn unknown_framework_token_fails() {
        let args = FilterArgs {
            coverage: vec!["pci".to_string()],
            ..FilterArgs::default()
        };
        assert!(configure(Arc::new(Catalog::new()), EngineConfig::default(), &args).is_err());
    }
}
