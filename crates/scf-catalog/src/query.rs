//! Catalog endpoints and query parameters

use scf_model::{CoreLevel, Framework};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One of the six public SCF catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// SCF controls
    Controls,
    /// Framework ↔ SCF mappings
    Mappings,
    /// Risk catalog
    Risks,
    /// Threat catalog
    Threats,
    /// Assessment objectives
    AssessmentObjectives,
    /// Evidence request list
    EvidenceRequests,
}

impl CatalogKind {
    /// All catalogs in load order
    pub const ALL: [CatalogKind; 6] = [
        CatalogKind::Controls,
        CatalogKind::Mappings,
        CatalogKind::Risks,
        CatalogKind::Threats,
        CatalogKind::AssessmentObjectives,
        CatalogKind::EvidenceRequests,
    ];

    /// Path suffix below the SCF root
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Controls => "",
            Self::Mappings => "/maps",
            Self::Risks => "/risks",
            Self::Threats => "/threats",
            Self::AssessmentObjectives => "/assessment-objectives",
            Self::EvidenceRequests => "/evidence-requests",
        }
    }

    /// Short name used in logs and error reports
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Controls => "controls",
            Self::Mappings => "mappings",
            Self::Risks => "risks",
            Self::Threats => "threats",
            Self::AssessmentObjectives => "assessment_objectives",
            Self::EvidenceRequests => "evidence_requests",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Server-side filters for a catalog request
///
/// Coverage and core flags only apply to the controls catalog; the server
/// ignores parameters it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Free-text search
    pub q: Option<String>,
    /// Extra field filters (`domain`, `cadence`, `framework`, `scf_id`, ...)
    pub params: BTreeMap<String, String>,
    /// `covers_*=true` flags
    pub coverage: BTreeSet<Framework>,
    /// `is_core_*=true` flags
    pub core: BTreeSet<CoreLevel>,
}

impl CatalogQuery {
    /// Unfiltered query
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With free-text search
    #[inline]
    #[must_use]
    pub fn with_q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// With a field filter
    #[inline]
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// With a coverage flag
    #[inline]
    #[must_use]
    pub fn with_coverage(mut self, framework: Framework) -> Self {
        self.coverage.insert(framework);
        self
    }

    /// With a core-level flag
    #[inline]
    #[must_use]
    pub fn with_core(mut self, level: CoreLevel) -> Self {
        self.core.insert(level);
        self
    }

    /// Query-string pairs for one page
    #[must_use]
    pub fn to_pairs(&self, offset: u32, limit: u32) -> Vec<(String, String)> {
        let mut pairs =
            Vec::with_capacity(2 + self.params.len() + self.coverage.len() + self.core.len());

        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            pairs.push(("q".to_string(), q.to_string()));
        }
        for (key, value) in &self.params {
            pairs.push((key.clone(), value.clone()));
        }
        for fw in &self.coverage {
            pairs.push((format!("covers_{}", fw.key()), "true".to_string()));
        }
        for level in &self.core {
            pairs.push((format!("is_{}", level.key()), "true".to_string()));
        }
        pairs.push(("limit".to_string(), limit.to_string()));
        pairs.push(("offset".to_string(), offset.to_string()));
        pairs
    }
}
