//! Paginated catalog loading
//!
//! - [`CatalogLoader::fetch_all`] walks one catalog page by page, in offset
//!   order, since an empty page can end the walk before the reported total
//! - [`CatalogLoader::load_all`] loads all six catalogs concurrently
//!
//! A catalog that fails to load degrades to an empty array with an error
//! string in the [`LoadReport`]; the other catalogs are unaffected.

use crate::config::MAX_PAGE_LIMIT;
use crate::error::Result;
use crate::page::PageBody;
use crate::query::{CatalogKind, CatalogQuery};
use crate::source::CatalogSource;
use scf_model::{
    AssessmentObjective, Catalog, EvidenceRequest, ScfControl, ScfMapping, ScfRisk, ScfThreat,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of loading every catalog
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Whatever loaded; failed catalogs are empty
    pub catalog: Catalog,
    /// Inline error string per failed catalog
    pub errors: BTreeMap<CatalogKind, String>,
}

impl LoadReport {
    /// Whether every catalog loaded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Loads catalogs from a [`CatalogSource`]
#[derive(Debug, Clone)]
pub struct CatalogLoader<S> {
    source: S,
    page_limit: u32,
}

impl<S: CatalogSource> CatalogLoader<S> {
    /// Create a loader requesting the largest allowed pages
    #[inline]
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_limit: MAX_PAGE_LIMIT,
        }
    }

    /// With page size (clamped to 1..=500)
    #[inline]
    #[must_use]
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    /// The underlying source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every row of one catalog
    ///
    /// Stops when the offset reaches the reported total, when a page comes
    /// back empty, or after a bare-array response.
    ///
    /// # Errors
    /// Returns the first page error; rows from earlier pages are discarded.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        kind: CatalogKind,
        query: &CatalogQuery,
    ) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let body = self
                .source
                .fetch_page(kind, query, offset, self.page_limit)
                .await?;

            match PageBody::<T>::decode(&body)? {
                PageBody::Bare(items) => {
                    rows.extend(items);
                    break;
                }
                PageBody::Envelope(page) => {
                    let received = page.items.len();
                    rows.extend(page.items);
                    debug!(catalog = %kind, offset, received, total = page.total, "page decoded");

                    if received == 0 {
                        break;
                    }
                    offset = offset.saturating_add(u32::try_from(received).unwrap_or(u32::MAX));
                    if u64::from(offset) >= page.total {
                        break;
                    }
                }
            }
        }

        Ok(rows)
    }

    /// Load all six catalogs concurrently
    pub async fn load_all(&self) -> LoadReport {
        let query = CatalogQuery::new();
        let (controls, mappings, risks, threats, objectives, requests) = tokio::join!(
            self.fetch_all::<ScfControl>(CatalogKind::Controls, &query),
            self.fetch_all::<ScfMapping>(CatalogKind::Mappings, &query),
            self.fetch_all::<ScfRisk>(CatalogKind::Risks, &query),
            self.fetch_all::<ScfThreat>(CatalogKind::Threats, &query),
            self.fetch_all::<AssessmentObjective>(CatalogKind::AssessmentObjectives, &query),
            self.fetch_all::<EvidenceRequest>(CatalogKind::EvidenceRequests, &query),
        );

        let mut errors = BTreeMap::new();
        let catalog = Catalog::new()
            .with_controls(settle(CatalogKind::Controls, controls, &mut errors))
            .with_mappings(settle(CatalogKind::Mappings, mappings, &mut errors))
            .with_risks(settle(CatalogKind::Risks, risks, &mut errors))
            .with_threats(settle(CatalogKind::Threats, threats, &mut errors))
            .with_assessment_objectives(settle(
                CatalogKind::AssessmentObjectives,
                objectives,
                &mut errors,
            ))
            .with_evidence_requests(settle(CatalogKind::EvidenceRequests, requests, &mut errors));

        info!(
            counts = ?catalog.counts(),
            failed = errors.len(),
            "catalogs loaded"
        );

        LoadReport { catalog, errors }
    }
}

fn settle<T>(
    kind: CatalogKind,
    result: Result<Vec<T>>,
    errors: &mut BTreeMap<CatalogKind, String>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(catalog = %kind, error = %e, "catalog load failed");
            errors.insert(kind, format!("Failed to load {kind}: {e}"));
            Vec::new()
        }
    }
}
