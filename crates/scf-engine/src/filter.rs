//! Control filter predicate
//!
//! A control passes when it matches the text query AND the weight floor AND
//! either no flag is set or it carries at least one of the set flags. Flags
//! are disjunctive across the coverage and core groups.

use scf_model::{Catalog, CoreLevel, FilterKey, Framework, ScfControl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter input for the control list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Free-text query; blank matches everything
    pub query: String,
    /// Minimum control weight
    pub min_weight: i32,
    /// Coverage flags turned on
    pub coverage: BTreeSet<Framework>,
    /// Core-level flags turned on
    pub core: BTreeSet<CoreLevel>,
}

impl FilterSpec {
    /// Empty filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With query
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// With minimum weight
    #[inline]
    #[must_use]
    pub fn with_min_weight(mut self, min_weight: i32) -> Self {
        self.min_weight = min_weight;
        self
    }

    /// With a coverage flag
    #[inline]
    #[must_use]
    pub fn with_coverage(mut self, framework: Framework) -> Self {
        self.coverage.insert(framework);
        self
    }

    /// With a core flag
    #[inline]
    #[must_use]
    pub fn with_core(mut self, level: CoreLevel) -> Self {
        self.core.insert(level);
        self
    }

    /// Number of active filters: a non-blank query, a positive weight floor
    /// and each set flag
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(!self.query.trim().is_empty())
            + usize::from(self.min_weight > 0)
            + self.coverage.len()
            + self.core.len()
    }

    /// No filter is active
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Set flags as filter keys, core levels first
    pub fn flag_keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.core
            .iter()
            .copied()
            .map(FilterKey::Core)
            .chain(self.coverage.iter().copied().map(FilterKey::Framework))
    }

    /// Text predicate
    #[must_use]
    pub fn matches_text(&self, control: &ScfControl) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &control.object_id,
            &control.title,
            &control.domain,
            &control.control_description,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Flag predicate: no flags set, or any set flag matches
    #[must_use]
    pub fn matches_flags(&self, control: &ScfControl) -> bool {
        if self.coverage.is_empty() && self.core.is_empty() {
            return true;
        }
        self.coverage.iter().any(|fw| control.covers(*fw))
            || self.core.iter().any(|lvl| control.in_core(*lvl))
    }

    /// Full predicate
    #[must_use]
    pub fn matches(&self, control: &ScfControl) -> bool {
        self.matches_text(control)
            && control.weight >= self.min_weight
            && self.matches_flags(control)
    }

    /// Controls passing the filter, in catalog order
    pub fn apply<'a>(
        &'a self,
        controls: &'a [ScfControl],
    ) -> impl Iterator<Item = &'a ScfControl> + 'a {
        controls.iter().filter(move |c| self.matches(c))
    }

    /// Ids of the controls passing the filter
    #[must_use]
    pub fn filtered_ids(&self, catalog: &Catalog) -> BTreeSet<String> {
        self.apply(catalog.controls())
            .map(|c| c.object_id.clone())
            .collect()
    }

    /// Human-readable list of the active filters
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.active_count());
        let query = self.query.trim();
        if !query.is_empty() {
            out.push(format!("Search: \"{query}\""));
        }
        if self.min_weight > 0 {
            out.push(format!("Min weight: {}", self.min_weight));
        }
        out.extend(self.coverage.iter().map(|fw| fw.mapping_name().to_string()));
        out.extend(self.core.iter().map(|lvl| lvl.label().to_string()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controls() -> Vec<ScfControl> {
        vec![
            ScfControl::new("A").with_weight(5).with_framework(Framework::Soc2),
            ScfControl::new("B").with_weight(15).with_framework(Framework::Gdpr),
            ScfControl::new("C")
                .with_weight(8)
                .with_core(CoreLevel::L0)
                .with_title("Asset Inventory"),
        ]
    }

    fn ids<'a>(it: impl Iterator<Item = &'a ScfControl>) -> Vec<&'a str> {
        it.map(|c| c.object_id.as_str()).collect()
    }

    #[test]
    fn weight_floor() {
        let controls = controls();
        let spec = FilterSpec::new().with_min_weight(10);
        assert_eq!(ids(spec.apply(&controls)), vec!["B"]);
        assert_eq!(spec.active_count(), 1);
    }

    #[test]
    fn flags_are_disjunctive_across_groups() {
        let controls = controls();
        let spec = FilterSpec::new()
            .with_coverage(Framework::Soc2)
            .with_core(CoreLevel::L0);
        assert_eq!(ids(spec.apply(&controls)), vec!["A", "C"]);
        assert_eq!(spec.active_count(), 2);
    }

    #[test]
    fn text_matches_id_title_domain_description() {
        let controls = controls();
        let spec = FilterSpec::new().with_query("  inventory ");
        assert_eq!(ids(spec.apply(&controls)), vec!["C"]);

        let spec = FilterSpec::new().with_query("b");
        assert_eq!(ids(spec.apply(&controls)), vec!["B"]);
    }

    #[test]
    fn empty_spec_passes_everything() {
        let controls = controls();
        let spec = FilterSpec::new().with_query("   ");
        assert!(spec.is_empty());
        assert_eq!(spec.apply(&controls).count(), 3);
    }

    #[test]
    fn describe_lists_active_filters() {
        let spec = FilterSpec::new()
            .with_query("access")
            .with_min_weight(3)
            .with_coverage(Framework::NistCsf)
            .with_core(CoreLevel::L1);
        assert_eq!(
            spec.describe(),
            vec![
                "Search: \"access\"",
                "Min weight: 3",
                "NIST CSF",
                "SCF CORE Level 1 Foundational",
            ]
        );
    }

    #[test]
    fn flag_keys_put_core_first() {
        let spec = FilterSpec::new()
            .with_coverage(Framework::Soc2)
            .with_core(CoreLevel::AiOps);
        assert_eq!(
            spec.flag_keys().collect::<Vec<_>>(),
            vec![FilterKey::Core(CoreLevel::AiOps), FilterKey::Framework(Framework::Soc2)]
        );
    }
}
