//! Goal token resolution
//!
//! Chat-originated tokens ("soc2", "L0", "Core Level 1") resolve in two tiers:
//! first against the goals currently on the timeline, then against the fixed
//! table of every known filter key. A goal therefore need not be materialized
//! before automation can address it.

use crate::timeline::Goal;
use scf_model::{normalize_token, FilterKey};
use std::collections::HashMap;

/// Two-tier goal token resolver
#[derive(Debug, Clone, Default)]
pub struct GoalResolver {
    dynamic: HashMap<String, FilterKey>,
}

impl GoalResolver {
    /// Resolver whose first tier is built from the given goals
    #[must_use]
    pub fn new<'a>(goals: impl IntoIterator<Item = &'a Goal>) -> Self {
        Self::from_keys(goals.into_iter().map(|g| g.key))
    }

    /// Resolver whose first tier is built from goal keys
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = FilterKey>) -> Self {
        let mut dynamic = HashMap::new();
        for key in keys {
            for alias in aliases(key) {
                dynamic.entry(normalize_token(alias)).or_insert(key);
            }
        }
        Self { dynamic }
    }

    /// First tier: current goals only
    #[must_use]
    pub fn resolve_dynamic(&self, token: &str) -> Option<FilterKey> {
        self.dynamic.get(&normalize_token(token)).copied()
    }

    /// Second tier: every known filter key
    #[inline]
    #[must_use]
    pub fn resolve_static(token: &str) -> Option<FilterKey> {
        FilterKey::from_token(token)
    }

    /// Dynamic tier, then static tier
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<FilterKey> {
        self.resolve_dynamic(token)
            .or_else(|| Self::resolve_static(token))
    }
}

fn aliases(key: FilterKey) -> [&'static str; 3] {
    match key {
        FilterKey::Core(lvl) => [lvl.goal_id(), lvl.token(), lvl.label()],
        FilterKey::Framework(fw) => [fw.goal_id(), fw.key(), fw.label()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scf_model::{CoreLevel, Framework};

    #[test]
    fn dynamic_tier_only_knows_current_goals() {
        let resolver = GoalResolver::from_keys([FilterKey::Framework(Framework::Soc2)]);
        assert_eq!(
            resolver.resolve_dynamic("FRAMEWORK_SOC2"),
            Some(FilterKey::Framework(Framework::Soc2))
        );
        assert_eq!(
            resolver.resolve_dynamic("aicpa tsc / soc 2"),
            Some(FilterKey::Framework(Framework::Soc2))
        );
        assert_eq!(resolver.resolve_dynamic("L0"), None);
    }

    #[test]
    fn static_tier_knows_everything() {
        assert_eq!(
            GoalResolver::resolve_static("core-l2"),
            Some(FilterKey::Core(CoreLevel::L2))
        );
        assert_eq!(GoalResolver::resolve_static("pci dss"), None);
    }

    #[test]
    fn falls_back_to_static_tier() {
        let resolver = GoalResolver::default();
        assert_eq!(resolver.resolve("L0"), Some(FilterKey::Core(CoreLevel::L0)));
        assert_eq!(resolver.resolve("nist csf"), Some(FilterKey::Framework(Framework::NistCsf)));
        assert_eq!(resolver.resolve("unknown"), None);
    }
}
