//! Framework, core-level and filter-key identities
//!
//! Every identity accepts loose human tokens ("soc 2", "core-level-0",
//! "FRAMEWORK_NIST_CSF") through [`normalize_token`], so chat-originated
//! instructions and UI filter keys resolve to the same value.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a loose token for comparison
///
/// Lowercases, treats `-` and `_` as spaces and collapses whitespace.
#[must_use]
pub fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// External frameworks tracked by control coverage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Framework {
    /// AICPA TSC / SOC 2
    Soc2,
    /// EU GDPR
    Gdpr,
    /// US HIPAA
    Hipaa,
    /// ISO/IEC 27001
    Iso27001,
    /// ISO/IEC 42001
    Iso42001,
    /// NIST Cybersecurity Framework
    NistCsf,
    /// NIST AI Risk Management Framework
    NistAiRmf,
}

impl Framework {
    /// All frameworks in display order
    pub const ALL: [Framework; 7] = [
        Framework::Soc2,
        Framework::Gdpr,
        Framework::Hipaa,
        Framework::Iso27001,
        Framework::Iso42001,
        Framework::NistCsf,
        Framework::NistAiRmf,
    ];

    /// Coverage flag key (`covers_<key>` on a control)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Soc2 => "soc2",
            Self::Gdpr => "gdpr",
            Self::Hipaa => "hipaa",
            Self::Iso27001 => "iso27001",
            Self::Iso42001 => "iso42001",
            Self::NistCsf => "nist_csf",
            Self::NistAiRmf => "nist_ai_rmf",
        }
    }

    /// Name used by the framework mapping table
    #[inline]
    #[must_use]
    pub fn mapping_name(&self) -> &'static str {
        match self {
            Self::Soc2 => "SOC2",
            Self::Gdpr => "GDPR",
            Self::Hipaa => "HIPAA",
            Self::Iso27001 => "ISO27001",
            Self::Iso42001 => "ISO42001",
            Self::NistCsf => "NIST CSF",
            Self::NistAiRmf => "NIST AI RMF",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Soc2 => "AICPA TSC / SOC 2",
            Self::Gdpr => "EU GDPR",
            Self::Hipaa => "US HIPAA",
            Self::Iso27001 => "ISO/IEC 27001",
            Self::Iso42001 => "ISO/IEC 42001",
            Self::NistCsf => "NIST Cybersecurity Framework",
            Self::NistAiRmf => "NIST AI RMF",
        }
    }

    /// Timeline goal id
    #[inline]
    #[must_use]
    pub fn goal_id(&self) -> &'static str {
        match self {
            Self::Soc2 => "FRAMEWORK_SOC2",
            Self::Gdpr => "FRAMEWORK_GDPR",
            Self::Hipaa => "FRAMEWORK_HIPAA",
            Self::Iso27001 => "FRAMEWORK_ISO27001",
            Self::Iso42001 => "FRAMEWORK_ISO42001",
            Self::NistCsf => "FRAMEWORK_NIST_CSF",
            Self::NistAiRmf => "FRAMEWORK_NIST_AI_RMF",
        }
    }

    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Soc2 => &["soc 2", "aicpa", "tsc"],
            Self::Gdpr => &["eu gdpr"],
            Self::Hipaa => &["us hipaa", "hitech"],
            Self::Iso27001 => &["iso 27001"],
            Self::Iso42001 => &["iso 42001"],
            Self::NistCsf => &["csf"],
            Self::NistAiRmf => &["ai rmf"],
        }
    }

    /// Resolve a loose token ("soc 2", "FRAMEWORK_SOC2", "nist-csf")
    #[must_use]
    pub fn from_token(raw: &str) -> Option<Self> {
        let key = normalize_token(raw);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|fw| {
            [fw.key(), fw.mapping_name(), fw.label(), fw.goal_id()]
                .iter()
                .chain(fw.synonyms())
                .any(|alias| normalize_token(alias) == key)
        })
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mapping_name())
    }
}

impl FromStr for Framework {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ModelError::UnknownFramework(s.to_string()))
    }
}

/// SCF core-level tiers, independent of framework coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoreLevel {
    /// Level 0: fundamentals
    L0,
    /// Level 1: foundational
    L1,
    /// Level 2: critical infrastructure
    L2,
    /// AI-enabled operations
    AiOps,
}

impl CoreLevel {
    /// All core levels in display order
    pub const ALL: [CoreLevel; 4] = [CoreLevel::L0, CoreLevel::L1, CoreLevel::L2, CoreLevel::AiOps];

    /// Core flag key (`is_<key>` on a control)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::L0 => "core_lvl0",
            Self::L1 => "core_lvl1",
            Self::L2 => "core_lvl2",
            Self::AiOps => "core_ai_ops",
        }
    }

    /// Short token used by the chat agent
    #[inline]
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            Self::L0 => "L0",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::AiOps => "AI_OPS",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::L0 => "SCF CORE Level 0 Fundamentals",
            Self::L1 => "SCF CORE Level 1 Foundational",
            Self::L2 => "SCF CORE Level 2 Critical Infrastructure",
            Self::AiOps => "SCF CORE AI-Enabled Operations",
        }
    }

    /// Timeline goal id
    #[inline]
    #[must_use]
    pub fn goal_id(&self) -> &'static str {
        match self {
            Self::L0 => "CORE_L0",
            Self::L1 => "CORE_L1",
            Self::L2 => "CORE_L2",
            Self::AiOps => "CORE_AI_OPS",
        }
    }

    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::L0 => &["core level 0", "level 0", "core lvl 0", "lvl0"],
            Self::L1 => &["core level 1", "level 1", "core lvl 1", "lvl1"],
            Self::L2 => &["core level 2", "level 2", "core lvl 2", "lvl2"],
            Self::AiOps => &["ai ops", "aiops", "core ai ops"],
        }
    }

    /// Resolve a loose token ("L0", "core level 0", "CORE_AI_OPS")
    #[must_use]
    pub fn from_token(raw: &str) -> Option<Self> {
        let key = normalize_token(raw);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|lvl| {
            [lvl.key(), lvl.token(), lvl.label(), lvl.goal_id()]
                .iter()
                .chain(lvl.synonyms())
                .any(|alias| normalize_token(alias) == key)
        })
    }
}

impl fmt::Display for CoreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CoreLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ModelError::UnknownCoreLevel(s.to_string()))
    }
}

/// Identity of a flag filter, and of the timeline goal it produces
///
/// Core levels order before frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterKey {
    /// Core-level filter
    Core(CoreLevel),
    /// Framework coverage filter
    Framework(Framework),
}

impl FilterKey {
    /// Canonical goal id (`CORE_L0`, `FRAMEWORK_SOC2`, ...)
    #[inline]
    #[must_use]
    pub fn goal_id(&self) -> &'static str {
        match self {
            Self::Core(lvl) => lvl.goal_id(),
            Self::Framework(fw) => fw.goal_id(),
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Core(lvl) => lvl.label(),
            Self::Framework(fw) => fw.label(),
        }
    }

    /// All filter keys, core levels first
    pub fn all() -> impl Iterator<Item = FilterKey> {
        CoreLevel::ALL
            .into_iter()
            .map(FilterKey::Core)
            .chain(Framework::ALL.into_iter().map(FilterKey::Framework))
    }

    /// Resolve a loose token, trying core levels before frameworks
    #[must_use]
    pub fn from_token(raw: &str) -> Option<Self> {
        CoreLevel::from_token(raw)
            .map(Self::Core)
            .or_else(|| Framework::from_token(raw).map(Self::Framework))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.goal_id())
    }
}

impl FromStr for FilterKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ModelError::UnknownFilterKey(s.to_string()))
    }
}

impl TryFrom<String> for FilterKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterKey> for String {
    fn from(key: FilterKey) -> Self {
        key.goal_id().to_string()
    }
}

impl From<Framework> for FilterKey {
    fn from(fw: Framework) -> Self {
        Self::Framework(fw)
    }
}

impl From<CoreLevel> for FilterKey {
    fn from(lvl: CoreLevel) -> Self {
        Self::Core(lvl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_token("  NIST-AI_rmf "), "nist ai rmf");
        assert_eq!(normalize_token("Core   Level\t0"), "core level 0");
        assert_eq!(normalize_token(""), "");
    }

    #[test]
    fn framework_from_loose_tokens() {
        assert_eq!(Framework::from_token("soc2"), Some(Framework::Soc2));
        assert_eq!(Framework::from_token("SOC 2"), Some(Framework::Soc2));
        assert_eq!(Framework::from_token("FRAMEWORK_SOC2"), Some(Framework::Soc2));
        assert_eq!(Framework::from_token("nist-csf"), Some(Framework::NistCsf));
        assert_eq!(Framework::from_token("NIST AI RMF"), Some(Framework::NistAiRmf));
        assert_eq!(Framework::from_token("iso 27001"), Some(Framework::Iso27001));
        assert_eq!(Framework::from_token("pci"), None);
        assert_eq!(Framework::from_token("  "), None);
    }

    #[test]
    fn core_level_from_loose_tokens() {
        assert_eq!(CoreLevel::from_token("L0"), Some(CoreLevel::L0));
        assert_eq!(CoreLevel::from_token("core level 1"), Some(CoreLevel::L1));
        assert_eq!(CoreLevel::from_token("core_lvl2"), Some(CoreLevel::L2));
        assert_eq!(CoreLevel::from_token("AI_OPS"), Some(CoreLevel::AiOps));
        assert_eq!(CoreLevel::from_token("CORE_AI_OPS"), Some(CoreLevel::AiOps));
        assert_eq!(CoreLevel::from_token("L3"), None);
    }

    #[test]
    fn filter_key_round_trips_through_goal_id() {
        for key in FilterKey::all() {
            let parsed: FilterKey = key.goal_id().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn filter_key_serializes_as_goal_id() {
        let json = serde_json::to_string(&FilterKey::Core(CoreLevel::L0)).unwrap();
        assert_eq!(json, "\"CORE_L0\"");

        let key: FilterKey = serde_json::from_str("\"FRAMEWORK_GDPR\"").unwrap();
        assert_eq!(key, FilterKey::Framework(Framework::Gdpr));

        assert!(serde_json::from_str::<FilterKey>("\"bogus\"").is_err());
    }

    #[test]
    fn core_orders_before_framework() {
        let mut keys: Vec<FilterKey> = FilterKey::all().collect();
        keys.reverse();
        keys.sort();
        assert_eq!(keys[0], FilterKey::Core(CoreLevel::L0));
        assert_eq!(keys[4], FilterKey::Framework(Framework::Soc2));
    }

    #[test]
    fn display_uses_short_names() {
        assert_eq!(Framework::NistCsf.to_string(), "NIST CSF");
        assert_eq!(CoreLevel::AiOps.to_string(), "AI_OPS");
        assert_eq!(FilterKey::Framework(Framework::Hipaa).to_string(), "FRAMEWORK_HIPAA");
    }
}
