//! Overlap between two coverage subjects

use crate::error::{EngineError, Result};
use scf_model::{normalize_token, Catalog, CoreLevel, Framework, ScfControl};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// A set of controls defined by one catalog flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Controls covering a framework
    Framework(Framework),
    /// Controls in a core level
    Core(CoreLevel),
    /// Minimum control requirements
    Mcr,
    /// Data security requirements
    Dsr,
}

impl Subject {
    /// Subject type name (`framework` or `core_level`)
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Framework(_) => "framework",
            Self::Core(_) | Self::Mcr | Self::Dsr => "core_level",
        }
    }

    /// Flag key (`soc2`, `core_lvl0`, `mcr`, ...)
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Framework(fw) => fw.key(),
            Self::Core(lvl) => lvl.key(),
            Self::Mcr => "mcr",
            Self::Dsr => "dsr",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Framework(fw) => fw.label(),
            Self::Core(lvl) => lvl.label(),
            Self::Mcr => "SCF Minimum Control Requirements (MCR)",
            Self::Dsr => "SCF Data Security Requirements (DSR)",
        }
    }

    /// Parse a `(type, key)` pair
    ///
    /// # Errors
    /// - `EngineError::InvalidSubject` for an unknown type or key
    pub fn parse(subject_type: &str, key: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidSubject(format!("{subject_type}:{key}"));
        match normalize_token(subject_type).as_str() {
            "framework" => Framework::from_token(key).map(Self::Framework).ok_or_else(invalid),
            "core level" | "core" => match normalize_token(key).as_str() {
                "mcr" => Ok(Self::Mcr),
                "dsr" => Ok(Self::Dsr),
                _ => CoreLevel::from_token(key).map(Self::Core).ok_or_else(invalid),
            },
            _ => Err(invalid()),
        }
    }

    /// Whether a control belongs to this subject
    #[must_use]
    pub fn matches(&self, control: &ScfControl) -> bool {
        match self {
            Self::Framework(fw) => control.covers(*fw),
            Self::Core(lvl) => control.in_core(*lvl),
            Self::Mcr => control.is_mcr,
            Self::Dsr => control.is_dsr,
        }
    }

    /// Ids of the catalog controls in this subject
    #[must_use]
    pub fn controls(&self, catalog: &Catalog) -> BTreeSet<String> {
        catalog
            .controls()
            .iter()
            .filter(|c| self.matches(c))
            .map(|c| c.object_id.clone())
            .collect()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name(), self.key())
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Subject", 3)?;
        s.serialize_field("type", self.type_name())?;
        s.serialize_field("key", self.key())?;
        s.serialize_field("label", self.label())?;
        s.end()
    }
}

/// Overlap metrics between two subjects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    /// First subject
    pub subject_a: Subject,
    /// Second subject
    pub subject_b: Subject,
    /// Controls in A
    pub subject_a_controls: usize,
    /// Controls in B
    pub subject_b_controls: usize,
    /// Controls in both
    pub intersection_controls: usize,
    /// Share of B's controls also in A (0-100)
    pub a_covers_b_percent: f64,
    /// Share of A's controls also in B (0-100)
    pub b_covers_a_percent: f64,
    /// One-sentence summary
    pub summary_text: String,
}

/// Compare two subjects over the catalog
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overlap(catalog: &Catalog, a: Subject, b: Subject) -> Overlap {
    let a_ids = a.controls(catalog);
    let b_ids = b.controls(catalog);
    let intersection = a_ids.intersection(&b_ids).count();

    let percent = |part: usize, whole: usize| {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    };
    let a_covers_b = percent(intersection, b_ids.len());
    let b_covers_a = percent(intersection, a_ids.len());

    let summary_text = format!(
        "{} covers {a_covers_b:.1}% of {} controls; {} covers {b_covers_a:.1}% of {} controls.",
        a.label(),
        b.label(),
        b.label(),
        a.label(),
    );

    Overlap {
        subject_a: a,
        subject_b: b,
        subject_a_controls: a_ids.len(),
        subject_b_controls: b_ids.len(),
        intersection_controls: intersection,
        a_covers_b_percent: a_covers_b,
        b_covers_a_percent: b_covers_a,
        summary_text,
    }
}
