//! SCF Model - typed Secure Controls Framework catalog data
//!
//! Provides the reference data consumed by the configurator:
//! - Controls with coverage and core-level flags
//! - Framework ↔ control mappings
//! - Risk, threat, assessment objective and evidence request catalogs
//! - [`Framework`], [`CoreLevel`] and [`FilterKey`] identities
//!
//! # Example
//!
//! ```rust
//! use scf_model::{Catalog, Framework, ScfControl};
//!
//! let mut control = ScfControl::new("GOV-01");
//! control.covers_soc2 = true;
//!
//! let catalog = Catalog::default().with_controls(vec![control]);
//! assert!(catalog.control("GOV-01").unwrap().covers(Framework::Soc2));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod control;
pub mod error;
pub mod framework;
pub mod reference;

pub use catalog::Catalog;
pub use control::{split_id_list, ScfControl};
pub use error::ModelError;
pub use framework::{normalize_token, CoreLevel, FilterKey, Framework};
pub use reference::{AssessmentObjective, EvidenceRequest, ScfMapping, ScfRisk, ScfThreat};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with SCF catalog data
    pub use crate::{
        Catalog, CoreLevel, FilterKey, Framework, ModelError, ScfControl, ScfMapping, ScfRisk,
        ScfThreat,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
