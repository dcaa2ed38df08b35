//! SCF Engine - configurator state, coverage and rollout planning
//!
//! Everything between the loaded catalogs and the frontend:
//! - [`FilterSpec`]: text, weight and flag filters over the controls
//! - [`ConfiguratorState`]: the single reducer for UI and automation changes
//! - [`coverage`]: framework, risk and threat coverage of a selection
//! - [`Timeline`]: goal rows with month windows and "new control" counts
//! - [`automation`]: lenient parsing of chat-originated UI actions
//! - [`ConfiguratorSession`]: debounced async wrapper with event delivery
//! - [`ScfConfigPayload`]: the project bootstrap export
//!
//! # Example
//!
//! ```rust
//! use scf_engine::prelude::*;
//! use scf_model::{Catalog, Framework, ScfControl};
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new()
//!     .with_controls(vec![ScfControl::new("GOV-01").with_framework(Framework::Soc2)]);
//! let mut state = ConfiguratorState::new(Arc::new(catalog), EngineConfig::default());
//!
//! state.reduce(Action::SetCoverage { framework: Framework::Soc2, enabled: true }, Source::User);
//! state.reduce(Action::FiltersSettled, Source::User);
//! assert!(state.selection().contains("GOV-01"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod automation;
pub mod config;
pub mod coverage;
pub mod debounce;
pub mod error;
pub mod export;
pub mod filter;
pub mod priority;
pub mod resolver;
pub mod selection;
pub mod session;
pub mod state;
pub mod timeline;

pub use automation::{plan_batch, SelectMode, UiAction, UiCommand, WindowRequest};
pub use config::EngineConfig;
pub use coverage::{CoverageIndex, CoverageReport, Overlap, RiskThreatCoverage, Subject};
pub use debounce::Debouncer;
pub use error::{EngineError, Result};
pub use export::{ExportRequest, ScfConfigPayload, CONFIG_VERSION};
pub use filter::FilterSpec;
pub use priority::PriorityStore;
pub use resolver::GoalResolver;
pub use selection::{History, HistoryEntry, Selection, Source};
pub use session::{BatchReport, ConfiguratorSession, EventSink, FrontendEvent};
pub use state::{Action, ConfiguratorState, HistorySnapshot, Outcome};
pub use timeline::{DragMode, Goal, MonthWindow, Timeline, WindowMode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a configurator
    pub use crate::{
        Action, ConfiguratorSession, ConfiguratorState, EngineConfig, EngineError, FilterSpec,
        Source, UiAction,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
