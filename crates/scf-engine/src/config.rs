//! Engine configuration

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configurator engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Settle delay for filter input, in milliseconds
    pub filter_debounce_ms: u64,
    /// Settle delay before coverage follows the selection, in milliseconds
    pub selection_debounce_ms: u64,
    /// Rolling history capacity
    pub history_limit: usize,
    /// Per-item cap on risk/threat references
    pub risk_cap: usize,
    /// Default width of a new timeline window, in months
    pub timeline_span: u32,
    /// Initial timeline axis length, in months
    pub timeline_axis_months: u32,
    /// Latest month a requested window may end on
    pub timeline_max_months: u32,
    /// Where priority control ids are persisted
    pub priority_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With history capacity
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// With risk/threat reference cap
    #[inline]
    #[must_use]
    pub fn with_risk_cap(mut self, cap: usize) -> Self {
        self.risk_cap = cap;
        self
    }

    /// With timeline axis length
    #[inline]
    #[must_use]
    pub fn with_timeline_axis(mut self, months: u32) -> Self {
        self.timeline_axis_months = months;
        self
    }

    /// With the latest month a requested window may end on
    #[inline]
    #[must_use]
    pub fn with_timeline_max(mut self, months: u32) -> Self {
        self.timeline_max_months = months;
        self
    }

    /// With default window width
    #[inline]
    #[must_use]
    pub fn with_timeline_span(mut self, months: u32) -> Self {
        self.timeline_span = months;
        self
    }

    /// With priority file
    #[inline]
    #[must_use]
    pub fn with_priority_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.priority_path = Some(path.into());
        self
    }

    /// Filter settle delay
    #[inline]
    #[must_use]
    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    /// Selection settle delay
    #[inline]
    #[must_use]
    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }

    /// Check the configuration
    ///
    /// # Errors
    /// - `EngineError::Config` when a capacity, cap or span is zero, or the
    ///   month ceiling is below the initial axis
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(EngineError::Config("history_limit must be positive".to_string()));
        }
        if self.risk_cap == 0 {
            return Err(EngineError::Config("risk_cap must be positive".to_string()));
        }
        if self.timeline_span == 0 || self.timeline_axis_months == 0 {
            return Err(EngineError::Config(
                "timeline span and axis must be positive".to_string(),
            ));
        }
        if self.timeline_max_months < self.timeline_axis_months {
            return Err(EngineError::Config(format!(
                "timeline_max_months ({}) is below timeline_axis_months ({})",
                self.timeline_max_months, self.timeline_axis_months
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_debounce_ms: 200,
            selection_debounce_ms: 300,
            history_limit: 10,
            risk_cap: 10,
            timeline_span: 4,
            timeline_axis_months: 24,
            timeline_max_months: 120,
            priority_path: None,
        }
    }
}
