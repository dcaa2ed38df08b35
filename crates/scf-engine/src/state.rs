//! Configurator state machine
//!
//! Every change, whether from a click or a chat-originated UI action, goes
//! through [`ConfiguratorState::reduce`]. The reducer is synchronous and
//! never waits: settling filters and refreshing coverage are explicit
//! actions ([`Action::FiltersSettled`], [`Action::SelectionSettled`]) that
//! the session schedules after its debounce delays.

use crate::automation::{SelectMode, UiCommand, WindowRequest};
use crate::config::EngineConfig;
use crate::coverage::{self, CoverageIndex, CoverageReport};
use crate::export::{ExportRequest, ScfConfigPayload};
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::resolver::GoalResolver;
use crate::selection::{History, HistoryEntry, Selection, Source};
use crate::timeline::{DragMode, Goal, MonthWindow, Timeline, TimelineSnapshot, WindowMode};
use chrono::{DateTime, Utc};
use scf_model::{Catalog, CoreLevel, FilterKey, Framework, ScfControl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// A state transition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the text query
    SetQuery(String),
    /// Replace the weight floor
    SetMinWeight(i32),
    /// Turn a coverage flag on or off
    SetCoverage {
        /// Flag
        framework: Framework,
        /// New state
        enabled: bool,
    },
    /// Turn a core flag on or off
    SetCore {
        /// Flag
        level: CoreLevel,
        /// New state
        enabled: bool,
    },
    /// Turn named flags on; set weight and query when given
    MergeFilters {
        /// Coverage flags to turn on
        coverage: Vec<Framework>,
        /// Core flags to turn on
        core: Vec<CoreLevel>,
        /// New weight floor
        min_weight: Option<i32>,
        /// New query
        query: Option<String>,
    },
    /// Clear every filter and the selection
    ResetFiltersAndSelection,
    /// Filter input has settled; apply the selection policy
    FiltersSettled,
    /// Flip one control
    ToggleControl(String),
    /// Add explicit controls
    SelectIds(Vec<String>),
    /// Select the filtered set at the next filter settle
    SelectAllFiltered,
    /// Selection has settled; refresh coverage
    SelectionSettled,
    /// Drag a goal bar
    DragGoal {
        /// Goal
        goal: FilterKey,
        /// Handle
        mode: DragMode,
        /// Months moved
        delta: i32,
    },
    /// Move a goal row
    MoveGoalRow {
        /// Goal
        goal: FilterKey,
        /// New position
        to_index: usize,
    },
    /// Store goal windows named by loose tokens
    SetTimelineWindows {
        /// Merge or replace
        mode: WindowMode,
        /// Windows
        windows: Vec<WindowRequest>,
    },
    /// Put goals named by loose tokens first
    SetTimelineOrder(Vec<String>),
    /// Forget windows and row order
    ResetTimeline,
    /// Flip a control's priority mark
    TogglePriority(String),
}

impl From<UiCommand> for Action {
    fn from(command: UiCommand) -> Self {
        match command {
            UiCommand::SetFilters {
                coverage,
                core,
                min_weight,
                query,
            } => Self::MergeFilters {
                coverage,
                core,
                min_weight,
                query,
            },
            UiCommand::SelectControls(SelectMode::AllFiltered) => Self::SelectAllFiltered,
            UiCommand::SelectControls(SelectMode::Ids(ids)) => Self::SelectIds(ids),
            UiCommand::SetTimelineWindows { mode, windows } => {
                Self::SetTimelineWindows { mode, windows }
            }
            UiCommand::SetTimelineOrder(order) => Self::SetTimelineOrder(order),
            UiCommand::ResetTimeline => Self::ResetTimeline,
            UiCommand::ResetFiltersAndSelection => Self::ResetFiltersAndSelection,
        }
    }
}

/// What a transition changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Filter input changed
    pub filters_changed: bool,
    /// A filter settle should be scheduled
    pub needs_filter_settle: bool,
    /// Selected set changed
    pub selection_changed: bool,
    /// Coverage was recomputed
    pub coverage_changed: bool,
    /// Goal rows or windows changed
    pub timeline_changed: bool,
    /// A history entry was added
    pub history_changed: bool,
    /// Priority marks changed
    pub priority_changed: bool,
    /// Ids or tokens that were refused
    pub rejected: Vec<String>,
}

impl Outcome {
    /// Whether listeners should get a fresh snapshot
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.filters_changed
            || self.selection_changed
            || self.timeline_changed
            || self.history_changed
    }

    /// Fold another outcome into this one
    pub fn merge(&mut self, other: Outcome) {
        self.filters_changed |= other.filters_changed;
        self.needs_filter_settle |= other.needs_filter_settle;
        self.selection_changed |= other.selection_changed;
        self.coverage_changed |= other.coverage_changed;
        self.timeline_changed |= other.timeline_changed;
        self.history_changed |= other.history_changed;
        self.priority_changed |= other.priority_changed;
        self.rejected.extend(other.rejected);
    }
}

/// Full state snapshot sent to listeners after every visible change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// History, oldest first
    pub history: Vec<HistoryEntry>,
    /// Active filters, human-readable
    pub active_filters: Vec<String>,
    /// Selected control count
    pub selected_count: usize,
    /// Snapshot time
    pub timestamp: DateTime<Utc>,
    /// Timeline rows, when any goal exists
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeline: Option<TimelineSnapshot>,
}

/// Configurator state
#[derive(Debug, Clone)]
pub struct ConfiguratorState {
    catalog: Arc<Catalog>,
    index: CoverageIndex,
    config: EngineConfig,
    filters: FilterSpec,
    settled_filters: FilterSpec,
    filter_source: Source,
    pending_all_filtered: bool,
    selection: Selection,
    settled_selection: BTreeSet<String>,
    coverage: CoverageReport,
    history: History,
    timeline: Timeline,
    goals: Vec<Goal>,
    priorities: BTreeSet<String>,
}

impl ConfiguratorState {
    /// Fresh state over a catalog
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let index = CoverageIndex::new(&catalog);
        let coverage = coverage::compute(&catalog, &index, &BTreeSet::new(), config.risk_cap);
        Self {
            index,
            coverage,
            filters: FilterSpec::default(),
            settled_filters: FilterSpec::default(),
            filter_source: Source::User,
            pending_all_filtered: false,
            selection: Selection::new(),
            settled_selection: BTreeSet::new(),
            history: History::new(config.history_limit),
            timeline: Timeline::new(config.timeline_axis_months, config.timeline_span),
            goals: Vec::new(),
            priorities: BTreeSet::new(),
            catalog,
            config,
        }
    }

    /// With persisted priority marks
    #[must_use]
    pub fn with_priorities(mut self, priorities: BTreeSet<String>) -> Self {
        self.priorities = priorities;
        self
    }

    /// Swap in a (re)loaded catalog
    ///
    /// Selected ids missing from the new catalog are dropped; coverage and
    /// goals are recomputed.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) -> Outcome {
        self.index = CoverageIndex::new(&catalog);
        self.catalog = catalog;

        let kept: BTreeSet<String> = self
            .selection
            .ids()
            .iter()
            .filter(|id| self.catalog.contains_control(id))
            .cloned()
            .collect();
        let selection_changed = self.selection.replace(kept);
        self.settled_selection
            .retain(|id| self.catalog.contains_control(id));

        let mut out = Outcome {
            selection_changed,
            ..Outcome::default()
        };
        out.merge(self.refresh_coverage());
        out.timeline_changed |= self.replan();
        out
    }

    /// Apply one action
    pub fn reduce(&mut self, action: Action, source: Source) -> Outcome {
        debug!(?action, %source, "reduce");
        match action {
            Action::SetQuery(query) => self.edit_filters(source, |f| {
                f.query = query;
            }),
            Action::SetMinWeight(min_weight) => self.edit_filters(source, |f| {
                f.min_weight = min_weight;
            }),
            Action::SetCoverage { framework, enabled } => self.edit_filters(source, |f| {
                if enabled {
                    f.coverage.insert(framework);
                } else {
                    f.coverage.remove(&framework);
                }
            }),
            Action::SetCore { level, enabled } => self.edit_filters(source, |f| {
                if enabled {
                    f.core.insert(level);
                } else {
                    f.core.remove(&level);
                }
            }),
            Action::MergeFilters {
                coverage,
                core,
                min_weight,
                query,
            } => self.edit_filters(source, |f| {
                f.coverage.extend(coverage);
                f.core.extend(core);
                if let Some(w) = min_weight {
                    f.min_weight = w;
                }
                if let Some(q) = query {
                    f.query = q;
                }
            }),
            Action::ResetFiltersAndSelection => self.reset_filters_and_selection(source),
            Action::FiltersSettled => self.settle_filters(),
            Action::ToggleControl(id) => self.toggle_control(&id, source),
            Action::SelectIds(ids) => self.select_ids(ids, source),
            Action::SelectAllFiltered => {
                self.pending_all_filtered = true;
                self.history.record("Select all filtered controls", source);
                Outcome {
                    needs_filter_settle: true,
                    history_changed: true,
                    ..Outcome::default()
                }
            }
            Action::SelectionSettled => self.refresh_coverage(),
            Action::DragGoal { goal, mode, delta } => match self.timeline.drag(goal, mode, delta) {
                Ok(_) => {
                    self.replan();
                    Outcome {
                        timeline_changed: true,
                        ..Outcome::default()
                    }
                }
                Err(e) => rejected(e.to_string()),
            },
            Action::MoveGoalRow { goal, to_index } => match self.timeline.move_row(goal, to_index) {
                Ok(()) => {
                    self.replan();
                    Outcome {
                        timeline_changed: true,
                        ..Outcome::default()
                    }
                }
                Err(e) => rejected(e.to_string()),
            },
            Action::SetTimelineWindows { mode, windows } => {
                self.set_timeline_windows(mode, &windows, source)
            }
            Action::SetTimelineOrder(tokens) => self.set_timeline_order(&tokens, source),
            Action::ResetTimeline => {
                self.timeline.reset();
                self.replan();
                self.history.record("Reset timeline", source);
                Outcome {
                    timeline_changed: true,
                    history_changed: true,
                    ..Outcome::default()
                }
            }
            Action::TogglePriority(id) => {
                if !self.catalog.contains_control(&id) {
                    return rejected(id);
                }
                if !self.priorities.remove(&id) {
                    self.priorities.insert(id);
                }
                Outcome {
                    priority_changed: true,
                    ..Outcome::default()
                }
            }
        }
    }

    fn edit_filters(&mut self, source: Source, edit: impl FnOnce(&mut FilterSpec)) -> Outcome {
        let before = self.filters.clone();
        edit(&mut self.filters);
        if self.filters == before {
            return Outcome::default();
        }
        self.filter_source = source;
        Outcome {
            filters_changed: true,
            needs_filter_settle: true,
            ..Outcome::default()
        }
    }

    fn settle_filters(&mut self) -> Outcome {
        let spec = self.filters.clone();
        let changed = spec != self.settled_filters;
        let mut out = Outcome::default();

        if spec.is_empty() {
            out.selection_changed = self.selection.clear();
            self.pending_all_filtered = false;
        } else if changed || self.pending_all_filtered {
            out.selection_changed = self.selection.replace(spec.filtered_ids(&self.catalog));
            self.pending_all_filtered = false;
        }

        if changed {
            let described = spec.describe();
            let action = if described.is_empty() {
                "Cleared filters".to_string()
            } else {
                format!("Filters: {}", described.join(", "))
            };
            self.history.record(action, self.filter_source);
            out.history_changed = true;
        }

        self.settled_filters = spec;
        out.timeline_changed = self.replan();
        out
    }

    fn reset_filters_and_selection(&mut self, source: Source) -> Outcome {
        let filters_changed = self.filters != FilterSpec::default();
        self.filters = FilterSpec::default();
        self.settled_filters = FilterSpec::default();
        self.pending_all_filtered = false;
        let selection_changed = self.selection.clear();
        self.history.record("Reset filters and selection", source);

        Outcome {
            filters_changed,
            selection_changed,
            timeline_changed: self.replan(),
            history_changed: true,
            ..Outcome::default()
        }
    }

    fn toggle_control(&mut self, id: &str, source: Source) -> Outcome {
        if !self.catalog.contains_control(id) {
            return rejected(id.to_string());
        }
        let selected = self.selection.toggle(id);
        let verb = if selected { "Selected" } else { "Deselected" };
        self.history.record(format!("{verb} {id}"), source);
        Outcome {
            selection_changed: true,
            history_changed: true,
            timeline_changed: self.replan(),
            ..Outcome::default()
        }
    }

    fn select_ids(&mut self, ids: Vec<String>, source: Source) -> Outcome {
        let (known, unknown): (Vec<String>, Vec<String>) = ids
            .into_iter()
            .partition(|id| self.catalog.contains_control(id));
        let mut out = Outcome {
            rejected: unknown,
            ..Outcome::default()
        };

        let added = self.selection.extend(known);
        if added > 0 {
            let noun = if added == 1 { "control" } else { "controls" };
            self.history.record(format!("Selected {added} {noun}"), source);
            out.selection_changed = true;
            out.history_changed = true;
            out.timeline_changed = self.replan();
        }
        out
    }

    fn set_timeline_windows(
        &mut self,
        mode: WindowMode,
        windows: &[WindowRequest],
        source: Source,
    ) -> Outcome {
        let resolver = GoalResolver::new(&self.goals);
        let mut out = Outcome::default();
        let mut resolved = Vec::with_capacity(windows.len());
        let ceiling = self.config.timeline_max_months;
        for w in windows {
            if w.start_month >= ceiling || w.end_month > ceiling {
                debug!(
                    goal = %w.goal,
                    start = w.start_month,
                    end = w.end_month,
                    ceiling,
                    "timeline window out of range"
                );
                out.rejected.push(w.goal.clone());
                continue;
            }
            match resolver.resolve(&w.goal) {
                Some(key) => resolved.push((key, MonthWindow::new(w.start_month, w.end_month))),
                None => {
                    debug!(goal = %w.goal, "unresolvable timeline goal");
                    out.rejected.push(w.goal.clone());
                }
            }
        }
        if resolved.is_empty() && (mode == WindowMode::Merge || !windows.is_empty()) {
            return out;
        }

        self.timeline.set_windows(mode, &resolved);
        self.replan();
        let mode_name = match mode {
            WindowMode::Merge => "merge",
            WindowMode::Replace => "replace",
        };
        self.history
            .record(format!("Set timeline windows ({mode_name}, {})", resolved.len()), source);
        out.timeline_changed = true;
        out.history_changed = true;
        out
    }

    fn set_timeline_order(&mut self, tokens: &[String], source: Source) -> Outcome {
        let resolver = GoalResolver::new(&self.goals);
        let mut out = Outcome::default();
        let mut keys = Vec::with_capacity(tokens.len());
        for token in tokens {
            match resolver.resolve(token) {
                Some(key) => keys.push(key),
                None => out.rejected.push(token.clone()),
            }
        }
        if keys.is_empty() {
            return out;
        }

        self.timeline.set_order(&keys);
        self.replan();
        self.history.record("Reordered timeline", source);
        out.timeline_changed = true;
        out.history_changed = true;
        out
    }

    fn refresh_coverage(&mut self) -> Outcome {
        self.settled_selection = self.selection.ids().clone();
        let report = coverage::compute(
            &self.catalog,
            &self.index,
            &self.settled_selection,
            self.config.risk_cap,
        );
        let coverage_changed = report != self.coverage;
        self.coverage = report;
        Outcome {
            coverage_changed,
            ..Outcome::default()
        }
    }

    fn replan(&mut self) -> bool {
        let flags: Vec<FilterKey> = self.settled_filters.flag_keys().collect();
        let goals = self
            .timeline
            .plan(&flags, &self.catalog, self.selection.ids());
        let changed = goals != self.goals;
        self.goals = goals;
        changed
    }

    /// Loaded catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live filter input
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Filter spec as of the last settle
    #[inline]
    #[must_use]
    pub fn settled_filters(&self) -> &FilterSpec {
        &self.settled_filters
    }

    /// Whether filter input has changed since the last settle
    #[must_use]
    pub fn is_filter_pending(&self) -> bool {
        self.filters != self.settled_filters || self.pending_all_filtered
    }

    /// Controls passing the live filter
    pub fn filtered_controls(&self) -> impl Iterator<Item = &ScfControl> {
        self.filters.apply(self.catalog.controls())
    }

    /// Current selection
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selection as of the last coverage refresh
    #[inline]
    #[must_use]
    pub fn settled_selection(&self) -> &BTreeSet<String> {
        &self.settled_selection
    }

    /// Coverage of the settled selection
    #[inline]
    #[must_use]
    pub fn coverage(&self) -> &CoverageReport {
        &self.coverage
    }

    /// History log
    #[inline]
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current goal rows in display order
    #[inline]
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Timeline store
    #[inline]
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Priority marks
    #[inline]
    #[must_use]
    pub fn priorities(&self) -> &BTreeSet<String> {
        &self.priorities
    }

    /// Full snapshot for listeners
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            history: self.history.entries().cloned().collect(),
            active_filters: self.filters.describe(),
            selected_count: self.selection.len(),
            timestamp: Utc::now(),
            timeline: if self.goals.is_empty() {
                None
            } else {
                Some(self.timeline.snapshot(&self.goals))
            },
        }
    }

    /// Build the project bootstrap payload
    ///
    /// # Errors
    /// - `EngineError::Export` for a blank project name or an empty selection
    pub fn export(
        &self,
        request: &ExportRequest,
        generated_at: DateTime<Utc>,
    ) -> Result<ScfConfigPayload> {
        ScfConfigPayload::build(
            &self.catalog,
            self.selection.ids(),
            &self.priorities,
            &self.goals,
            self.timeline.axis_months(),
            request,
            generated_at,
        )
    }
}

fn rejected(what: String) -> Outcome {
    Outcome {
        rejected: vec![what],
        ..Outcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> ConfiguratorState {
        let catalog = Catalog::new().with_controls(vec![
            ScfControl::new("A").with_weight(5).with_framework(Framework::Soc2),
            ScfControl::new("B").with_weight(15).with_framework(Framework::Gdpr),
            ScfControl::new("C").with_weight(9).with_core(CoreLevel::L0),
        ]);
        ConfiguratorState::new(Arc::new(catalog), EngineConfig::default())
    }

    const USER: Source = Source::User;

    fn selected(state: &ConfiguratorState) -> Vec<&str> {
        state.selection().ids().iter().map(String::as_str).collect()
    }

    #[test]
    fn settle_selects_filtered_set() {
        let mut state = state();
        let out = state.reduce(Action::SetMinWeight(10), Source::User);
        assert!(out.needs_filter_settle);
        assert!(state.selection().is_empty());

        let out = state.reduce(Action::FiltersSettled, Source::User);
        assert!(out.selection_changed);
        assert_eq!(selected(&state), vec!["B"]);
    }

    #[test]
    fn resettling_same_spec_keeps_manual_changes() {
        let mut state = state();
        state.reduce(Action::SetMinWeight(10), Source::User);
        state.reduce(Action::FiltersSettled, Source::User);
        state.reduce(Action::ToggleControl("A".to_string()), Source::User);

        let out = state.reduce(Action::FiltersSettled, Source::User);
        assert!(!out.selection_changed);
        assert_eq!(selected(&state), vec!["A", "B"]);
    }

    #[test]
    fn clearing_filters_clears_selection() {
        let mut state = state();
        state.reduce(Action::SetCoverage { framework: Framework::Soc2, enabled: true }, USER);
        state.reduce(Action::FiltersSettled, Source::User);
        assert_eq!(selected(&state), vec!["A"]);

        state.reduce(Action::SetCoverage { framework: Framework::Soc2, enabled: false }, USER);
        state.reduce(Action::FiltersSettled, Source::User);
        assert!(state.selection().is_empty());
        assert_eq!(state.history().last().unwrap().action, "Cleared filters");
    }

    #[test]
    fn toggle_rejects_unknown_ids() {
        let mut state = state();
        let out = state.reduce(Action::ToggleControl("ZZZ-99".to_string()), Source::User);
        assert_eq!(out.rejected, vec!["ZZZ-99".to_string()]);
        assert!(state.selection().is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn select_all_filtered_waits_for_settle() {
        let mut state = state();
        state.reduce(Action::SetCore { level: CoreLevel::L0, enabled: true }, Source::Automation);
        state.reduce(Action::FiltersSettled, Source::Automation);
        state.reduce(Action::ToggleControl("C".to_string()), Source::User);
        assert!(state.selection().is_empty());

        let out = state.reduce(Action::SelectAllFiltered, Source::Automation);
        assert!(out.needs_filter_settle);
        assert!(state.selection().is_empty());

        state.reduce(Action::FiltersSettled, Source::Automation);
        assert_eq!(selected(&state), vec!["C"]);
    }

    #[test]
    fn coverage_follows_settled_selection_only() {
        let catalog = Catalog::new()
            .with_controls(vec![ScfControl::new("A"), ScfControl::new("B")])
            .with_mappings(vec![scf_model::ScfMapping::new("SOC2", "CC1.1", "B")]);
        let mut state = ConfiguratorState::new(Arc::new(catalog), EngineConfig::default());

        state.reduce(Action::ToggleControl("B".to_string()), Source::User);
        let soc2 = state.coverage().framework(Framework::Soc2).unwrap();
        assert_eq!(soc2.selected_mapped, 0);

        let out = state.reduce(Action::SelectionSettled, Source::User);
        assert!(out.coverage_changed);
        let soc2 = state.coverage().framework(Framework::Soc2).unwrap();
        assert_eq!(soc2.selected_mapped, 1);
    }

    #[test]
    fn history_records_sources() {
        let mut state = state();
        let ids = vec!["A".into(), "B".into(), "nope".into()];
        state.reduce(Action::SelectIds(ids), Source::Automation);
        let last = state.history().last().unwrap();
        assert_eq!(last.action, "Selected 2 controls");
        assert_eq!(last.source, Source::Automation);
    }

    #[test]
    fn snapshot_includes_timeline_only_with_goals() {
        let mut state = state();
        assert!(state.snapshot().timeline.is_none());

        state.reduce(Action::SetCoverage { framework: Framework::Gdpr, enabled: true }, USER);
        state.reduce(Action::FiltersSettled, Source::User);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.selected_count, 1);
        assert_eq!(snapshot.active_filters, vec!["GDPR".to_string()]);
        let timeline = snapshot.timeline.unwrap();
        assert_eq!(timeline.goals[0].goal, FilterKey::Framework(Framework::Gdpr));
        assert_eq!((timeline.goals[0].start_month, timeline.goals[0].end_month), (0, 4));

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert!(json.get("activeFilters").is_some());
        assert!(json.get("selectedCount").is_some());
    }

    #[test]
    fn priority_toggle() {
        let mut state = state();
        assert!(state.reduce(Action::TogglePriority("A".into()), Source::User).priority_changed);
        assert!(state.priorities().contains("A"));
        state.reduce(Action::TogglePriority("A".into()), Source::User);
        assert!(state.priorities().is_empty());
        assert_eq!(
            state.reduce(Action::TogglePriority("Q".into()), Source::User).rejected,
            vec!["Q".to_string()]
        );
    }

    #[test]
    fn replace_catalog_drops_missing_selection() {
        let mut state = state();
        state.reduce(Action::SelectIds(vec!["A".into(), "B".into()]), Source::User);
        let shrunk = Catalog::new().with_controls(vec![ScfControl::new("B")]);
        let out = state.replace_catalog(Arc::new(shrunk));
        assert!(out.selection_changed);
        assert_eq!(selected(&state), vec!["B"]);
    }

    #[test]
    fn out_of_range_windows_are_rejected() {
        let mut state = state();
        state.reduce(Action::SetCore { level: CoreLevel::L0, enabled: true }, Source::User);
        state.reduce(Action::FiltersSettled, Source::User);

        let out = state.reduce(
            Action::SetTimelineWindows {
                mode: WindowMode::Merge,
                windows: vec![WindowRequest {
                    goal: "L0".to_string(),
                    start_month: 0,
                    end_month: u32::MAX,
                }],
            },
            Source::Automation,
        );
        assert_eq!(out.rejected, vec!["L0".to_string()]);
        assert!(!out.timeline_changed);

        state.reduce(Action::SetCoverage { framework: Framework::Gdpr, enabled: true }, USER);
        state.reduce(Action::FiltersSettled, Source::User);
        assert!(state.goals().iter().all(|g| g.window.end_month <= 120));
    }
}
