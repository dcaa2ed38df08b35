//! Rollout timeline planner
//!
//! One goal per active core/framework flag with at least one selected control
//! satisfying it. Windows live in a store keyed by [`FilterKey`] and outlive
//! their goal, so a flag turned off and back on gets its old window back.
//!
//! - New goals are placed after the furthest end month of the goals already placed
//! - Drags clamp rather than cross: `end > start` always holds
//! - Row order is reconciled on every [`Timeline::plan`]
//! - "New" controls are counted once, in ascending end month (ties by label)

use crate::error::{EngineError, Result};
use scf_model::{Catalog, FilterKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Half-open month range `[start_month, end_month)` on the timeline axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthWindow {
    /// First month
    pub start_month: u32,
    /// End month, always greater than `start_month`
    pub end_month: u32,
}

impl MonthWindow {
    /// Window with `end` forced past `start`
    #[must_use]
    pub fn new(start_month: u32, end_month: u32) -> Self {
        let start_month = start_month.min(u32::MAX - 1);
        let end_month = if end_month <= start_month {
            start_month.saturating_add(1)
        } else {
            end_month
        };
        Self {
            start_month,
            end_month,
        }
    }

    /// Width in months
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.end_month - self.start_month
    }
}

/// Which part of a bar is dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Left handle
    ResizeStart,
    /// Right handle
    ResizeEnd,
    /// Whole bar
    Move,
}

/// How a batch of windows is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Update the named goals, keep the rest
    #[default]
    Merge,
    /// Drop every stored window first
    Replace,
}

/// A derived timeline row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    /// Originating filter
    pub key: FilterKey,
    /// Current window
    pub window: MonthWindow,
    /// Selected controls satisfying the filter
    pub control_ids: BTreeSet<String>,
    /// Controls not already claimed by an earlier-ending goal
    pub new_control_ids: BTreeSet<String>,
}

impl Goal {
    /// Display label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.key.label()
    }
}

/// One goal row in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSnapshot {
    /// Goal id
    pub goal: FilterKey,
    /// Display label
    pub label: String,
    /// First month
    pub start_month: u32,
    /// End month
    pub end_month: u32,
    /// Selected controls in the goal
    pub controls: usize,
    /// Controls first claimed by this goal
    pub new_controls: usize,
}

/// Timeline state as reported to listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    /// Rows in display order
    pub goals: Vec<GoalSnapshot>,
    /// Axis length in months
    pub max_months: u32,
    /// Distinct controls across all goals
    pub total_unique_controls: usize,
}

/// Keyed window store plus row order
#[derive(Debug, Clone)]
pub struct Timeline {
    windows: BTreeMap<FilterKey, MonthWindow>,
    order: Vec<FilterKey>,
    axis_months: u32,
    base_axis: u32,
    span: u32,
}

impl Timeline {
    /// Timeline with the given axis length and default window width
    #[must_use]
    pub fn new(axis_months: u32, span: u32) -> Self {
        let axis_months = axis_months.max(1);
        Self {
            windows: BTreeMap::new(),
            order: Vec::new(),
            axis_months,
            base_axis: axis_months,
            span: span.max(1),
        }
    }

    /// Stored windows, including those of absent goals
    #[inline]
    #[must_use]
    pub fn windows(&self) -> &BTreeMap<FilterKey, MonthWindow> {
        &self.windows
    }

    /// Stored window for a goal
    #[inline]
    #[must_use]
    pub fn window(&self, key: FilterKey) -> Option<MonthWindow> {
        self.windows.get(&key).copied()
    }

    /// Current row order
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[FilterKey] {
        &self.order
    }

    /// Axis length in months
    #[inline]
    #[must_use]
    pub fn axis_months(&self) -> u32 {
        self.axis_months
    }

    /// Derive the goal rows for the active flags and selection
    ///
    /// Assigns default windows to goals that have none and reconciles the
    /// row order against the resulting goal set.
    pub fn plan(
        &mut self,
        flags: &[FilterKey],
        catalog: &Catalog,
        selected: &BTreeSet<String>,
    ) -> Vec<Goal> {
        let mut members: BTreeMap<FilterKey, BTreeSet<String>> = BTreeMap::new();
        for key in flags {
            let ids: BTreeSet<String> = selected
                .iter()
                .filter(|id| catalog.control(id).is_some_and(|c| c.satisfies(*key)))
                .cloned()
                .collect();
            if !ids.is_empty() {
                members.insert(*key, ids);
            }
        }

        self.order.retain(|key| members.contains_key(key));
        for key in flags {
            if members.contains_key(key) && !self.order.contains(key) {
                self.order.push(*key);
            }
        }

        let mut offset = self
            .order
            .iter()
            .filter_map(|key| self.windows.get(key))
            .map(|w| w.end_month)
            .max()
            .unwrap_or(0);
        for key in &self.order {
            if !self.windows.contains_key(key) {
                let window = MonthWindow::new(offset, offset.saturating_add(self.span));
                debug!(
                    goal = %key,
                    start = window.start_month,
                    end = window.end_month,
                    "default window"
                );
                self.windows.insert(*key, window);
                offset = window.end_month;
            }
        }
        self.fit_axis();

        let mut goals: Vec<Goal> = self
            .order
            .iter()
            .filter_map(|key| {
                let window = *self.windows.get(key)?;
                let control_ids = members.remove(key)?;
                Some(Goal {
                    key: *key,
                    window,
                    control_ids,
                    new_control_ids: BTreeSet::new(),
                })
            })
            .collect();
        assign_new_controls(&mut goals);
        goals
    }

    /// Drag a goal's bar by `delta` months
    ///
    /// # Errors
    /// - `EngineError::UnknownGoal` if the goal has no window
    pub fn drag(&mut self, key: FilterKey, mode: DragMode, delta: i32) -> Result<MonthWindow> {
        let current = self
            .windows
            .get(&key)
            .copied()
            .ok_or_else(|| EngineError::UnknownGoal(key.to_string()))?;

        let axis = i64::from(self.axis_months);
        let start = i64::from(current.start_month);
        let end = i64::from(current.end_month);
        let delta = i64::from(delta);

        let (new_start, new_end) = match mode {
            DragMode::ResizeStart => ((start + delta).clamp(0, end - 1), end),
            DragMode::ResizeEnd => (start, (end + delta).clamp(start + 1, axis.max(start + 1))),
            DragMode::Move => {
                let width = end - start;
                let s = (start + delta).clamp(0, (axis - width).max(0));
                (s, s + width)
            }
        };

        let window = MonthWindow::new(to_month(new_start), to_month(new_end));
        self.windows.insert(key, window);
        self.fit_axis();
        Ok(window)
    }

    /// Move a row to a new position
    ///
    /// # Errors
    /// - `EngineError::UnknownGoal` if the goal is not a current row
    pub fn move_row(&mut self, key: FilterKey, to_index: usize) -> Result<()> {
        let from = self
            .order
            .iter()
            .position(|k| *k == key)
            .ok_or_else(|| EngineError::UnknownGoal(key.to_string()))?;
        self.order.remove(from);
        let to = to_index.min(self.order.len());
        self.order.insert(to, key);
        Ok(())
    }

    /// Put the named goals first, in the given order
    ///
    /// Duplicates are ignored; unnamed rows keep their relative order.
    pub fn set_order(&mut self, keys: &[FilterKey]) {
        let mut order: Vec<FilterKey> = Vec::with_capacity(keys.len() + self.order.len());
        for key in keys {
            if !order.contains(key) {
                order.push(*key);
            }
        }
        for key in &self.order {
            if !order.contains(key) {
                order.push(*key);
            }
        }
        self.order = order;
    }

    /// Store windows; the axis grows to fit
    pub fn set_windows(&mut self, mode: WindowMode, windows: &[(FilterKey, MonthWindow)]) {
        if mode == WindowMode::Replace {
            self.windows.clear();
        }
        for (key, window) in windows {
            self.windows
                .insert(*key, MonthWindow::new(window.start_month, window.end_month));
        }
        self.fit_axis();
    }

    /// Forget every window and the row order
    pub fn reset(&mut self) {
        self.windows.clear();
        self.order.clear();
        self.axis_months = self.base_axis;
    }

    /// Snapshot of planned goals
    #[must_use]
    pub fn snapshot(&self, goals: &[Goal]) -> TimelineSnapshot {
        let unique: BTreeSet<&String> = goals.iter().flat_map(|g| &g.control_ids).collect();
        TimelineSnapshot {
            goals: goals
                .iter()
                .map(|g| GoalSnapshot {
                    goal: g.key,
                    label: g.label().to_string(),
                    start_month: g.window.start_month,
                    end_month: g.window.end_month,
                    controls: g.control_ids.len(),
                    new_controls: g.new_control_ids.len(),
                })
                .collect(),
            max_months: self.axis_months,
            total_unique_controls: unique.len(),
        }
    }

    fn fit_axis(&mut self) {
        if let Some(max_end) = self.windows.values().map(|w| w.end_month).max() {
            self.axis_months = self.axis_months.max(max_end);
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(24, 4)
    }
}

/// Fill `new_control_ids` by claiming controls in ascending end month
pub fn assign_new_controls(goals: &mut [Goal]) {
    let mut by_end: Vec<usize> = (0..goals.len()).collect();
    by_end.sort_by(|a, b| {
        let (ga, gb) = (&goals[*a], &goals[*b]);
        ga.window
            .end_month
            .cmp(&gb.window.end_month)
            .then_with(|| ga.label().cmp(gb.label()))
    });

    let mut claimed: BTreeSet<String> = BTreeSet::new();
    for idx in by_end {
        let goal = &mut goals[idx];
        goal.new_control_ids = goal.control_ids.difference(&claimed).cloned().collect();
        claimed.extend(goal.control_ids.iter().cloned());
    }
}

fn to_month(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scf_model::{CoreLevel, Framework, ScfControl};

    const SOC2: FilterKey = FilterKey::Framework(Framework::Soc2);
    const GDPR: FilterKey = FilterKey::Framework(Framework::Gdpr);
    const L0: FilterKey = FilterKey::Core(CoreLevel::L0);

    fn catalog() -> Catalog {
        Catalog::new().with_controls(vec![
            ScfControl::new("A")
                .with_framework(Framework::Soc2)
                .with_framework(Framework::Gdpr)
                .with_core(CoreLevel::L0),
            ScfControl::new("B").with_framework(Framework::Soc2),
            ScfControl::new("C").with_framework(Framework::Gdpr),
        ])
    }

    fn all_selected() -> BTreeSet<String> {
        ["A", "B", "C"].into_iter().map(String::from).collect()
    }

    #[test]
    fn default_windows_are_sequential() {
        let mut timeline = Timeline::default();
        let goals = timeline.plan(&[L0, SOC2, GDPR], &catalog(), &all_selected());

        let windows: Vec<(u32, u32)> = goals
            .iter()
            .map(|g| (g.window.start_month, g.window.end_month))
            .collect();
        assert_eq!(windows, vec![(0, 4), (4, 8), (8, 12)]);
    }

    #[test]
    fn goal_needs_a_selected_control() {
        let mut timeline = Timeline::default();
        let selected: BTreeSet<String> = ["B".to_string()].into();
        let goals = timeline.plan(&[L0, SOC2], &catalog(), &selected);
        assert_eq!(goals.iter().map(|g| g.key).collect::<Vec<_>>(), vec![SOC2]);
    }

    #[test]
    fn window_survives_goal_absence() {
        let mut timeline = Timeline::default();
        timeline.plan(&[SOC2], &catalog(), &all_selected());
        timeline.drag(SOC2, DragMode::ResizeEnd, 6).unwrap();

        let goals = timeline.plan(&[], &catalog(), &all_selected());
        assert!(goals.is_empty());
        assert_eq!(timeline.window(SOC2), Some(MonthWindow::new(0, 10)));

        let goals = timeline.plan(&[SOC2], &catalog(), &all_selected());
        assert_eq!(goals[0].window, MonthWindow::new(0, 10));
    }

    #[test]
    fn new_controls_claimed_by_earlier_end() {
        let mut goals = vec![
            Goal {
                key: GDPR,
                window: MonthWindow::new(0, 8),
                control_ids: ["A", "C"].into_iter().map(String::from).collect(),
                new_control_ids: BTreeSet::new(),
            },
            Goal {
                key: SOC2,
                window: MonthWindow::new(0, 4),
                control_ids: ["A", "B"].into_iter().map(String::from).collect(),
                new_control_ids: BTreeSet::new(),
            },
        ];
        assign_new_controls(&mut goals);

        assert!(goals[1].new_control_ids.contains("A"));
        assert!(!goals[0].new_control_ids.contains("A"));
        assert_eq!(goals[0].new_control_ids.len(), 1);
    }

    #[test]
    fn drag_clamps() {
        let mut timeline = Timeline::default();
        timeline.set_windows(WindowMode::Merge, &[(SOC2, MonthWindow::new(2, 6))]);

        let w = timeline.drag(SOC2, DragMode::ResizeStart, 10).unwrap();
        assert_eq!((w.start_month, w.end_month), (5, 6));

        let w = timeline.drag(SOC2, DragMode::ResizeEnd, -10).unwrap();
        assert_eq!((w.start_month, w.end_month), (5, 6));

        let w = timeline.drag(SOC2, DragMode::ResizeEnd, 100).unwrap();
        assert_eq!(w.end_month, 24);

        let w = timeline.drag(SOC2, DragMode::Move, -100).unwrap();
        assert_eq!((w.start_month, w.end_month), (0, 19));

        assert!(timeline.drag(GDPR, DragMode::Move, 1).is_err());
    }

    #[test]
    fn set_windows_merge_replace_and_axis_growth() {
        let mut timeline = Timeline::default();
        timeline.set_windows(WindowMode::Merge, &[(SOC2, MonthWindow::new(0, 6))]);
        let collapsed = MonthWindow { start_month: 30, end_month: 30 };
        timeline.set_windows(WindowMode::Merge, &[(GDPR, collapsed)]);
        assert_eq!(timeline.window(GDPR), Some(MonthWindow::new(30, 31)));
        assert_eq!(timeline.axis_months(), 31);
        assert!(timeline.window(SOC2).is_some());

        timeline.set_windows(WindowMode::Replace, &[(L0, MonthWindow::new(1, 3))]);
        assert_eq!(timeline.windows().len(), 1);

        timeline.reset();
        assert!(timeline.windows().is_empty());
        assert_eq!(timeline.axis_months(), 24);
    }

    #[test]
    fn order_reconciles() {
        let mut timeline = Timeline::default();
        timeline.plan(&[L0, SOC2, GDPR], &catalog(), &all_selected());
        timeline.set_order(&[GDPR, GDPR]);
        assert_eq!(timeline.order(), &[GDPR, L0, SOC2]);

        timeline.move_row(L0, 99).unwrap();
        assert_eq!(timeline.order(), &[GDPR, SOC2, L0]);

        let goals = timeline.plan(&[SOC2, GDPR], &catalog(), &all_selected());
        assert_eq!(goals.iter().map(|g| g.key).collect::<Vec<_>>(), vec![GDPR, SOC2]);
    }

    #[test]
    fn window_end_stays_past_start_at_the_top_of_the_range() {
        let window = MonthWindow::new(u32::MAX, 5);
        assert!(window.end_month > window.start_month);
        assert_eq!(window.width(), 1);
    }

    #[test]
    fn default_placement_after_a_far_window_saturates() {
        let mut timeline = Timeline::default();
        timeline.set_windows(WindowMode::Merge, &[(L0, MonthWindow::new(0, u32::MAX))]);
        let goals = timeline.plan(&[L0, GDPR], &catalog(), &all_selected());

        let gdpr = goals.iter().find(|g| g.key == GDPR).unwrap();
        assert!(gdpr.window.end_month > gdpr.window.start_month);
    }
}
