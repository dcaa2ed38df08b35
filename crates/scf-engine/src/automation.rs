//! Chat-originated UI actions
//!
//! Inbound actions arrive as loosely typed JSON. Parsing is lenient: an
//! action for another page is ignored, an unknown type is ignored, and a
//! malformed field is dropped on its own without rejecting the rest of the
//! action or the batch.

use scf_model::{CoreLevel, Framework};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::timeline::WindowMode;

/// Raw inbound action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiAction {
    /// Page scope (`scf` or `global`)
    #[serde(default)]
    pub scope: String,
    /// Target view (`scf_config` or `scf`)
    #[serde(default)]
    pub target: String,
    /// Action type, e.g. `ui.set_filters`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Type-specific parameters
    #[serde(default)]
    pub params: Value,
}

impl UiAction {
    /// Build an action addressed to the configurator
    #[must_use]
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        Self {
            scope: "scf".to_string(),
            target: "scf_config".to_string(),
            kind: kind.into(),
            params,
        }
    }

    /// Whether the action is addressed to the configurator
    #[must_use]
    pub fn is_for_configurator(&self) -> bool {
        matches!(self.scope.as_str(), "scf" | "global")
            && matches!(self.target.as_str(), "scf_config" | "scf")
    }
}

/// How `ui.select_controls` picks controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectMode {
    /// Select the filtered set at the next filter settle
    AllFiltered,
    /// Add explicit ids
    Ids(Vec<String>),
}

/// A requested window; the goal token is resolved by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    /// Loose goal token
    pub goal: String,
    /// First month
    pub start_month: u32,
    /// End month
    pub end_month: u32,
}

/// Typed configurator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// `ui.set_filters`: turn on named flags, set weight/query if given
    SetFilters {
        /// Coverage flags to turn on
        coverage: Vec<Framework>,
        /// Core flags to turn on
        core: Vec<CoreLevel>,
        /// New weight floor
        min_weight: Option<i32>,
        /// New query
        query: Option<String>,
    },
    /// `ui.select_controls`
    SelectControls(SelectMode),
    /// `ui.set_timeline_windows`
    SetTimelineWindows {
        /// Merge or replace
        mode: WindowMode,
        /// Requested windows
        windows: Vec<WindowRequest>,
    },
    /// `ui.set_timeline_order`
    SetTimelineOrder(Vec<String>),
    /// `ui.reset_timeline`
    ResetTimeline,
    /// `ui.reset_filters_and_selection`
    ResetFiltersAndSelection,
}

impl UiCommand {
    /// Parse a raw action; `None` for foreign or unknown actions
    #[must_use]
    pub fn parse(action: &UiAction) -> Option<Self> {
        if !action.is_for_configurator() {
            debug!(scope = %action.scope, target = %action.target, "ignoring foreign ui action");
            return None;
        }
        let params = &action.params;
        let command = match action.kind.as_str() {
            "ui.set_filters" => Self::SetFilters {
                coverage: tokens(params, "coverage_frameworks", Framework::from_token),
                core: tokens(params, "core_levels", CoreLevel::from_token),
                min_weight: field(params, "min_weight").and_then(|v| {
                    let parsed = as_i64(v).and_then(|n| i32::try_from(n).ok());
                    if parsed.is_none() {
                        debug!(value = %v, "dropping malformed min_weight");
                    }
                    parsed
                }),
                query: field(params, "query").and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        debug!(value = %other, "dropping malformed query");
                        None
                    }
                }),
            },
            "ui.select_controls" => {
                let mode = field(params, "mode").and_then(Value::as_str).unwrap_or("ids");
                if mode == "all_filtered" {
                    Self::SelectControls(SelectMode::AllFiltered)
                } else {
                    Self::SelectControls(SelectMode::Ids(strings(params, "ids")))
                }
            }
            "ui.set_timeline_windows" => Self::SetTimelineWindows {
                mode: match field(params, "mode").and_then(Value::as_str) {
                    Some("replace") => WindowMode::Replace,
                    _ => WindowMode::Merge,
                },
                windows: windows(params),
            },
            "ui.set_timeline_order" => Self::SetTimelineOrder(strings(params, "order")),
            "ui.reset_timeline" => Self::ResetTimeline,
            "ui.reset_filters_and_selection" => Self::ResetFiltersAndSelection,
            other => {
                debug!(kind = other, "ignoring unknown ui action type");
                return None;
            }
        };
        Some(command)
    }

    /// Whether this is one of the reset commands
    #[inline]
    #[must_use]
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::ResetTimeline | Self::ResetFiltersAndSelection)
    }
}

/// Parse a batch: resets first, then the rest in array order
#[must_use]
pub fn plan_batch(actions: &[UiAction]) -> Vec<UiCommand> {
    let (mut resets, rest): (Vec<UiCommand>, Vec<UiCommand>) = actions
        .iter()
        .filter_map(UiCommand::parse)
        .partition(UiCommand::is_reset);
    resets.extend(rest);
    resets
}

fn field<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

#[allow(clippy::cast_possible_truncation)]
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64),
        _ => None,
    }
}

fn as_month(value: Option<&Value>) -> Option<u32> {
    value.and_then(as_i64).and_then(|n| u32::try_from(n).ok())
}

fn strings(params: &Value, name: &str) -> Vec<String> {
    let Some(values) = field(params, name).and_then(Value::as_array) else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|v| match v.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => {
                debug!(field = name, value = %v, "dropping malformed entry");
                None
            }
        })
        .collect()
}

fn tokens<T>(params: &Value, name: &str, resolve: impl Fn(&str) -> Option<T>) -> Vec<T> {
    strings(params, name)
        .into_iter()
        .filter_map(|token| {
            let resolved = resolve(&token);
            if resolved.is_none() {
                debug!(field = name, %token, "dropping unresolvable token");
            }
            resolved
        })
        .collect()
}

fn windows(params: &Value) -> Vec<WindowRequest> {
    let Some(values) = field(params, "windows").and_then(Value::as_array) else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|w| {
            let goal = w.get("goal").and_then(Value::as_str).map(str::trim)?;
            let start = as_month(w.get("start_month"));
            let end = as_month(w.get("end_month"));
            match (goal.is_empty(), start, end) {
                (false, Some(start_month), Some(end_month)) => Some(WindowRequest {
                    goal: goal.to_string(),
                    start_month,
                    end_month,
                }),
                _ => {
                    debug!(window = %w, "dropping malformed timeline window");
                    None
                }
            }
        })
        .collect()
}
