//! Async configurator session
//!
//! Wraps [`ConfiguratorState`] for concurrent callers:
//! - Filter edits settle 200 ms after the last keystroke
//! - Selection changes refresh coverage 300 ms after the last change
//! - Every visible change is pushed to the registered [`EventSink`]
//! - Priority toggles are written through to the [`PriorityStore`]
//!
//! Automation batches settle filters inline so that a later
//! `select_controls` in the same batch sees the filters set before it.

use crate::automation::{plan_batch, UiAction};
use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::priority::PriorityStore;
use crate::selection::Source;
use crate::state::{Action, ConfiguratorState, HistorySnapshot, Outcome};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use scf_model::Catalog;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Event type for history snapshots
pub const FILTER_HISTORY_CHANGED: &str = "scf_filter_history_changed";

/// Event pushed to the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendEvent {
    /// Event type
    #[serde(rename = "type")]
    pub event_type: String,
    /// Payload
    pub data: HistorySnapshot,
}

impl FrontendEvent {
    /// History snapshot event
    #[must_use]
    pub fn history_changed(data: HistorySnapshot) -> Self {
        Self {
            event_type: FILTER_HISTORY_CHANGED.to_string(),
            data,
        }
    }
}

/// Receiver of frontend events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event
    async fn send(&self, event: FrontendEvent);
}

#[async_trait]
impl EventSink for mpsc::UnboundedSender<FrontendEvent> {
    async fn send(&self, event: FrontendEvent) {
        if mpsc::UnboundedSender::send(self, event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

/// Result of an automation batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Commands applied
    pub applied: usize,
    /// Actions ignored as foreign or unknown
    pub ignored: usize,
    /// Ids or tokens refused by the reducer
    pub rejected: Vec<String>,
}

struct SessionInner {
    state: Mutex<ConfiguratorState>,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
    filters: Debouncer,
    selection: Debouncer,
    priorities: Option<PriorityStore>,
}

/// Shared handle to one configurator
#[derive(Clone)]
pub struct ConfiguratorSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for ConfiguratorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguratorSession")
            .field("selected", &self.inner.state.lock().selection().len())
            .finish_non_exhaustive()
    }
}

impl ConfiguratorSession {
    /// Session over an existing state, without persistence
    #[must_use]
    pub fn new(state: ConfiguratorState) -> Self {
        Self::build(state, None)
    }

    /// Session over a catalog; loads priorities when a path is configured
    ///
    /// # Errors
    /// - `EngineError::Config` for an invalid configuration
    /// - `EngineError::Io` / `EngineError::Json` if stored priorities cannot be read
    pub fn open(catalog: Arc<Catalog>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = config.priority_path.clone().map(PriorityStore::new);
        let priorities = match &store {
            Some(store) => store.load()?,
            None => Default::default(),
        };
        let state = ConfiguratorState::new(catalog, config).with_priorities(priorities);
        Ok(Self::build(state, store))
    }

    fn build(state: ConfiguratorState, priorities: Option<PriorityStore>) -> Self {
        let config = state.config();
        let filters = Debouncer::new(config.filter_debounce());
        let selection = Debouncer::new(config.selection_debounce());
        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(state),
                sink: RwLock::new(None),
                filters,
                selection,
                priorities,
            }),
        }
    }

    /// Register the event sink, replacing any previous one
    pub fn set_sink(&self, sink: Arc<dyn EventSink>) {
        *self.inner.sink.write() = Some(sink);
    }

    /// Apply one action and schedule its follow-ups
    pub async fn dispatch(&self, action: Action, source: Source) -> Outcome {
        let (outcome, snapshot) = reduce(&self.inner, action, source);
        schedule_follow_ups(&self.inner, &outcome, source);
        if let Some(snapshot) = snapshot {
            emit(&self.inner, snapshot).await;
        }
        outcome
    }

    /// Apply a batch of chat-originated UI actions
    ///
    /// A filter edit still waiting on its debouncer settles before the
    /// batch. Resets run first, then the rest in array order; one snapshot
    /// is emitted for the whole batch.
    pub async fn apply_ui_actions(&self, actions: &[UiAction]) -> BatchReport {
        let commands = plan_batch(actions);
        let mut report = BatchReport {
            applied: commands.len(),
            ignored: actions.len() - commands.len(),
            rejected: Vec::new(),
        };

        let (outcome, snapshot) = {
            let mut state = self.inner.state.lock();
            let mut total = Outcome::default();
            if state.is_filter_pending() {
                total.merge(state.reduce(Action::FiltersSettled, Source::User));
            }
            for command in commands {
                let outcome = state.reduce(command.into(), Source::Automation);
                let settle = outcome.needs_filter_settle;
                total.merge(outcome);
                if settle {
                    total.merge(state.reduce(Action::FiltersSettled, Source::Automation));
                }
            }
            total.needs_filter_settle = false;
            let snapshot = total.is_visible().then(|| state.snapshot());
            (total, snapshot)
        };
        self.inner.filters.cancel();

        info!(
            applied = report.applied,
            ignored = report.ignored,
            rejected = outcome.rejected.len(),
            "applied ui action batch"
        );
        schedule_follow_ups(&self.inner, &outcome, Source::Automation);
        if let Some(snapshot) = snapshot {
            emit(&self.inner, snapshot).await;
        }
        report.rejected = outcome.rejected;
        report
    }

    /// Settle everything now instead of waiting for the debouncers
    pub async fn flush(&self) -> Outcome {
        self.inner.filters.cancel();
        self.inner.selection.cancel();

        let (outcome, snapshot) = {
            let mut state = self.inner.state.lock();
            let mut total = Outcome::default();
            if state.is_filter_pending() {
                total.merge(state.reduce(Action::FiltersSettled, Source::User));
            }
            total.merge(state.reduce(Action::SelectionSettled, Source::User));
            let snapshot = total.is_visible().then(|| state.snapshot());
            (total, snapshot)
        };
        if let Some(snapshot) = snapshot {
            emit(&self.inner, snapshot).await;
        }
        outcome
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Read the state under the session lock
    pub fn with_state<R>(&self, f: impl FnOnce(&ConfiguratorState) -> R) -> R {
        f(&self.inner.state.lock())
    }

    /// Whether a settle is still waiting on a debouncer
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.inner.filters.is_pending() || self.inner.selection.is_pending()
    }
}

fn reduce(
    inner: &SessionInner,
    action: Action,
    source: Source,
) -> (Outcome, Option<HistorySnapshot>) {
    let mut state = inner.state.lock();
    let outcome = state.reduce(action, source);
    if outcome.priority_changed {
        if let Some(store) = &inner.priorities {
            if let Err(e) = store.save(state.priorities()) {
                warn!(path = %store.path().display(), error = %e, "failed to persist priorities");
            }
        }
    }
    let snapshot = outcome.is_visible().then(|| state.snapshot());
    (outcome, snapshot)
}

fn schedule_follow_ups(inner: &Arc<SessionInner>, outcome: &Outcome, source: Source) {
    if outcome.needs_filter_settle {
        let weak = Arc::downgrade(inner);
        inner.filters.schedule(settle_filters(weak, source));
    }
    if outcome.selection_changed {
        let weak = Arc::downgrade(inner);
        inner.selection.schedule(settle_selection(weak));
    }
}

async fn settle_filters(inner: Weak<SessionInner>, source: Source) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let (outcome, snapshot) = reduce(&inner, Action::FiltersSettled, source);
    if outcome.selection_changed {
        let weak = Arc::downgrade(&inner);
        inner.selection.schedule(settle_selection(weak));
    }
    if let Some(snapshot) = snapshot {
        emit(&inner, snapshot).await;
    }
}

#[allow(clippy::unused_async)]
async fn settle_selection(inner: Weak<SessionInner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let outcome = inner.state.lock().reduce(Action::SelectionSettled, Source::User);
    debug!(changed = outcome.coverage_changed, "coverage refreshed");
}

async fn emit(inner: &SessionInner, snapshot: HistorySnapshot) {
    let sink = inner.sink.read().clone();
    if let Some(sink) = sink {
        sink.send(FrontendEvent::history_changed(snapshot)).await;
    }
}
