//! Dashboard state: the current guest set, the active filters and the
//! background refresh that replaces them.
//!
//! At most one refresh is outstanding. Its result arrives over a oneshot
//! channel and is applied by `poll_refresh` or `wait_refresh`; a superseded
//! or cancelled refresh is aborted and its result never touches the state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::filter::{filter_guests, FilterCriteria};
use crate::models::{EventSet, GuestRecord};
use crate::source::{LoadError, LoadedGuests, SourceLoader};
use crate::stats::{side_options, summarize, SummaryStats};
use crate::utils::format_age;

type RefreshResult = Result<LoadedGuests, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing loaded yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last refresh failed; previously loaded records are still shown.
    Failed(String),
}

#[derive(Debug)]
struct PendingRefresh {
    handle: JoinHandle<()>,
    rx: oneshot::Receiver<RefreshResult>,
    events: Arc<EventSet>,
    /// State to restore if the refresh is cancelled.
    previous: LoadState,
}

#[derive(Debug)]
pub struct Dashboard {
    events: Arc<EventSet>,
    records: Arc<[GuestRecord]>,
    criteria: FilterCriteria,
    state: LoadState,
    origin: Option<String>,
    last_loaded: Option<DateTime<Utc>>,
    pending: Option<PendingRefresh>,
}

impl Dashboard {
    pub fn new(events: Arc<EventSet>) -> Self {
        Self {
            events,
            records: Arc::from(Vec::new()),
            criteria: FilterCriteria::default(),
            state: LoadState::Idle,
            origin: None,
            last_loaded: None,
            pending: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn events(&self) -> &EventSet {
        &self.events
    }

    /// All loaded records. The returned handle stays valid across refreshes.
    pub fn records(&self) -> Arc<[GuestRecord]> {
        Arc::clone(&self.records)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// File or URL the current records were read from.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.last_loaded
    }

    /// "5m ago", "2h ago", ... for the last successful load.
    pub fn age_display(&self) -> Option<String> {
        self.last_loaded
            .map(|at| format_age((Utc::now() - at).num_minutes()))
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// Records passing the current filters, in load order.
    pub fn filtered(&self) -> Vec<&GuestRecord> {
        filter_guests(&self.records, &self.criteria, &self.events)
    }

    /// Statistics over the filtered records.
    pub fn summary(&self) -> SummaryStats {
        summarize(self.filtered(), &self.events)
    }

    /// Relationship labels across all records, for the side filter.
    pub fn side_options(&self) -> Vec<String> {
        side_options(self.records.iter())
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Start reading `loader` in the background, aborting any refresh that
    /// is still outstanding. Must be called from within a tokio runtime.
    pub fn start_refresh(&mut self, loader: SourceLoader) {
        let previous = match self.pending.take() {
            Some(pending) => {
                debug!("Superseding outstanding refresh");
                pending.handle.abort();
                pending.previous
            }
            None => self.state.clone(),
        };

        let events = Arc::clone(loader.events());
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let result = loader.load().await;
            // The receiver is gone when the refresh was cancelled
            let _ = tx.send(result);
        });

        info!("Refreshing guest list");
        self.pending = Some(PendingRefresh {
            handle,
            rx,
            events,
            previous,
        });
        self.state = LoadState::Loading;
    }

    /// Apply the outstanding refresh if it has finished. Returns true when a
    /// result was applied.
    pub fn poll_refresh(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => None,
        };

        if let Some(pending) = self.pending.take() {
            self.apply(result, pending.events);
        }
        true
    }

    /// Wait for the outstanding refresh and apply it. Returns false when no
    /// refresh was outstanding.
    ///
    /// Cancel safe: dropping the future leaves the refresh outstanding.
    pub async fn wait_refresh(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let result = (&mut pending.rx).await.ok();

        if let Some(pending) = self.pending.take() {
            self.apply(result, pending.events);
        }
        true
    }

    /// Abort the outstanding refresh, if any. Records and state are left as
    /// they were before it started.
    pub fn cancel_refresh(&mut self) {
        if let Some(pending) = self.pending.take() {
            info!("Refresh cancelled");
            pending.handle.abort();
            self.state = pending.previous;
        }
    }

    /// `None` means the task ended without reporting back.
    fn apply(&mut self, result: Option<RefreshResult>, events: Arc<EventSet>) {
        match result {
            Some(Ok(loaded)) => {
                info!(
                    origin = %loaded.origin,
                    guests = loaded.records.len(),
                    "Guest list refreshed"
                );
                self.records = Arc::from(loaded.records);
                self.events = events;
                self.origin = Some(loaded.origin);
                self.last_loaded = Some(loaded.loaded_at);
                self.state = LoadState::Ready;
            }
            Some(Err(e)) => {
                warn!(error = %e, "Refresh failed");
                self.state = LoadState::Failed(e.to_string());
            }
            None => {
                warn!("Refresh task ended without a result");
                self.state = LoadState::Failed("Refresh ended unexpectedly".to_string());
            }
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
