use crate::config::WindowConfig;
use crate::models::RawDayRecord;
use crate::window::{DateWindow, PageDirection};
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Identifies one fetch: the window it was issued for and its issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken {
    seq: u64,
    window: DateWindow,
}

impl FetchToken {
    pub fn window(&self) -> DateWindow {
        self.window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The window changed, or a newer fetch for it already landed.
    Stale,
    /// The consumer is gone; nothing is written.
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub window: DateWindow,
    pub records: Vec<RawDayRecord>,
}

/// Window state for one rendering session plus the raw records last fetched
/// for it.
#[derive(Debug)]
pub struct HeatmapSession {
    config: WindowConfig,
    window: DateWindow,
    next_seq: u64,
    applied_seq: Option<u64>,
    snapshot: Option<Snapshot>,
    active: Arc<AtomicBool>,
}

impl HeatmapSession {
    pub fn new(today: NaiveDate, config: WindowConfig) -> Self {
        Self {
            window: DateWindow::initial(today, config.span_weeks, config.week_start),
            config,
            next_seq: 0,
            applied_seq: None,
            snapshot: None,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn page(&mut self, direction: PageDirection) -> DateWindow {
        self.window = self.window.page(
            direction,
            self.config.step_weeks,
            self.config.span_weeks,
            self.config.week_start,
        );
        info!(
            ?direction,
            start = %self.window.start(),
            end = %self.window.end(),
            "window paged"
        );
        self.window
    }

    pub fn begin_fetch(&mut self) -> FetchToken {
        let token = FetchToken {
            seq: self.next_seq,
            window: self.window,
        };
        self.next_seq += 1;
        token
    }

    /// Apply a fetch result if it still belongs to the active window and is
    /// not older than what is already applied.
    pub fn apply(&mut self, token: FetchToken, records: Vec<RawDayRecord>) -> FetchOutcome {
        if !self.is_active() {
            debug!(seq = token.seq, "discarding fetch for inactive session");
            return FetchOutcome::Inactive;
        }
        if token.window != self.window {
            debug!(seq = token.seq, "discarding fetch for previous window");
            return FetchOutcome::Stale;
        }
        if self.applied_seq.is_some_and(|applied| token.seq < applied) {
            debug!(seq = token.seq, "discarding out-of-order fetch");
            return FetchOutcome::Stale;
        }

        debug!(seq = token.seq, records = records.len(), "applying fetch");
        self.applied_seq = Some(token.seq);
        self.snapshot = Some(Snapshot {
            window: token.window,
            records,
        });
        FetchOutcome::Applied
    }

    /// Records for the active window, if a fetch for it has landed.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.window == self.window)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Shared flag the host toggles when the heatmap is shown or torn down.
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }
}
