use crate::config::AppConfig;
use crate::events::{EventBus, EventKind, HostEvent, Subscription, ThemeMode};
use crate::metrics::MetricSettings;
use crate::session::HeatmapSession;
use crate::storage::JournalStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;

/// Host shell state mirrored from [`HostEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostView {
    pub visible: bool,
    pub sidebar_visible: bool,
    pub theme: ThemeMode,
}

impl Default for HostView {
    fn default() -> Self {
        Self {
            visible: true,
            sidebar_visible: false,
            theme: ThemeMode::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: JournalStore,
    pub session: Arc<Mutex<HeatmapSession>>,
    pub settings: Arc<Mutex<MetricSettings>>,
    pub current_day: Arc<Mutex<Option<NaiveDate>>>,
    pub events: EventBus,
    pub host: Arc<std::sync::Mutex<HostView>>,
    _subscriptions: Arc<Vec<Subscription>>,
}

impl AppState {
    pub fn new(config: &AppConfig, today: NaiveDate) -> Self {
        let session = HeatmapSession::new(today, config.window);
        let events = EventBus::new();
        let host = Arc::new(std::sync::Mutex::new(HostView::default()));
        let subscriptions = subscribe_host_events(&events, &session, &host);

        Self {
            store: JournalStore::new(config.data_path.clone()),
            session: Arc::new(Mutex::new(session)),
            settings: Arc::new(Mutex::new(config.metrics.clone())),
            current_day: Arc::new(Mutex::new(None)),
            events,
            host,
            _subscriptions: Arc::new(subscriptions),
        }
    }

    pub fn host_view(&self) -> HostView {
        *self.host.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn subscribe_host_events(
    events: &EventBus,
    session: &HeatmapSession,
    host: &Arc<std::sync::Mutex<HostView>>,
) -> Vec<Subscription> {
    let active = session.active_flag();
    let visible_host = Arc::clone(host);
    let sidebar_host = Arc::clone(host);
    let theme_host = Arc::clone(host);

    vec![
        events.subscribe(EventKind::UiVisible, move |event| {
            if let HostEvent::UiVisible(visible) = event {
                active.store(*visible, Ordering::SeqCst);
                visible_host.lock().unwrap_or_else(PoisonError::into_inner).visible = *visible;
            }
        }),
        events.subscribe(EventKind::SidebarVisible, move |event| {
            if let HostEvent::SidebarVisible(visible) = event {
                sidebar_host
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .sidebar_visible = *visible;
            }
        }),
        events.subscribe(EventKind::ThemeMode, move |event| {
            if let HostEvent::ThemeMode(mode) = event {
                theme_host.lock().unwrap_or_else(PoisonError::into_inner).theme = *mode;
            }
        }),
    ]
}
