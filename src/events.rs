use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UiVisible,
    SidebarVisible,
    ThemeMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// State changes pushed by the host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HostEvent {
    UiVisible(bool),
    SidebarVisible(bool),
    ThemeMode(ThemeMode),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::UiVisible(_) => EventKind::UiVisible,
            Self::SidebarVisible(_) => EventKind::SidebarVisible,
            Self::ThemeMode(_) => EventKind::ThemeMode,
        }
    }
}

type Handler = Arc<dyn Fn(&HostEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, EventKind, Handler)>,
}

/// Subscription point for host events. Handlers stay registered until their
/// [`Subscription`] is dropped or unsubscribed.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, kind, Arc::new(handler)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every handler subscribed to its kind and return how
    /// many were called. Handlers run outside the registry lock.
    pub fn publish(&self, event: &HostEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .handlers
                .iter()
                .filter(|(_, handler_kind, _)| *handler_kind == kind)
                .map(|(_, _, handler)| Arc::clone(handler))
                .collect()
        };

        debug!(?event, handlers = handlers.len(), "publishing host event");
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.handlers.retain(|(id, _, _)| *id != self.id);
        }
    }
}
