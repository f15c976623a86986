//! Publish/subscribe hub for window-management events
//!
//! The bus runs in one of two modes:
//!
//! - **Local**: events are queued and dispatched to subscribers. Exactly one
//!   thread drains the queue at a time; a publisher that finds another
//!   thread draining leaves its event queued and returns immediately.
//! - **Broadcast**: when a [`Broadcaster`] is attached, events are translated
//!   into [`BroadcastRecord`]s and forwarded synchronously. Local
//!   subscribers are not invoked in this mode.
//!
//! The bus is the only type in this crate that may be shared across threads.
//! Everything else lives on the compositor thread.

use log::{debug, error, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::client::ClientId;
use crate::layer_manager::ReservedSpace;
use crate::tag::{LayoutKind, TagId};

static GLOBAL_BUS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// Identity of a tag as carried inside events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
}

/// Window-management events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TagSwitched {
        old_tag: Option<TagRef>,
        new_tag: TagRef,
        output: Option<String>,
    },
    ClientAdded {
        client: ClientId,
        tag: TagRef,
    },
    ClientRemoved {
        client: ClientId,
        tag: TagRef,
    },
    TagVisibilityChanged {
        tag: TagRef,
        visible: bool,
    },
    LayoutChanged {
        tag: TagRef,
        layout: LayoutKind,
    },
    ClientFocused {
        client: ClientId,
        tag: TagRef,
    },
    ReservedSpaceChanged {
        output: String,
        reserved: ReservedSpace,
    },
}

/// Discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TagSwitched,
    ClientAdded,
    ClientRemoved,
    TagVisibilityChanged,
    LayoutChanged,
    ClientFocused,
    ReservedSpaceChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TagSwitched { .. } => EventKind::TagSwitched,
            Event::ClientAdded { .. } => EventKind::ClientAdded,
            Event::ClientRemoved { .. } => EventKind::ClientRemoved,
            Event::TagVisibilityChanged { .. } => EventKind::TagVisibilityChanged,
            Event::LayoutChanged { .. } => EventKind::LayoutChanged,
            Event::ClientFocused { .. } => EventKind::ClientFocused,
            Event::ReservedSpaceChanged { .. } => EventKind::ReservedSpaceChanged,
        }
    }
}

/// Event kinds understood by the external broadcast channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastKind {
    TagSwitched,
    ClientAdded,
    ClientRemoved,
    LayoutChanged,
    Unknown,
}

impl From<EventKind> for BroadcastKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::TagSwitched => BroadcastKind::TagSwitched,
            EventKind::ClientAdded => BroadcastKind::ClientAdded,
            EventKind::ClientRemoved => BroadcastKind::ClientRemoved,
            EventKind::LayoutChanged => BroadcastKind::LayoutChanged,
            _ => BroadcastKind::Unknown,
        }
    }
}

/// Wire-ready form of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    pub kind: BroadcastKind,
    /// Full event body; kept even for `Unknown` kinds
    pub payload: serde_json::Value,
}

impl BroadcastRecord {
    pub fn from_event(event: &Event) -> Self {
        let payload = serde_json::to_value(event).unwrap_or_else(|e| {
            warn!("Failed to serialize {:?} for broadcast: {}", event.kind(), e);
            serde_json::Value::Null
        });
        Self {
            kind: event.kind().into(),
            payload,
        }
    }
}

/// External fire-and-forget sink for events
#[cfg_attr(test, mockall::automock)]
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, record: BroadcastRecord);
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    listener: Listener,
}

/// Event hub; share it as `Arc<EventBus>`
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    queue: Mutex<VecDeque<Event>>,
    draining: AtomicBool,
    next_id: AtomicU64,
    broadcaster: RwLock<Option<Arc<dyn Broadcaster>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscription_count())
            .field("pending", &self.pending())
            .field("broadcasting", &self.is_broadcasting())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            queue: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            broadcaster: RwLock::new(None),
        }
    }

    /// Process-wide bus for composition roots that want one
    pub fn global() -> Arc<EventBus> {
        GLOBAL_BUS.get_or_init(|| Arc::new(EventBus::new())).clone()
    }

    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.lock().push(Subscription {
            id,
            kind,
            listener: Arc::new(listener),
        });
        debug!("Subscription {} registered for {:?}", id.0, kind);
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        before != subscriptions.len()
    }

    pub fn clear(&self) {
        self.subscriptions.lock().clear();
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Events queued but not yet dispatched
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn attach_broadcaster(&self, broadcaster: Arc<dyn Broadcaster>) {
        *self.broadcaster.write() = Some(broadcaster);
        debug!("Event bus switched to broadcast mode");
    }

    pub fn detach_broadcaster(&self) {
        *self.broadcaster.write() = None;
        debug!("Event bus switched to local mode");
    }

    pub fn is_broadcasting(&self) -> bool {
        self.broadcaster.read().is_some()
    }

    /// Deliver `event`.
    ///
    /// In local mode delivery is guaranteed but may happen on another
    /// thread after this returns.
    pub fn publish(&self, event: Event) {
        let broadcaster = self.broadcaster.read().clone();
        if let Some(broadcaster) = broadcaster {
            broadcaster.broadcast(BroadcastRecord::from_event(&event));
            return;
        }

        self.queue.lock().push_back(event);
        self.drain();
    }

    fn drain(&self) {
        loop {
            if self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(event) => self.dispatch(&event),
                    None => break,
                }
            }

            self.draining.store(false, Ordering::Release);

            // An event pushed between the last pop and the release above
            // has no drainer yet.
            if self.queue.lock().is_empty() {
                return;
            }
        }
    }

    fn dispatch(&self, event: &Event) {
        let kind = event.kind();
        let listeners: Vec<(SubscriptionId, Listener)> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.id, s.listener.clone()))
            .collect();

        for (id, listener) in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(event)));
            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    "Listener {} panicked while handling {:?}: {}",
                    id.0, kind, panic_msg
                );
            }
        }
    }
}
