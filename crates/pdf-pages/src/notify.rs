//! Toast notifications
//!
//! A small publish/subscribe hub. Tools post toasts; front ends subscribe to
//! open/close events or poll [`NotificationHub::active`]. At most
//! [`MAX_TOASTS`] are retained; the oldest is dropped when a new one
//! arrives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::{Duration, Instant};

pub const MAX_TOASTS: usize = 5;
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
    /// False on the event sent when the toast closes
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct ToastRequest {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
    /// `None` keeps the toast until dismissed
    pub duration: Option<Duration>,
}

impl ToastRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
            duration: Some(DEFAULT_TOAST_DURATION),
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success!", description)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            ..Self::new("Error", description)
        }
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }
}

type Listener = Arc<dyn Fn(&Toast) + Send + Sync>;

struct Retained {
    toast: Toast,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct HubInner {
    next_toast: u64,
    next_listener: u64,
    listeners: Vec<(u64, Listener)>,
    retained: VecDeque<Retained>,
}

#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<Mutex<HubInner>>,
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("NotificationHub")
            .field("listeners", &inner.listeners.len())
            .field("retained", &inner.retained.len())
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide hub shared by every tool
    pub fn global() -> &'static NotificationHub {
        static HUB: OnceLock<NotificationHub> = OnceLock::new();
        HUB.get_or_init(NotificationHub::new)
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&Toast) + Send + Sync + 'static) -> Subscription {
        let mut inner = self.lock();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn toast(&self, request: ToastRequest) -> ToastId {
        self.toast_at(request, Instant::now())
    }

    pub fn toast_at(&self, request: ToastRequest, now: Instant) -> ToastId {
        let (toast, evicted) = {
            let mut inner = self.lock();
            inner.next_toast += 1;
            let toast = Toast {
                id: ToastId(inner.next_toast),
                title: request.title,
                description: request.description,
                variant: request.variant,
                open: true,
            };
            inner.retained.push_back(Retained {
                toast: toast.clone(),
                expires_at: request.duration.map(|d| now + d),
            });
            let mut evicted = Vec::new();
            while inner.retained.len() > MAX_TOASTS {
                if let Some(oldest) = inner.retained.pop_front() {
                    log::debug!("Evicting toast {:?}", oldest.toast.id);
                    evicted.push(oldest.toast);
                }
            }
            (toast, evicted)
        };

        for closed in evicted {
            self.broadcast(&Toast {
                open: false,
                ..closed
            });
        }
        self.broadcast(&toast);
        toast.id
    }

    /// Close a toast early. Returns false if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let closed = {
            let mut inner = self.lock();
            let position = inner.retained.iter().position(|r| r.toast.id == id);
            position.and_then(|p| inner.retained.remove(p))
        };

        match closed {
            Some(retained) => {
                let toast = Toast {
                    open: false,
                    ..retained.toast
                };
                self.broadcast(&toast);
                true
            }
            None => false,
        }
    }

    /// Close every toast whose duration has elapsed at `now`
    pub fn expire(&self, now: Instant) -> usize {
        let expired: Vec<ToastId> = self
            .lock()
            .retained
            .iter()
            .filter(|r| r.expires_at.is_some_and(|at| at <= now))
            .map(|r| r.toast.id)
            .collect();

        expired.into_iter().filter(|id| self.dismiss(*id)).count()
    }

    /// Open toasts, oldest first
    pub fn active(&self) -> Vec<Toast> {
        self.lock()
            .retained
            .iter()
            .map(|r| r.toast.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn broadcast(&self, toast: &Toast) {
        // Listeners run without the lock held so they may post toasts themselves
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(toast);
        }
    }
}

/// Keeps a listener registered on a [`NotificationHub`]
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
