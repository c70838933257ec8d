//! Cancelable "value is about to change" notifications.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Why a change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeReason {
    /// A trigger was pressed (click or Enter/Space on a trigger).
    TriggerPress,
    /// A pointer interaction other than a trigger press (slider drag).
    Pointer,
    /// Keyboard navigation (arrows, Home/End, Escape).
    Keyboard,
    /// The host found text inside a hidden-until-found panel.
    BeforeMatch,
    /// Requested from code.
    Programmatic,
}

/// A proposed change, mutable only during a single notification pass.
///
/// Listeners may cancel the request; nothing can un-cancel it.
#[derive(Debug, Clone)]
pub struct ChangeRequest<T> {
    proposed: T,
    reason: ChangeReason,
    canceled: bool,
}

impl<T> ChangeRequest<T> {
    /// Create a new, not yet canceled request.
    pub fn new(proposed: T, reason: ChangeReason) -> Self {
        Self {
            proposed,
            reason,
            canceled: false,
        }
    }

    /// The value that will be committed if nobody cancels.
    pub fn proposed(&self) -> &T {
        &self.proposed
    }

    /// Why the change was requested.
    pub fn reason(&self) -> ChangeReason {
        self.reason
    }

    /// Cancel the change.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    /// Whether any listener canceled the change.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Take the proposed value.
    pub fn into_proposed(self) -> T {
        self.proposed
    }
}

/// Identifier returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__listener_{}", self.0)
    }
}

/// Listener invoked with the current (pre-change) value and the request.
pub type ChangeListener<T> = Arc<dyn Fn(&T, &mut ChangeRequest<T>) + Send + Sync>;

/// A single cancelable change event with any number of listeners.
///
/// Cloning shares the listener list.
pub struct ChangeNotifier<T> {
    listeners: Arc<RwLock<Vec<(ListenerId, ChangeListener<T>)>>>,
}

impl<T> ChangeNotifier<T> {
    /// Create a notifier with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a listener. Listeners run in subscription order.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T, &mut ChangeRequest<T>) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        if let Ok(mut guard) = self.listeners.write() {
            guard.push((id, Arc::new(listener)));
        }
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let Ok(mut guard) = self.listeners.write() else {
            return false;
        };
        let before = guard.len();
        guard.retain(|(listener_id, _)| *listener_id != id);
        guard.len() != before
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run one notification pass.
    ///
    /// Every listener sees `current`, the value before the change. Returns
    /// true when the request was not canceled. The listener list is cloned
    /// before the pass so listeners may subscribe or unsubscribe freely.
    ///
    /// A listener that panics is unsubscribed and the request is canceled,
    /// since its veto is unknown. The remaining listeners still run.
    pub fn notify(&self, current: &T, request: &mut ChangeRequest<T>) -> bool {
        let listeners: Vec<(ListenerId, ChangeListener<T>)> = self
            .listeners
            .read()
            .map(|guard| guard.iter().map(|(id, l)| (*id, Arc::clone(l))).collect())
            .unwrap_or_default();

        for (id, listener) in listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(current, request)));
            if let Err(payload) = result {
                log::error!(
                    "Change listener {} panicked, removing it: {}",
                    id,
                    panic_message(payload.as_ref())
                );
                self.unsubscribe(id);
                request.cancel();
            }
        }
        !request.is_canceled()
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ChangeNotifier<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
