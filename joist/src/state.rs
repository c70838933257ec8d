//! Controlled and uncontrolled value reconciliation for widget roots.
//!
//! Every root keeps its value in a [`ControlledValueStore`]. Change requests
//! pass through the root's [`ChangeNotifier`] first, so listeners see the old
//! value and may veto before anything is committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::ConfigError;
use crate::notifier::{ChangeNotifier, ChangeReason, ChangeRequest, ListenerId};
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};

/// Where the authoritative value lives. Decided once, at construction.
#[derive(Debug)]
enum Source<T> {
    /// Supplied by the parent on every render.
    External(T),
    /// Tracked by the store, seeded from the default value.
    Internal(T),
}

/// Reconciles an external value, a default value and cancelable change
/// requests into the single current value of a widget root.
///
/// A store built with an external value is *controlled*: requests are
/// announced but never committed, and the parent is expected to re-supply
/// the new value through [`set_external`](Self::set_external). A store built
/// without one is *uncontrolled* and commits accepted requests itself.
///
/// Cloning shares the underlying value, listeners and dirty flag.
///
/// # Example
///
/// ```
/// use joist::notifier::ChangeReason;
/// use joist::state::ControlledValueStore;
///
/// let store = ControlledValueStore::new(None, false);
/// assert!(store.request_change(true, ChangeReason::Programmatic));
/// assert!(store.current());
/// ```
#[derive(Debug)]
pub struct ControlledValueStore<T> {
    inner: Arc<RwLock<Source<T>>>,
    controlled: bool,
    notifier: ChangeNotifier<T>,
    notifying: Arc<AtomicBool>,
    dirty: Arc<AtomicBool>,
    render: RenderHandle,
}

/// Clears the re-entrancy flag when a notification pass ends, even if a
/// listener panics.
struct NotifyGuard<'a>(&'a AtomicBool);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T> ControlledValueStore<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a store. `external` being `Some` makes it controlled for its
    /// whole lifetime, whatever the value.
    pub fn new(external: Option<T>, default: T) -> Self {
        let controlled = external.is_some();
        let source = match external {
            Some(value) => Source::External(value),
            None => Source::Internal(default),
        };
        Self {
            inner: Arc::new(RwLock::new(source)),
            controlled,
            notifier: ChangeNotifier::new(),
            notifying: Arc::new(AtomicBool::new(false)),
            dirty: Arc::new(AtomicBool::new(false)),
            render: RenderHandle::new(SourceKind::Store),
        }
    }

    /// Create an uncontrolled store.
    pub fn uncontrolled(default: T) -> Self {
        Self::new(None, default)
    }

    /// Create a controlled store.
    pub fn controlled(value: T) -> Self {
        let default = value.clone();
        Self::new(Some(value), default)
    }

    /// Whether an external value was supplied at construction.
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Get a clone of the current value.
    pub fn current(&self) -> T {
        self.with(T::clone)
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match &*guard {
            Source::External(value) | Source::Internal(value) => f(value),
        }
    }

    /// Subscribe to change requests. Listeners see the pre-change value and
    /// may cancel the request.
    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T, &mut ChangeRequest<T>) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Remove a change listener.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Propose a new value.
    ///
    /// Runs one notification pass, then commits if nobody canceled and the
    /// store is uncontrolled. Returns whether the change was accepted.
    ///
    /// A candidate equal to the current value raises no notification and
    /// returns false. A request issued by a listener of this same store
    /// while its notification pass is running is rejected.
    pub fn request_change(&self, candidate: T, reason: ChangeReason) -> bool {
        if self
            .notifying
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Rejected re-entrant change request ({:?})", reason);
            return false;
        }
        let accepted = {
            let _guard = NotifyGuard(&self.notifying);
            let current = self.current();
            if current == candidate {
                return false;
            }
            let mut request = ChangeRequest::new(candidate, reason);
            if !self.notifier.notify(&current, &mut request) {
                log::debug!("Change request canceled ({:?})", reason);
                return false;
            }
            request
        };

        if self.controlled {
            log::debug!("Change accepted on controlled store, awaiting parent ({:?})", reason);
            return true;
        }

        debug_assert!(!accepted.is_canceled(), "canceled change must never commit");
        if let Ok(mut guard) = self.inner.write()
            && let Source::Internal(value) = &mut *guard
        {
            *value = accepted.into_proposed();
            self.dirty.store(true, Ordering::SeqCst);
        }
        self.render.request();
        true
    }

    /// Re-supply the external value on a parent render.
    ///
    /// `Some` on a controlled store replaces the value and returns whether
    /// it changed. `None` on an uncontrolled store is a no-op. Any attempt
    /// to switch control mode is rejected and leaves the store unchanged.
    pub fn set_external(&self, external: Option<T>) -> Result<bool, ConfigError> {
        match (self.controlled, external) {
            (true, Some(next)) => {
                let Ok(mut guard) = self.inner.write() else {
                    return Ok(false);
                };
                let Source::External(value) = &mut *guard else {
                    return Ok(false);
                };
                if *value == next {
                    return Ok(false);
                }
                *value = next;
                self.dirty.store(true, Ordering::SeqCst);
                drop(guard);
                self.render.request();
                Ok(true)
            }
            (false, None) => Ok(false),
            (was_controlled, _) => {
                log::warn!(
                    "Rejected control mode switch (was controlled: {})",
                    was_controlled
                );
                Err(ConfigError::ControlModeSwitch { was_controlled })
            }
        }
    }

    /// Install the render sender used after commits.
    pub fn install_render(&self, sender: RenderSender) {
        self.render.install(sender);
    }

    /// Source reported in render passes after a commit.
    pub fn render_source(&self) -> RenderSource {
        self.render.source()
    }

    /// Check if the value has been modified since the last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T> Clone for ControlledValueStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            controlled: self.controlled,
            notifier: self.notifier.clone(),
            notifying: Arc::clone(&self.notifying),
            dirty: Arc::clone(&self.dirty),
            render: self.render.clone(),
        }
    }
}

impl<T> Default for ControlledValueStore<T>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::uncontrolled(T::default())
    }
}
