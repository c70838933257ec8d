//! Broadcast of a root's derived state to its descendants.
//!
//! A root recomputes its snapshot from scratch whenever an input changes and
//! publishes it. The snapshot is swapped as a whole behind an `Arc`, so a
//! consumer sees either the old snapshot or the new one, never a mix.
//! Consumers get read-only access; state only flows back up through the
//! root's explicit request methods.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::notifier::ListenerId;
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};

type SnapshotListener<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

struct ProviderInner<S> {
    current: RwLock<Arc<S>>,
    version: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, SnapshotListener<S>)>>,
    render: RenderHandle,
}

/// Publishing side, held by the root.
pub struct ContextProvider<S> {
    inner: Arc<ProviderInner<S>>,
}

/// Reading side, handed to descendants.
pub struct ContextConsumer<S> {
    inner: Arc<ProviderInner<S>>,
}

impl<S> ContextProvider<S>
where
    S: PartialEq + Send + Sync + 'static,
{
    /// Create a provider holding `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                current: RwLock::new(Arc::new(initial)),
                version: AtomicU64::new(0),
                listeners: RwLock::new(Vec::new()),
                render: RenderHandle::new(SourceKind::Context),
            }),
        }
    }

    /// Replace the snapshot and notify subscribers.
    ///
    /// Returns false, and notifies nobody, when `snapshot` equals the current
    /// one. Listeners run after the swap, outside any lock, so they may read
    /// the provider or publish again.
    pub fn publish(&self, snapshot: S) -> bool {
        let next = Arc::new(snapshot);
        {
            let mut guard = self
                .inner
                .current
                .write()
                .unwrap_or_else(|p| p.into_inner());
            if **guard == *next {
                return false;
            }
            *guard = Arc::clone(&next);
        }
        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Context published (version {})", version);

        let listeners: Vec<SnapshotListener<S>> = self
            .inner
            .listeners
            .read()
            .map(|guard| guard.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(&next);
        }
        self.inner.render.request();
        true
    }

    /// Create a read-only handle for a descendant.
    pub fn consumer(&self) -> ContextConsumer<S> {
        ContextConsumer {
            inner: Arc::clone(&self.inner),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<S> {
        self.consumer().snapshot()
    }

    /// Number of snapshots published since construction.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Install the render sender used after each publish.
    pub fn install_render(&self, sender: RenderSender) {
        self.inner.render.install(sender);
    }

    pub fn render_source(&self) -> RenderSource {
        self.inner.render.source()
    }
}

impl<S> ContextConsumer<S>
where
    S: Send + Sync + 'static,
{
    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<S> {
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(|p| p.into_inner());
        Arc::clone(&guard)
    }

    /// Number of snapshots published since construction.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Receive every future snapshot, synchronously, as it is published.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        if let Ok(mut guard) = self.inner.listeners.write() {
            guard.push((id, Arc::new(listener)));
        }
        id
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let Ok(mut guard) = self.inner.listeners.write() else {
            return false;
        };
        let before = guard.len();
        guard.retain(|(listener_id, _)| *listener_id != id);
        guard.len() != before
    }
}

impl<S> Clone for ContextProvider<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Clone for ContextConsumer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for ContextProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextProvider")
            .field("version", &self.inner.version.load(Ordering::SeqCst))
            .finish()
    }
}

impl<S: fmt::Debug> fmt::Debug for ContextConsumer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextConsumer")
            .field("version", &self.inner.version.load(Ordering::SeqCst))
            .finish()
    }
}
