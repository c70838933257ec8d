//! Render scheduling.
//!
//! Widgets never render themselves. When a store commits, a registry
//! re-indexes, a context snapshot is replaced, or an animation callback moves
//! a panel to a new phase, its [`RenderSource`] is marked dirty. The host
//! wakes once per batch and takes a [`RenderPass`] listing every source that
//! changed since the previous pass, in the order they first asked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::Notify;

/// What kind of state object asked for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Store,
    Registry,
    Context,
    Panel,
    Progress,
    Meter,
}

/// Identity of one state object that can ask for a render.
///
/// Clones of a store, panel or provider share their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RenderSource {
    kind: SourceKind,
    id: usize,
}

impl RenderSource {
    fn new(kind: SourceKind) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self {
            kind,
            id: COUNTER.fetch_add(1, Ordering::SeqCst),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

impl std::fmt::Display for RenderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.id)
    }
}

/// Sources that changed since the previous pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPass {
    sources: Vec<RenderSource>,
}

impl RenderPass {
    /// Dirty sources, in the order they first asked.
    pub fn sources(&self) -> &[RenderSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, source: RenderSource) -> bool {
        self.sources.contains(&source)
    }

    /// Dirty sources of one kind.
    pub fn of_kind(&self, kind: SourceKind) -> impl Iterator<Item = RenderSource> + '_ {
        self.sources
            .iter()
            .copied()
            .filter(move |source| source.kind == kind)
    }
}

#[derive(Debug, Default)]
struct Scheduler {
    dirty: Mutex<Vec<RenderSource>>,
    wake: Notify,
}

/// Requesting side, cloned into every state object the host renders.
#[derive(Clone, Debug)]
pub struct RenderSender {
    scheduler: Arc<Scheduler>,
}

impl RenderSender {
    /// Mark `source` dirty. Wakes the host when it is the first source of
    /// the batch; further requests before the next pass only join it.
    pub fn request(&self, source: RenderSource) {
        let Ok(mut dirty) = self.scheduler.dirty.lock() else {
            return;
        };
        if dirty.contains(&source) {
            return;
        }
        dirty.push(source);
        if dirty.len() == 1 {
            self.scheduler.wake.notify_one();
        }
    }
}

/// Host side: waits for and takes render passes.
#[derive(Debug)]
pub struct RenderReceiver {
    scheduler: Arc<Scheduler>,
}

impl RenderReceiver {
    /// Wait until at least one source is dirty, then take the pass.
    pub async fn recv(&mut self) -> RenderPass {
        loop {
            let pass = self.take_pass();
            if !pass.is_empty() {
                return pass;
            }
            self.scheduler.wake.notified().await;
        }
    }

    /// Take whatever is dirty without waiting. The pass may be empty.
    pub fn take_pass(&mut self) -> RenderPass {
        let sources = self
            .scheduler
            .dirty
            .lock()
            .map(|mut dirty| std::mem::take(&mut *dirty))
            .unwrap_or_default();
        RenderPass { sources }
    }
}

/// Create a connected sender and receiver.
pub fn channel() -> (RenderSender, RenderReceiver) {
    let scheduler = Arc::new(Scheduler::default());
    (
        RenderSender {
            scheduler: Arc::clone(&scheduler),
        },
        RenderReceiver { scheduler },
    )
}

/// A state object's source plus the sender the host installs later.
///
/// Requests made before a sender is installed are dropped.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    source: RenderSource,
    sender: Arc<Mutex<Option<RenderSender>>>,
}

impl RenderHandle {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            source: RenderSource::new(kind),
            sender: Arc::new(Mutex::new(None)),
        }
    }

    pub fn source(&self) -> RenderSource {
        self.source
    }

    /// Install the host's sender, replacing any previous one.
    pub fn install(&self, sender: RenderSender) {
        if let Ok(mut slot) = self.sender.lock() {
            *slot = Some(sender);
        }
    }

    /// Mark this source dirty if a sender is installed.
    pub fn request(&self) {
        if let Ok(slot) = self.sender.lock()
            && let Some(sender) = slot.as_ref()
        {
            sender.request(self.source);
        }
    }
}
