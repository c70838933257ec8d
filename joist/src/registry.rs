//! Order-stable registration of composite list children.
//!
//! Children register with the nearest list-providing ancestor and receive a
//! 0-based index that follows document order. Order is decided by a
//! [`DocumentPosition`] the host supplies (the child's path of sibling
//! offsets from the list root), with the handle's creation sequence as the
//! tie-breaker. Registration call order never decides the index.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::handle::ElementHandle;
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};

/// Position of an element in the tree, as sibling offsets from the list
/// root. Lexicographic order is document order: an ancestor precedes its
/// descendants, and earlier siblings precede later ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct DocumentPosition(Vec<u32>);

impl DocumentPosition {
    /// Build a position from a path of sibling offsets.
    pub fn new(path: impl Into<Vec<u32>>) -> Self {
        Self(path.into())
    }

    /// Position of the `offset`-th child of this position.
    pub fn child(&self, offset: u32) -> Self {
        let mut path = self.0.clone();
        path.push(offset);
        Self(path)
    }

    /// Position of the next sibling at the same depth.
    pub fn next_sibling(&self) -> Self {
        let mut path = self.0.clone();
        match path.last_mut() {
            Some(last) => *last = last.saturating_add(1),
            None => path.push(0),
        }
        Self(path)
    }

    /// The sibling offsets.
    pub fn path(&self) -> &[u32] {
        &self.0
    }
}

impl From<u32> for DocumentPosition {
    fn from(offset: u32) -> Self {
        Self(vec![offset])
    }
}

/// A live registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeEntry {
    pub handle: ElementHandle,
    pub index: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    handle: ElementHandle,
    position: DocumentPosition,
}

impl Slot {
    fn cmp_key(&self, position: &DocumentPosition, sequence: u64) -> CmpOrdering {
        self.position
            .cmp(position)
            .then_with(|| self.handle.sequence().cmp(&sequence))
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Sorted by (position, creation sequence). Index = slot offset.
    slots: Vec<Slot>,
    indices: HashMap<ElementHandle, usize>,
}

impl RegistryInner {
    fn insert(&mut self, handle: ElementHandle, position: DocumentPosition) -> usize {
        let at = match self
            .slots
            .binary_search_by(|slot| slot.cmp_key(&position, handle.sequence()))
        {
            Ok(at) | Err(at) => at,
        };
        self.slots.insert(at, Slot { handle, position });
        self.reindex_from(at);
        at
    }

    fn remove(&mut self, handle: &ElementHandle) -> Option<usize> {
        let at = self.indices.remove(handle)?;
        self.slots.remove(at);
        self.reindex_from(at);
        Some(at)
    }

    /// Reassign indices to the tail starting at `from`.
    fn reindex_from(&mut self, from: usize) {
        for (offset, slot) in self.slots.iter().enumerate().skip(from) {
            self.indices.insert(slot.handle, offset);
        }
        debug_assert!(self.is_consistent(), "registry indices out of sync");
    }

    fn is_consistent(&self) -> bool {
        self.indices.len() == self.slots.len()
            && self
                .slots
                .iter()
                .enumerate()
                .all(|(i, slot)| self.indices.get(&slot.handle) == Some(&i))
            && self.slots.windows(2).all(|pair| {
                pair[0].cmp_key(&pair[1].position, pair[1].handle.sequence()) == CmpOrdering::Less
            })
    }
}

/// Registry mapping live children to gap-free, document-ordered indices.
///
/// Owned by one list-providing ancestor. Cloning shares the registry.
#[derive(Debug, Clone)]
pub struct CompositeRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    dirty: Arc<AtomicBool>,
    render: RenderHandle,
}

impl Default for CompositeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            dirty: Arc::new(AtomicBool::new(false)),
            render: RenderHandle::new(SourceKind::Registry),
        }
    }

    /// Register a child at `position`, returning its index.
    ///
    /// Entries after the insertion point shift up by one. Registering a
    /// handle that is already present moves it to `position`.
    pub fn register(&self, handle: ElementHandle, position: impl Into<DocumentPosition>) -> usize {
        let position = position.into();
        let index = {
            let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
            if let Some(&existing) = guard.indices.get(&handle) {
                if guard.slots[existing].position == position {
                    return existing;
                }
                guard.remove(&handle);
            }
            guard.insert(handle, position)
        };
        log::debug!("Registered {} at index {}", handle, index);
        self.mark_changed();
        index
    }

    /// Register a child after every current entry.
    ///
    /// For hosts that mount children strictly in document order and cannot
    /// compute positions.
    pub fn register_last(&self, handle: ElementHandle) -> usize {
        let position = {
            let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
            if let Some(&existing) = guard.indices.get(&handle) {
                return existing;
            }
            guard
                .slots
                .last()
                .map(|slot| slot.position.next_sibling())
                .unwrap_or_else(|| DocumentPosition::from(0))
        };
        self.register(handle, position)
    }

    /// Move a registered child to a new position (keyed reorder).
    ///
    /// Returns the new index, or `None` if the handle is not registered.
    pub fn reposition(
        &self,
        handle: ElementHandle,
        position: impl Into<DocumentPosition>,
    ) -> Option<usize> {
        if !self.contains(&handle) {
            return None;
        }
        Some(self.register(handle, position))
    }

    /// Remove a child. Entries after it shift down by one.
    ///
    /// Unregistering a handle that is not present is a no-op, which makes
    /// unregister-before-register races during fast remounts harmless.
    pub fn unregister(&self, handle: &ElementHandle) -> Option<usize> {
        let removed = self
            .inner
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(handle);
        match removed {
            Some(index) => {
                log::debug!("Unregistered {} from index {}", handle, index);
                self.mark_changed();
            }
            None => log::trace!("Unregister of unknown handle {} ignored", handle),
        }
        removed
    }

    /// Current index of a handle.
    pub fn index_of(&self, handle: &ElementHandle) -> Option<usize> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.indices.get(handle).copied())
    }

    /// Handle at an index.
    pub fn handle_at(&self, index: usize) -> Option<ElementHandle> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.slots.get(index).map(|slot| slot.handle))
    }

    /// Whether a handle is registered.
    pub fn contains(&self, handle: &ElementHandle) -> bool {
        self.index_of(handle).is_some()
    }

    /// Handles in index order.
    pub fn handles(&self) -> Vec<ElementHandle> {
        self.inner
            .read()
            .map(|guard| guard.slots.iter().map(|slot| slot.handle).collect())
            .unwrap_or_default()
    }

    /// All live entries in index order.
    pub fn entries(&self) -> Vec<CompositeEntry> {
        self.handles()
            .into_iter()
            .enumerate()
            .map(|(index, handle)| CompositeEntry { handle, index })
            .collect()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.slots.len()).unwrap_or(0)
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Install the render sender used after index changes.
    pub fn install_render(&self, sender: RenderSender) {
        self.render.install(sender);
    }

    pub fn render_source(&self) -> RenderSource {
        self.render.source()
    }

    /// Check if indices changed since the last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn mark_changed(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        self.render.request();
    }
}
