//! Roving focus over the items of a composite list.
//!
//! Only one item of a composite is a tab stop; arrow keys move that stop
//! between registered items in index order, skipping disabled ones.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::handle::ElementHandle;
use crate::keys::Key;
use crate::registry::CompositeRegistry;

/// Layout axis of a composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Text direction; flips horizontal arrows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// How keys map to focus moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocusPolicy {
    pub orientation: Orientation,
    pub direction: Direction,
    /// Wrap from the last item to the first and back.
    pub loop_focus: bool,
}

impl Default for FocusPolicy {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            loop_focus: true,
        }
    }
}

/// A relative focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Next,
    Prev,
    First,
    Last,
}

impl FocusMove {
    /// Map a key to a move under `policy`. Arrows across the orientation
    /// axis are ignored.
    pub fn from_key(key: Key, policy: &FocusPolicy) -> Option<Self> {
        let forward_back = |forward: bool| if forward { Self::Next } else { Self::Prev };
        match (key, policy.orientation) {
            (Key::Home, _) => Some(Self::First),
            (Key::End, _) => Some(Self::Last),
            (Key::ArrowDown, Orientation::Vertical) => Some(Self::Next),
            (Key::ArrowUp, Orientation::Vertical) => Some(Self::Prev),
            (Key::ArrowRight, Orientation::Horizontal) => {
                Some(forward_back(policy.direction == Direction::Ltr))
            }
            (Key::ArrowLeft, Orientation::Horizontal) => {
                Some(forward_back(policy.direction == Direction::Rtl))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct FocusInner {
    current: Option<ElementHandle>,
    disabled: HashSet<ElementHandle>,
}

/// Roving tab stop bound to a [`CompositeRegistry`].
///
/// Cloning shares the focus state.
#[derive(Debug, Clone)]
pub struct RovingFocus {
    registry: CompositeRegistry,
    inner: Arc<RwLock<FocusInner>>,
}

impl RovingFocus {
    /// Create roving focus over `registry`.
    pub fn new(registry: CompositeRegistry) -> Self {
        Self {
            registry,
            inner: Arc::new(RwLock::new(FocusInner::default())),
        }
    }

    /// The registry this focus moves over.
    pub fn registry(&self) -> &CompositeRegistry {
        &self.registry
    }

    /// The item last focused, if still registered.
    pub fn current(&self) -> Option<ElementHandle> {
        let current = self.inner.read().ok().and_then(|inner| inner.current)?;
        self.registry.contains(&current).then_some(current)
    }

    /// Mark an item disabled or enabled.
    pub fn set_disabled(&self, handle: ElementHandle, disabled: bool) {
        if let Ok(mut inner) = self.inner.write() {
            if disabled {
                inner.disabled.insert(handle);
            } else {
                inner.disabled.remove(&handle);
            }
        }
    }

    /// Unregister an item and drop its focus state.
    pub fn unregister(&self, handle: &ElementHandle) -> Option<usize> {
        if let Ok(mut inner) = self.inner.write() {
            inner.disabled.remove(handle);
            if inner.current.as_ref() == Some(handle) {
                inner.current = None;
            }
        }
        self.registry.unregister(handle)
    }

    /// Number of items currently marked disabled.
    pub fn disabled_count(&self) -> usize {
        self.inner.read().map(|inner| inner.disabled.len()).unwrap_or(0)
    }

    /// Whether an item is disabled.
    pub fn is_disabled(&self, handle: &ElementHandle) -> bool {
        self.inner
            .read()
            .map(|inner| inner.disabled.contains(handle))
            .unwrap_or(false)
    }

    /// Focus an item directly (click or programmatic focus).
    /// Returns true if focus changed.
    pub fn focus(&self, handle: ElementHandle) -> bool {
        if !self.registry.contains(&handle) || self.is_disabled(&handle) {
            return false;
        }
        let Ok(mut inner) = self.inner.write() else {
            return false;
        };
        if inner.current == Some(handle) {
            return false;
        }
        inner.current = Some(handle);
        true
    }

    /// The single tab stop: the current item when it is still registered and
    /// enabled, otherwise the first enabled item.
    pub fn tab_stop(&self) -> Option<ElementHandle> {
        if let Some(current) = self.current()
            && !self.is_disabled(&current)
        {
            return Some(current);
        }
        self.enabled().first().copied()
    }

    /// `tabindex` for an item: 0 for the tab stop, -1 for the rest.
    pub fn tab_index(&self, handle: &ElementHandle) -> i32 {
        if self.tab_stop().as_ref() == Some(handle) {
            0
        } else {
            -1
        }
    }

    /// Handle a key. Returns the newly focused item if focus moved.
    pub fn handle_key(&self, key: Key, policy: &FocusPolicy) -> Option<ElementHandle> {
        let movement = FocusMove::from_key(key, policy)?;
        self.move_focus(movement, policy.loop_focus)
    }

    /// Move focus. Returns the newly focused item if focus moved.
    pub fn move_focus(&self, movement: FocusMove, loop_focus: bool) -> Option<ElementHandle> {
        let enabled = self.enabled();
        if enabled.is_empty() {
            return None;
        }
        let position = self
            .current()
            .and_then(|current| enabled.iter().position(|h| *h == current));

        let target = match (movement, position) {
            (FocusMove::First, _) | (FocusMove::Next, None) => enabled[0],
            (FocusMove::Last, _) | (FocusMove::Prev, None) => enabled[enabled.len() - 1],
            (FocusMove::Next, Some(i)) if i + 1 < enabled.len() => enabled[i + 1],
            (FocusMove::Next, Some(_)) if loop_focus => enabled[0],
            (FocusMove::Prev, Some(i)) if i > 0 => enabled[i - 1],
            (FocusMove::Prev, Some(_)) if loop_focus => enabled[enabled.len() - 1],
            _ => return None,
        };

        let Ok(mut inner) = self.inner.write() else {
            return None;
        };
        if inner.current == Some(target) {
            return None;
        }
        inner.current = Some(target);
        log::debug!("Focus moved to {} ({:?})", target, movement);
        Some(target)
    }

    /// Registered, enabled items in index order.
    fn enabled(&self) -> Vec<ElementHandle> {
        let disabled = self
            .inner
            .read()
            .map(|inner| inner.disabled.clone())
            .unwrap_or_default();
        self.registry
            .handles()
            .into_iter()
            .filter(|h| !disabled.contains(h))
            .collect()
    }
}
