//! Radio group widget state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::context::{ContextConsumer, ContextProvider};
use crate::error::ConfigError;
use crate::focus::{Direction, FocusMove, Orientation, RovingFocus};
use crate::handle::ElementHandle;
use crate::identity::ItemKey;
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::registry::{CompositeRegistry, DocumentPosition};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Radio group configuration.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub disabled: bool,
    pub read_only: bool,
    pub orientation: Orientation,
    pub direction: Direction,
    pub loop_focus: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            read_only: false,
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            loop_focus: true,
        }
    }
}

impl RadioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn loop_focus(mut self, loop_focus: bool) -> Self {
        self.loop_focus = loop_focus;
        self
    }
}

/// Derived radio group state broadcast to radios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioContext<T> {
    pub value: Option<T>,
    pub disabled: bool,
    pub read_only: bool,
    pub orientation: Orientation,
    pub direction: Direction,
}

/// A group of mutually exclusive radios.
///
/// Every arrow key moves focus within the group, and selection follows
/// focus. Disabled radios are skipped.
#[derive(Clone)]
pub struct RadioGroup<T: ItemKey> {
    config: Arc<RwLock<RadioConfig>>,
    store: ControlledValueStore<Option<T>>,
    focus: RovingFocus,
    values: Arc<RwLock<HashMap<ElementHandle, T>>>,
    context: ContextProvider<RadioContext<T>>,
}

impl<T: ItemKey> RadioGroup<T> {
    /// Create a radio group. `value` being `Some` makes it controlled.
    pub fn new(config: RadioConfig, value: Option<Option<T>>, default: Option<T>) -> Self {
        let store = ControlledValueStore::new(value, default);
        let context = ContextProvider::new(Self::derive(&config, store.current()));
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            focus: RovingFocus::new(CompositeRegistry::new()),
            values: Arc::new(RwLock::new(HashMap::new())),
            context,
        }
    }

    fn derive(config: &RadioConfig, value: Option<T>) -> RadioContext<T> {
        RadioContext {
            value,
            disabled: config.disabled,
            read_only: config.read_only,
            orientation: config.orientation,
            direction: config.direction,
        }
    }

    fn config(&self) -> RadioConfig {
        self.config
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Recompute the derived context and broadcast it if it changed.
    pub fn refresh(&self) -> bool {
        self.context
            .publish(Self::derive(&self.config(), self.store.current()))
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// The selected value, if any.
    pub fn value(&self) -> Option<T> {
        self.store.current()
    }

    /// Check if a value is selected.
    pub fn is_selected(&self, value: &T) -> bool {
        self.store.with(|current| current.as_ref() == Some(value))
    }

    /// Read-only handle to the derived context.
    pub fn context(&self) -> ContextConsumer<RadioContext<T>> {
        self.context.consumer()
    }

    /// Registry of radios.
    pub fn registry(&self) -> &CompositeRegistry {
        self.focus.registry()
    }

    /// The radio reachable with Tab: the checked one when it can take focus,
    /// otherwise the roving tab stop.
    pub fn tab_stop(&self) -> Option<ElementHandle> {
        let checked = self.values.read().ok().and_then(|values| {
            values
                .iter()
                .find(|(_, v)| self.is_selected(v))
                .map(|(handle, _)| *handle)
        });
        match checked {
            Some(handle) if !self.focus.is_disabled(&handle) => Some(handle),
            _ => self.focus.tab_stop(),
        }
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Subscribe to value change requests.
    pub fn on_value_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Option<T>, &mut ChangeRequest<Option<T>>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Select `value`. Ignored when disabled or read-only.
    pub fn select(&self, value: &T, reason: ChangeReason) -> bool {
        let config = self.config();
        if config.disabled || config.read_only {
            return false;
        }
        let accepted = self.store.request_change(Some(value.clone()), reason);
        self.refresh();
        accepted
    }

    /// Re-supply the controlled value on a parent render.
    pub fn set_value(&self, value: Option<Option<T>>) -> Result<bool, ConfigError> {
        let changed = self.store.set_external(value)?;
        self.refresh();
        Ok(changed)
    }

    pub fn set_disabled(&self, disabled: bool) {
        if let Ok(mut guard) = self.config.write() {
            guard.disabled = disabled;
        }
        self.refresh();
    }

    pub fn set_read_only(&self, read_only: bool) {
        if let Ok(mut guard) = self.config.write() {
            guard.read_only = read_only;
        }
        self.refresh();
    }

    /// Install the render sender on the store, registry and context.
    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender.clone());
        self.focus.registry().install_render(sender.clone());
        self.context.install_render(sender);
    }

    /// Keydown inside the group. Arrows move focus and select the focused
    /// radio; Space selects the focused radio.
    pub fn handle_key(&self, key: Key) -> bool {
        let config = self.config();
        let rtl = config.direction == Direction::Rtl;
        let movement = match key {
            Key::ArrowDown => FocusMove::Next,
            Key::ArrowUp => FocusMove::Prev,
            Key::ArrowRight if rtl => FocusMove::Prev,
            Key::ArrowRight => FocusMove::Next,
            Key::ArrowLeft if rtl => FocusMove::Next,
            Key::ArrowLeft => FocusMove::Prev,
            Key::Space => {
                return self
                    .focus
                    .current()
                    .and_then(|handle| self.value_of(&handle))
                    .is_some_and(|value| self.select(&value, ChangeReason::Keyboard));
            }
            _ => return false,
        };
        if self.focus.current().is_none()
            && let Some(stop) = self.tab_stop()
        {
            self.focus.focus(stop);
        }
        let Some(target) = self.focus.move_focus(movement, config.loop_focus) else {
            return false;
        };
        if let Some(value) = self.value_of(&target) {
            self.select(&value, ChangeReason::Keyboard);
        }
        true
    }

    fn value_of(&self, handle: &ElementHandle) -> Option<T> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(handle).cloned())
    }

    /// Mount a radio for `value` at `position`.
    pub fn radio(&self, value: T, position: impl Into<DocumentPosition>) -> Radio<T> {
        let handle = ElementHandle::new();
        if let Ok(mut values) = self.values.write() {
            values.insert(handle, value.clone());
        }
        self.focus.registry().register(handle, position);
        Radio {
            handle,
            value,
            disabled: Arc::new(AtomicBool::new(false)),
            group: self.clone(),
        }
    }
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioSnapshot<T> {
    pub value: T,
    pub index: Option<usize>,
    pub checked: bool,
    pub disabled: bool,
    pub tab_index: i32,
}

/// One radio of a group.
pub struct Radio<T: ItemKey> {
    handle: ElementHandle,
    value: T,
    disabled: Arc<AtomicBool>,
    group: RadioGroup<T>,
}

impl<T: ItemKey> Radio<T> {
    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn index(&self) -> Option<usize> {
        self.group.registry().index_of(&self.handle)
    }

    pub fn is_checked(&self) -> bool {
        self.group.is_selected(&self.value)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst) || self.group.config().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
        self.group.focus.set_disabled(self.handle, disabled);
    }

    /// Clicked.
    pub fn press(&self) -> bool {
        if self.is_disabled() {
            return false;
        }
        self.group.focus.focus(self.handle);
        self.group.select(&self.value, ChangeReason::TriggerPress)
    }

    pub fn snapshot(&self) -> RadioSnapshot<T> {
        RadioSnapshot {
            value: self.value.clone(),
            index: self.index(),
            checked: self.is_checked(),
            disabled: self.is_disabled(),
            tab_index: if self.group.tab_stop() == Some(self.handle) {
                0
            } else {
                -1
            },
        }
    }

    /// Remove the radio from its group.
    pub fn unmount(self) {
        self.group.focus.unregister(&self.handle);
        if let Ok(mut values) = self.group.values.write() {
            values.remove(&self.handle);
        }
    }
}
