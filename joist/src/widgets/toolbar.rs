//! Toolbar: a row of controls sharing one tab stop.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::context::{ContextConsumer, ContextProvider};
use crate::focus::{Direction, FocusPolicy, Orientation, RovingFocus};
use crate::handle::ElementHandle;
use crate::keys::Key;
use crate::registry::{CompositeRegistry, DocumentPosition};
use crate::render::RenderSender;

/// Toolbar configuration.
#[derive(Debug, Clone)]
pub struct ToolbarConfig {
    pub disabled: bool,
    pub orientation: Orientation,
    pub direction: Direction,
    pub loop_focus: bool,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            orientation: Orientation::Horizontal,
            direction: Direction::Ltr,
            loop_focus: true,
        }
    }
}

impl ToolbarConfig {
    pub fn new() -> Self {
        Self::default()
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

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Derived toolbar state broadcast to items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolbarContext {
    pub disabled: bool,
    pub orientation: Orientation,
    pub direction: Direction,
}

/// Toolbar root.
#[derive(Debug, Clone)]
pub struct Toolbar {
    config: Arc<RwLock<ToolbarConfig>>,
    focus: RovingFocus,
    context: ContextProvider<ToolbarContext>,
}

impl Toolbar {
    pub fn new(config: ToolbarConfig) -> Self {
        let context = ContextProvider::new(Self::derive(&config));
        Self {
            config: Arc::new(RwLock::new(config)),
            focus: RovingFocus::new(CompositeRegistry::new()),
            context,
        }
    }

    fn derive(config: &ToolbarConfig) -> ToolbarContext {
        ToolbarContext {
            disabled: config.disabled,
            orientation: config.orientation,
            direction: config.direction,
        }
    }

    fn config(&self) -> ToolbarConfig {
        self.config
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn update_config(&self, f: impl FnOnce(&mut ToolbarConfig)) {
        if let Ok(mut guard) = self.config.write() {
            f(&mut guard);
        }
        self.context.publish(Self::derive(&self.config()));
    }

    pub fn context(&self) -> ContextConsumer<ToolbarContext> {
        self.context.consumer()
    }

    pub fn registry(&self) -> &CompositeRegistry {
        self.focus.registry()
    }

    pub fn focus(&self) -> &RovingFocus {
        &self.focus
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.update_config(|config| config.orientation = orientation);
    }

    pub fn set_direction(&self, direction: Direction) {
        self.update_config(|config| config.direction = direction);
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.update_config(|config| config.disabled = disabled);
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.focus.registry().install_render(sender.clone());
        self.context.install_render(sender);
    }

    /// Move focus between items. Returns the newly focused item.
    pub fn handle_key(&self, key: Key) -> Option<ElementHandle> {
        let config = self.config();
        if config.disabled {
            return None;
        }
        let policy = FocusPolicy {
            orientation: config.orientation,
            direction: config.direction,
            loop_focus: config.loop_focus,
        };
        self.focus.handle_key(key, &policy)
    }

    /// Mount an item at `position`.
    ///
    /// Disabled items stay focusable unless `focusable_when_disabled` is
    /// false, in which case arrow navigation skips them.
    pub fn item(
        &self,
        position: impl Into<DocumentPosition>,
        disabled: bool,
        focusable_when_disabled: bool,
    ) -> ToolbarItem {
        let handle = ElementHandle::new();
        self.focus.registry().register(handle, position);
        self.focus
            .set_disabled(handle, disabled && !focusable_when_disabled);
        ToolbarItem {
            handle,
            disabled,
            toolbar: self.clone(),
        }
    }
}

/// One toolbar control.
#[derive(Debug)]
pub struct ToolbarItem {
    handle: ElementHandle,
    disabled: bool,
    toolbar: Toolbar,
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolbarItemSnapshot {
    pub index: Option<usize>,
    pub disabled: bool,
    pub tab_index: i32,
    pub orientation: Orientation,
}

impl ToolbarItem {
    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    pub fn index(&self) -> Option<usize> {
        self.toolbar.registry().index_of(&self.handle)
    }

    /// Disabled here or on the toolbar.
    pub fn is_disabled(&self) -> bool {
        self.disabled || self.toolbar.config().disabled
    }

    /// Focus this item (pointer down).
    pub fn focus(&self) -> bool {
        self.toolbar.focus().focus(self.handle)
    }

    pub fn snapshot(&self) -> ToolbarItemSnapshot {
        ToolbarItemSnapshot {
            index: self.index(),
            disabled: self.is_disabled(),
            tab_index: self.toolbar.focus().tab_index(&self.handle),
            orientation: self.toolbar.config().orientation,
        }
    }

    pub fn unmount(self) {
        self.toolbar.focus().unregister(&self.handle);
    }
}
