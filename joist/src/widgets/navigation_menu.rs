//! Navigation menu: a bar of triggers, at most one active item whose
//! content panel is shown.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::context::{ContextConsumer, ContextProvider};
use crate::driver::AnimationDriver;
use crate::error::{ConfigError, DriverError};
use crate::focus::{Direction, FocusPolicy, Orientation, RovingFocus};
use crate::handle::ElementHandle;
use crate::identity::{self, ItemKey};
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::panel::{PanelConfig, PanelLifecycle, PanelSnapshot};
use crate::registry::{CompositeRegistry, DocumentPosition};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Navigation menu configuration.
#[derive(Debug, Clone)]
pub struct NavigationMenuConfig {
    pub orientation: Orientation,
    pub direction: Direction,
    pub loop_focus: bool,
    /// Keep inactive content in the output.
    pub keep_mounted: bool,
}

impl Default for NavigationMenuConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            direction: Direction::Ltr,
            loop_focus: true,
            keep_mounted: false,
        }
    }
}

impl NavigationMenuConfig {
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

    pub fn keep_mounted(mut self, keep: bool) -> Self {
        self.keep_mounted = keep;
        self
    }
}

/// Derived menu state broadcast to items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationMenuContext<T> {
    /// The active item, if any.
    pub value: Option<T>,
    pub orientation: Orientation,
    pub direction: Direction,
}

/// Navigation menu root.
#[derive(Clone)]
pub struct NavigationMenu<T: ItemKey> {
    config: Arc<RwLock<NavigationMenuConfig>>,
    store: ControlledValueStore<Option<T>>,
    context: ContextProvider<NavigationMenuContext<T>>,
    focus: RovingFocus,
    driver: Arc<dyn AnimationDriver>,
}

impl<T: ItemKey> NavigationMenu<T> {
    /// Create a menu. `value` being `Some` makes it controlled.
    pub fn new(
        config: NavigationMenuConfig,
        value: Option<Option<T>>,
        default: Option<T>,
        driver: Arc<dyn AnimationDriver>,
    ) -> Self {
        let store = ControlledValueStore::new(value, default);
        let context = ContextProvider::new(Self::derive(&config, store.current()));
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            context,
            focus: RovingFocus::new(CompositeRegistry::new()),
            driver,
        }
    }

    fn derive(config: &NavigationMenuConfig, value: Option<T>) -> NavigationMenuContext<T> {
        NavigationMenuContext {
            value,
            orientation: config.orientation,
            direction: config.direction,
        }
    }

    fn config(&self) -> NavigationMenuConfig {
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

    /// The active item.
    pub fn value(&self) -> Option<T> {
        self.store.current()
    }

    /// Whether any item is active.
    pub fn is_open(&self) -> bool {
        self.store.with(Option::is_some)
    }

    pub fn is_active(&self, item: &T) -> bool {
        self.store.with(|value| value.as_ref() == Some(item))
    }

    pub fn context(&self) -> ContextConsumer<NavigationMenuContext<T>> {
        self.context.consumer()
    }

    pub fn registry(&self) -> &CompositeRegistry {
        self.focus.registry()
    }

    /// Subscribe to active item change requests.
    pub fn on_value_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Option<T>, &mut ChangeRequest<Option<T>>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Activate `item`, or close it if it is already active.
    pub fn activate(&self, item: &T, reason: ChangeReason) -> bool {
        let next = if self.is_active(item) {
            None
        } else {
            Some(item.clone())
        };
        let accepted = self.store.request_change(next, reason);
        self.refresh();
        accepted
    }

    /// Close the active item.
    pub fn close(&self, reason: ChangeReason) -> bool {
        let accepted = self.store.request_change(None, reason);
        self.refresh();
        accepted
    }

    /// Re-supply the controlled value on a parent render.
    pub fn set_value(&self, value: Option<Option<T>>) -> Result<bool, ConfigError> {
        let changed = self.store.set_external(value)?;
        self.refresh();
        Ok(changed)
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender.clone());
        self.focus.registry().install_render(sender.clone());
        self.context.install_render(sender);
    }

    /// Keydown in the trigger bar. Escape closes; arrows, Home and End move
    /// trigger focus. Returns true if handled.
    pub fn handle_key(&self, key: Key) -> bool {
        if key == Key::Escape {
            return self.is_open() && self.close(ChangeReason::Keyboard);
        }
        let config = self.config();
        let policy = FocusPolicy {
            orientation: config.orientation,
            direction: config.direction,
            loop_focus: config.loop_focus,
        };
        self.focus.handle_key(key, &policy).is_some()
    }

    /// Mount an item whose trigger sits at `position`.
    pub fn item(
        &self,
        value: Option<T>,
        position: impl Into<DocumentPosition>,
    ) -> Result<NavigationMenuItem<T>, ConfigError> {
        let value = identity::resolve(value)?;
        let trigger = ElementHandle::new();
        self.focus.registry().register(trigger, position);

        let panel = PanelLifecycle::new(
            PanelConfig::new()
                .keep_mounted(self.config().keep_mounted)
                .initially_open(self.is_active(&value))
                .css_var_prefix("navigation-menu-content"),
            Arc::clone(&self.driver),
        );
        let follower = panel.clone();
        let watched = value.clone();
        let subscription = self.context.consumer().subscribe(move |snapshot| {
            follower.set_open(snapshot.value.as_ref() == Some(&watched));
        });

        Ok(NavigationMenuItem {
            value,
            trigger,
            menu: self.clone(),
            panel,
            subscription,
        })
    }
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationMenuItemSnapshot<T> {
    pub value: T,
    pub index: Option<usize>,
    pub active: bool,
    pub tab_index: i32,
    pub content: PanelSnapshot,
}

/// One menu item: trigger plus content panel.
pub struct NavigationMenuItem<T: ItemKey> {
    value: T,
    trigger: ElementHandle,
    menu: NavigationMenu<T>,
    panel: PanelLifecycle,
    subscription: ListenerId,
}

impl<T: ItemKey> NavigationMenuItem<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn trigger(&self) -> ElementHandle {
        self.trigger
    }

    pub fn content(&self) -> &PanelLifecycle {
        &self.panel
    }

    pub fn index(&self) -> Option<usize> {
        self.menu.registry().index_of(&self.trigger)
    }

    pub fn is_active(&self) -> bool {
        self.menu.is_active(&self.value)
    }

    /// Trigger pressed.
    pub fn press(&self) -> bool {
        self.menu.focus.focus(self.trigger);
        self.menu.activate(&self.value, ChangeReason::TriggerPress)
    }

    pub fn snapshot(&self) -> NavigationMenuItemSnapshot<T> {
        NavigationMenuItemSnapshot {
            value: self.value.clone(),
            index: self.index(),
            active: self.is_active(),
            tab_index: self.menu.focus.tab_index(&self.trigger),
            content: self.panel.snapshot(),
        }
    }

    /// Unmount the item and release its content panel.
    pub async fn unmount(self) -> Result<(), DriverError> {
        self.menu.focus.unregister(&self.trigger);
        self.menu.context().unsubscribe(self.subscription);
        self.panel.dispose().await
    }
}
