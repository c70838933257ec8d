//! Accordion: a root holding the open set, items with a trigger and a panel.

use std::sync::atomic::{AtomicBool, Ordering};
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
use crate::selection::{self, SelectionMode};
use crate::state::ControlledValueStore;

/// Accordion configuration.
#[derive(Debug, Clone)]
pub struct AccordionConfig {
    /// Whether several items may be open at once.
    pub mode: SelectionMode,
    /// Ignore all presses.
    pub disabled: bool,
    pub orientation: Orientation,
    pub direction: Direction,
    /// Wrap trigger focus at the ends.
    pub loop_focus: bool,
    /// Keep closed panels in the output.
    pub keep_mounted: bool,
    /// Keep closed panels in the output, hidden until found.
    pub hidden_until_found: bool,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Single,
            disabled: false,
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            loop_focus: true,
            keep_mounted: false,
            hidden_until_found: false,
        }
    }
}

impl AccordionConfig {
    /// Create a single-select config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow several open items.
    pub fn multiple(mut self) -> Self {
        self.mode = SelectionMode::Multiple;
        self
    }

    /// Set the selection mode.
    pub fn mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Disable the whole accordion.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the layout axis.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the text direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set whether trigger focus wraps.
    pub fn loop_focus(mut self, loop_focus: bool) -> Self {
        self.loop_focus = loop_focus;
        self
    }

    /// Keep closed panels mounted.
    pub fn keep_mounted(mut self, keep: bool) -> Self {
        self.keep_mounted = keep;
        self
    }

    /// Hide closed panels until found.
    pub fn hidden_until_found(mut self, until_found: bool) -> Self {
        self.hidden_until_found = until_found;
        self
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy {
            orientation: self.orientation,
            direction: self.direction,
            loop_focus: self.loop_focus,
        }
    }
}

/// Derived accordion state broadcast to items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordionContext<T> {
    /// Open items, in the order they were opened.
    pub value: Vec<T>,
    pub mode: SelectionMode,
    pub disabled: bool,
    pub orientation: Orientation,
    pub direction: Direction,
    pub loop_focus: bool,
}

impl<T: PartialEq> AccordionContext<T> {
    /// Whether `item` is open.
    pub fn is_open(&self, item: &T) -> bool {
        self.value.contains(item)
    }
}

/// Accordion root.
///
/// Cloning shares the root.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use joist::driver::InstantDriver;
/// use joist::widgets::accordion::{Accordion, AccordionConfig};
///
/// let accordion = Accordion::new(
///     AccordionConfig::new(),
///     None,
///     Vec::<String>::new(),
///     Arc::new(InstantDriver::new()),
/// );
/// let first = accordion.item(Some("first".to_string()), 0u32).unwrap();
/// first.press();
/// assert_eq!(accordion.value(), vec!["first".to_string()]);
/// ```
#[derive(Clone)]
pub struct Accordion<T: ItemKey> {
    config: Arc<RwLock<AccordionConfig>>,
    store: ControlledValueStore<Vec<T>>,
    context: ContextProvider<AccordionContext<T>>,
    focus: RovingFocus,
    driver: Arc<dyn AnimationDriver>,
}

impl<T: ItemKey> Accordion<T> {
    /// Create an accordion. `value` makes it controlled; `default` seeds an
    /// uncontrolled one. Duplicates are dropped, and single mode keeps only
    /// the first value.
    pub fn new(
        config: AccordionConfig,
        value: Option<Vec<T>>,
        default: Vec<T>,
        driver: Arc<dyn AnimationDriver>,
    ) -> Self {
        let mode = config.mode;
        let value = value.map(|v| selection::normalize(&v, mode));
        let default = selection::normalize(&default, mode);
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

    fn derive(config: &AccordionConfig, value: Vec<T>) -> AccordionContext<T> {
        AccordionContext {
            value,
            mode: config.mode,
            disabled: config.disabled,
            orientation: config.orientation,
            direction: config.direction,
            loop_focus: config.loop_focus,
        }
    }

    fn config(&self) -> AccordionConfig {
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

    /// Open items, in the order they were opened.
    pub fn value(&self) -> Vec<T> {
        self.store.current()
    }

    /// Whether `item` is open.
    pub fn is_open(&self, item: &T) -> bool {
        self.store.with(|value| value.contains(item))
    }

    /// Whether the whole accordion is disabled.
    pub fn is_disabled(&self) -> bool {
        self.config().disabled
    }

    /// Whether the value is supplied by the parent.
    pub fn is_controlled(&self) -> bool {
        self.store.is_controlled()
    }

    /// Read-only handle to the derived context.
    pub fn context(&self) -> ContextConsumer<AccordionContext<T>> {
        self.context.consumer()
    }

    /// The current derived context.
    pub fn snapshot(&self) -> Arc<AccordionContext<T>> {
        self.context.snapshot()
    }

    /// Registry of item triggers.
    pub fn registry(&self) -> &CompositeRegistry {
        self.focus.registry()
    }

    /// Roving focus over item triggers.
    pub fn focus(&self) -> &RovingFocus {
        &self.focus
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Subscribe to value change requests.
    pub fn on_value_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Vec<T>, &mut ChangeRequest<Vec<T>>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Toggle `item` following the selection mode.
    ///
    /// Returns whether the change was accepted. Ignored when disabled.
    pub fn toggle(&self, item: &T, reason: ChangeReason) -> bool {
        let config = self.config();
        if config.disabled {
            return false;
        }
        let next = self
            .store
            .with(|current| selection::toggle(current, item, config.mode));
        let accepted = self.store.request_change(next, reason);
        self.refresh();
        accepted
    }

    /// Re-supply the controlled value on a parent render.
    pub fn set_value(&self, value: Option<Vec<T>>) -> Result<bool, ConfigError> {
        let mode = self.config().mode;
        let changed = self
            .store
            .set_external(value.map(|v| selection::normalize(&v, mode)))?;
        self.refresh();
        Ok(changed)
    }

    /// Enable or disable the whole accordion.
    pub fn set_disabled(&self, disabled: bool) {
        self.update_config(|config| config.disabled = disabled);
    }

    /// Change the layout axis.
    pub fn set_orientation(&self, orientation: Orientation) {
        self.update_config(|config| config.orientation = orientation);
    }

    /// Change the text direction.
    pub fn set_direction(&self, direction: Direction) {
        self.update_config(|config| config.direction = direction);
    }

    /// Change whether trigger focus wraps.
    pub fn set_loop_focus(&self, loop_focus: bool) {
        self.update_config(|config| config.loop_focus = loop_focus);
    }

    fn update_config(&self, f: impl FnOnce(&mut AccordionConfig)) {
        if let Ok(mut guard) = self.config.write() {
            f(&mut guard);
        }
        self.refresh();
    }

    /// Install the render sender on the store, registry and context.
    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender.clone());
        self.focus.registry().install_render(sender.clone());
        self.context.install_render(sender);
    }

    /// Move trigger focus with an arrow, Home or End key.
    pub fn handle_key(&self, key: Key) -> Option<ElementHandle> {
        self.focus.handle_key(key, &self.config().focus_policy())
    }

    /// Mount an item whose trigger sits at `position`.
    ///
    /// A missing value is generated for `String` keys; other key types fail
    /// with [`ConfigError::MissingIdentity`].
    pub fn item(
        &self,
        value: Option<T>,
        position: impl Into<DocumentPosition>,
    ) -> Result<AccordionItem<T>, ConfigError> {
        let value = identity::resolve(value)?;
        let config = self.config();
        let trigger = ElementHandle::new();
        self.focus.registry().register(trigger, position);

        let panel = PanelLifecycle::new(
            PanelConfig::new()
                .keep_mounted(config.keep_mounted)
                .hidden_until_found(config.hidden_until_found)
                .initially_open(self.is_open(&value))
                .css_var_prefix("accordion-panel"),
            Arc::clone(&self.driver),
        );

        let follower = panel.clone();
        let watched = value.clone();
        let subscription = self
            .context
            .consumer()
            .subscribe(move |snapshot| {
                follower.set_open(snapshot.is_open(&watched));
            });

        Ok(AccordionItem {
            value,
            trigger,
            disabled: Arc::new(AtomicBool::new(false)),
            root: self.clone(),
            panel,
            subscription,
        })
    }
}

impl<T: ItemKey> std::fmt::Debug for Accordion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accordion")
            .field("value", &self.value())
            .field("controlled", &self.is_controlled())
            .finish()
    }
}

/// Read-only item state for the attribute layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordionItemSnapshot<T> {
    pub value: T,
    pub index: Option<usize>,
    pub open: bool,
    pub disabled: bool,
    pub tab_index: i32,
    pub panel: PanelSnapshot,
}

/// One accordion item: a trigger registered for roving focus and a panel
/// that follows the root's open set.
pub struct AccordionItem<T: ItemKey> {
    value: T,
    trigger: ElementHandle,
    disabled: Arc<AtomicBool>,
    root: Accordion<T>,
    panel: PanelLifecycle,
    subscription: ListenerId,
}

impl<T: ItemKey> AccordionItem<T> {
    /// The item's identity.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The trigger element.
    pub fn trigger(&self) -> ElementHandle {
        self.trigger
    }

    /// The item's panel.
    pub fn panel(&self) -> &PanelLifecycle {
        &self.panel
    }

    /// Position among mounted items.
    pub fn index(&self) -> Option<usize> {
        self.root.registry().index_of(&self.trigger)
    }

    /// Whether the item is open.
    pub fn is_open(&self) -> bool {
        self.root.is_open(&self.value)
    }

    /// Whether presses are ignored, either here or at the root.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst) || self.root.is_disabled()
    }

    /// Enable or disable this item.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
        self.root.focus().set_disabled(self.trigger, disabled);
    }

    /// Move the trigger after a keyed reorder.
    pub fn reposition(&self, position: impl Into<DocumentPosition>) -> Option<usize> {
        self.root.registry().reposition(self.trigger, position)
    }

    /// Trigger pressed (click, Enter or Space).
    pub fn press(&self) -> bool {
        if self.is_disabled() {
            return false;
        }
        self.root.focus().focus(self.trigger);
        self.root.toggle(&self.value, ChangeReason::TriggerPress)
    }

    /// Keydown on the trigger. Returns true if the key was handled.
    pub fn handle_key(&self, key: Key) -> bool {
        if key.is_activation() {
            return self.press();
        }
        self.root.focus().focus(self.trigger);
        self.root.handle_key(key).is_some()
    }

    /// The host found text inside this item's hidden-until-found panel.
    ///
    /// Opens without animation. If the root does not end up open (canceled
    /// or controlled), the panel follows the root again. A controlled root
    /// that accepted keeps the reveal for the parent's next value.
    pub fn reveal(&self) -> bool {
        if self.is_open() || self.is_disabled() {
            return false;
        }
        self.panel.reveal();
        let accepted = self.root.toggle(&self.value, ChangeReason::BeforeMatch);
        let open = self.is_open();
        self.panel.set_open(open);
        if accepted && !open {
            self.panel.defer_reveal();
        }
        accepted
    }

    /// Snapshot for the attribute layer.
    pub fn snapshot(&self) -> AccordionItemSnapshot<T> {
        AccordionItemSnapshot {
            value: self.value.clone(),
            index: self.index(),
            open: self.is_open(),
            disabled: self.is_disabled(),
            tab_index: self.root.focus().tab_index(&self.trigger),
            panel: self.panel.snapshot(),
        }
    }

    /// Unmount the item: unregister the trigger, stop following the root
    /// and release the panel's driver resources.
    pub async fn unmount(self) -> Result<(), DriverError> {
        self.root.focus().unregister(&self.trigger);
        self.root.context().unsubscribe(self.subscription);
        self.panel.dispose().await
    }
}
