//! Collapsible widget state: one trigger, one panel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::context::{ContextConsumer, ContextProvider};
use crate::driver::AnimationDriver;
use crate::error::{ConfigError, DriverError};
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::panel::{PanelConfig, PanelLifecycle, PanelSnapshot};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Collapsible configuration.
#[derive(Debug, Clone, Default)]
pub struct CollapsibleConfig {
    pub disabled: bool,
    /// Keep the closed panel in the output.
    pub keep_mounted: bool,
    /// Keep the closed panel in the output, hidden until found.
    pub hidden_until_found: bool,
}

impl CollapsibleConfig {
    /// Create a default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the trigger.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Keep the closed panel mounted.
    pub fn keep_mounted(mut self, keep: bool) -> Self {
        self.keep_mounted = keep;
        self
    }

    /// Hide the closed panel until found.
    pub fn hidden_until_found(mut self, until_found: bool) -> Self {
        self.hidden_until_found = until_found;
        self
    }
}

/// Derived collapsible state broadcast to the trigger and panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollapsibleContext {
    pub open: bool,
    pub disabled: bool,
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollapsibleSnapshot {
    pub open: bool,
    pub disabled: bool,
    pub panel: PanelSnapshot,
}

/// A collapsible region with reactive open state.
///
/// Cloning shares the widget.
#[derive(Debug, Clone)]
pub struct Collapsible {
    store: ControlledValueStore<bool>,
    disabled: Arc<AtomicBool>,
    context: ContextProvider<CollapsibleContext>,
    panel: PanelLifecycle,
}

impl Collapsible {
    /// Create a collapsible. `open` makes it controlled; `default_open`
    /// seeds an uncontrolled one.
    pub fn new(
        config: CollapsibleConfig,
        open: Option<bool>,
        default_open: bool,
        driver: Arc<dyn AnimationDriver>,
    ) -> Self {
        let store = ControlledValueStore::new(open, default_open);
        let is_open = store.current();
        let context = ContextProvider::new(CollapsibleContext {
            open: is_open,
            disabled: config.disabled,
        });
        let panel = PanelLifecycle::new(
            PanelConfig::new()
                .keep_mounted(config.keep_mounted)
                .hidden_until_found(config.hidden_until_found)
                .initially_open(is_open)
                .css_var_prefix("collapsible-panel"),
            driver,
        );
        let follower = panel.clone();
        context.consumer().subscribe(move |snapshot| {
            follower.set_open(snapshot.open);
        });
        Self {
            store,
            disabled: Arc::new(AtomicBool::new(config.disabled)),
            context,
            panel,
        }
    }

    /// Recompute the derived context and broadcast it if it changed.
    pub fn refresh(&self) -> bool {
        self.context.publish(CollapsibleContext {
            open: self.store.current(),
            disabled: self.is_disabled(),
        })
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Check if the collapsible is open
    pub fn is_open(&self) -> bool {
        self.store.current()
    }

    /// Check if the trigger is disabled
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// The panel.
    pub fn panel(&self) -> &PanelLifecycle {
        &self.panel
    }

    /// Read-only handle to the derived context.
    pub fn context(&self) -> ContextConsumer<CollapsibleContext> {
        self.context.consumer()
    }

    /// Snapshot for the attribute layer.
    pub fn snapshot(&self) -> CollapsibleSnapshot {
        CollapsibleSnapshot {
            open: self.is_open(),
            disabled: self.is_disabled(),
            panel: self.panel.snapshot(),
        }
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Subscribe to open change requests.
    pub fn on_open_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&bool, &mut ChangeRequest<bool>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Toggle the open state. Ignored while disabled.
    pub fn toggle(&self, reason: ChangeReason) -> bool {
        if self.is_disabled() {
            return false;
        }
        let accepted = self.store.request_change(!self.store.current(), reason);
        self.refresh();
        accepted
    }

    /// Trigger pressed.
    pub fn press(&self) -> bool {
        self.toggle(ChangeReason::TriggerPress)
    }

    /// Keydown on the trigger. Returns true if handled.
    pub fn handle_key(&self, key: Key) -> bool {
        key.is_activation() && self.press()
    }

    /// The host found text inside the hidden-until-found panel.
    pub fn reveal(&self) -> bool {
        if self.is_open() || self.is_disabled() {
            return false;
        }
        self.panel.reveal();
        let accepted = self.toggle(ChangeReason::BeforeMatch);
        let open = self.is_open();
        self.panel.set_open(open);
        if accepted && !open {
            self.panel.defer_reveal();
        }
        accepted
    }

    /// Re-supply the controlled open state on a parent render.
    pub fn set_open(&self, open: Option<bool>) -> Result<bool, ConfigError> {
        let changed = self.store.set_external(open)?;
        self.refresh();
        Ok(changed)
    }

    /// Enable or disable the trigger.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
        self.refresh();
    }

    /// Install the render sender on the store, context and panel.
    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender.clone());
        self.context.install_render(sender.clone());
        self.panel.install_render(sender);
    }

    /// Tear down the panel.
    pub async fn unmount(self) -> Result<(), DriverError> {
        self.panel.dispose().await
    }
}
