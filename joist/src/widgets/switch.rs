//! Switch widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::error::ConfigError;
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchSnapshot {
    pub checked: bool,
    pub disabled: bool,
    pub read_only: bool,
}

/// An on/off switch.
#[derive(Debug, Clone)]
pub struct Switch {
    store: ControlledValueStore<bool>,
    disabled: Arc<AtomicBool>,
    read_only: Arc<AtomicBool>,
}

impl Switch {
    /// Create a switch. `checked` makes it controlled.
    pub fn new(checked: Option<bool>, default_checked: bool) -> Self {
        Self {
            store: ControlledValueStore::new(checked, default_checked),
            disabled: Arc::new(AtomicBool::new(false)),
            read_only: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.store.current()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> SwitchSnapshot {
        SwitchSnapshot {
            checked: self.is_checked(),
            disabled: self.is_disabled(),
            read_only: self.is_read_only(),
        }
    }

    /// Subscribe to checked change requests.
    pub fn on_checked_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&bool, &mut ChangeRequest<bool>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Flip the switch (click, Enter or Space).
    pub fn toggle(&self) -> bool {
        if self.is_disabled() || self.is_read_only() {
            return false;
        }
        self.store
            .request_change(!self.is_checked(), ChangeReason::TriggerPress)
    }

    pub fn handle_key(&self, key: Key) -> bool {
        key.is_activation() && self.toggle()
    }

    /// Re-supply the controlled state on a parent render.
    pub fn set_external(&self, checked: Option<bool>) -> Result<bool, ConfigError> {
        self.store.set_external(checked)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender);
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(None, false)
    }
}
