//! Checkbox widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Tri-state checked value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckedState {
    #[default]
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckedState {
    /// State after a press. Indeterminate resolves to checked.
    pub fn toggled(self) -> Self {
        match self {
            CheckedState::Checked => CheckedState::Unchecked,
            CheckedState::Unchecked | CheckedState::Indeterminate => CheckedState::Checked,
        }
    }

    /// Whether the box is fully checked.
    pub fn is_checked(self) -> bool {
        self == CheckedState::Checked
    }
}

impl From<bool> for CheckedState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckedState::Checked
        } else {
            CheckedState::Unchecked
        }
    }
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckboxSnapshot {
    pub checked: CheckedState,
    pub disabled: bool,
    pub read_only: bool,
    pub required: bool,
}

/// A checkbox with reactive tri-state value.
///
/// Cloning shares the widget.
#[derive(Debug, Clone)]
pub struct Checkbox {
    store: ControlledValueStore<CheckedState>,
    disabled: Arc<AtomicBool>,
    read_only: Arc<AtomicBool>,
    required: bool,
}

impl Checkbox {
    /// Create a checkbox. `checked` makes it controlled.
    pub fn new(checked: Option<CheckedState>, default: CheckedState) -> Self {
        Self {
            store: ControlledValueStore::new(checked, default),
            disabled: Arc::new(AtomicBool::new(false)),
            read_only: Arc::new(AtomicBool::new(false)),
            required: false,
        }
    }

    /// Create an unchecked, uncontrolled checkbox.
    pub fn unchecked() -> Self {
        Self::new(None, CheckedState::Unchecked)
    }

    /// Mark the checkbox as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Current state.
    pub fn checked(&self) -> CheckedState {
        self.store.current()
    }

    /// Check if the checkbox is fully checked
    pub fn is_checked(&self) -> bool {
        self.checked().is_checked()
    }

    /// Check if presses are ignored
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Check if the value is shown but cannot change
    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Snapshot for the attribute layer.
    pub fn snapshot(&self) -> CheckboxSnapshot {
        CheckboxSnapshot {
            checked: self.checked(),
            disabled: self.is_disabled(),
            read_only: self.is_read_only(),
            required: self.required,
        }
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Subscribe to checked change requests.
    pub fn on_checked_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CheckedState, &mut ChangeRequest<CheckedState>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Request a specific state.
    pub fn set_checked(&self, state: CheckedState, reason: ChangeReason) -> bool {
        if self.is_disabled() || self.is_read_only() {
            return false;
        }
        self.store.request_change(state, reason)
    }

    /// Pressed (click or Space).
    pub fn toggle(&self) -> bool {
        self.set_checked(self.checked().toggled(), ChangeReason::TriggerPress)
    }

    /// Keydown. Only Space toggles a checkbox.
    pub fn handle_key(&self, key: Key) -> bool {
        key == Key::Space && self.toggle()
    }

    /// Re-supply the controlled state on a parent render.
    pub fn set_external(&self, checked: Option<CheckedState>) -> Result<bool, ConfigError> {
        self.store.set_external(checked)
    }

    /// Enable or disable the checkbox.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Make the checkbox read-only.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Install the render sender.
    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender);
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the checkbox state has changed
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.store.clear_dirty();
    }
}

impl Default for Checkbox {
    fn default() -> Self {
        Self::unchecked()
    }
}
