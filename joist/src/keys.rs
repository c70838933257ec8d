//! Keys that widgets react to.

use serde::{Deserialize, Serialize};

/// A navigation or activation key, already decoded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
}

impl Key {
    /// Enter or Space.
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }

    /// One of the four arrows.
    pub fn is_arrow(self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
        )
    }
}
