//! Error types for widget setup and animation driver interop.

use thiserror::Error;

/// Errors raised while configuring a widget.
///
/// These indicate a mistake by the integrator and are returned at
/// construction or attachment time, never from inside an event handler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A store was re-supplied with the opposite control mode.
    #[error("value store control mode is fixed at construction (was_controlled: {was_controlled})")]
    ControlModeSwitch {
        /// Whether the store was controlled at construction.
        was_controlled: bool,
    },

    /// An item was created without a value and its key type cannot
    /// generate one.
    #[error("item value missing and '{type_name}' cannot generate an identity")]
    MissingIdentity {
        /// Type name of the item key.
        type_name: &'static str,
    },

    /// A numeric range with `min >= max` or non-finite bounds.
    #[error("invalid range: min {min} must be less than max {max}")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A slider step that is zero, negative or non-finite.
    #[error("invalid step {step}: must be a positive finite number")]
    InvalidStep {
        /// The rejected step.
        step: f64,
    },
}

/// Errors returned by an [`AnimationDriver`](crate::driver::AnimationDriver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The host page went away while the call was in flight.
    #[error("animation host disconnected")]
    Disconnected,

    /// The host canceled the operation (e.g. navigation).
    #[error("animation operation canceled")]
    Canceled,

    /// Any other failure. Not expected during normal operation.
    #[error("animation driver failed: {0}")]
    Failed(String),
}

impl DriverError {
    /// Whether this failure is an interop failure that callers swallow.
    ///
    /// Disconnection and cancellation look the same as the user leaving the
    /// page, so they are never surfaced.
    pub fn is_interop(&self) -> bool {
        matches!(self, DriverError::Disconnected | DriverError::Canceled)
    }
}
