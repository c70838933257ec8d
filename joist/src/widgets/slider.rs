//! Slider widget state: one or more thumbs on a numeric track.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::ConfigError;
use crate::focus::{Direction, Orientation};
use crate::keys::Key;
use crate::notifier::{ChangeReason, ChangeRequest, ListenerId};
use crate::render::RenderSender;
use crate::state::ControlledValueStore;

/// Slider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Step applied by PageUp and PageDown.
    pub large_step: f64,
    /// Minimum distance between neighbouring thumbs, in steps.
    pub min_steps_between_values: u32,
    pub orientation: Orientation,
    pub direction: Direction,
    pub disabled: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            large_step: 10.0,
            min_steps_between_values: 0,
            orientation: Orientation::Horizontal,
            direction: Direction::Ltr,
            disabled: false,
        }
    }
}

impl SliderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn large_step(mut self, large_step: f64) -> Self {
        self.large_step = large_step;
        self
    }

    pub fn min_steps_between_values(mut self, steps: u32) -> Self {
        self.min_steps_between_values = steps;
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

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Check bounds and steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(ConfigError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        for step in [self.step, self.large_step] {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::InvalidStep { step });
            }
        }
        Ok(())
    }

    /// Snap `value` to the step grid anchored at `min`, then clamp.
    pub fn snap(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        let steps = ((value - self.min) / self.step).round();
        let factor = 10f64.powi(decimals(self.step));
        let snapped = ((self.min + steps * self.step) * factor).round() / factor;
        snapped.clamp(self.min, self.max)
    }

    /// Position of `value` on the track, 0 to 100.
    pub fn percent(&self, value: f64) -> f64 {
        (value.clamp(self.min, self.max) - self.min) / (self.max - self.min) * 100.0
    }

    fn gap(&self) -> f64 {
        f64::from(self.min_steps_between_values) * self.step
    }
}

/// Number of decimal places in `step`, used to strip float noise after
/// snapping.
fn decimals(step: f64) -> i32 {
    let text = step.to_string();
    text.split_once('.')
        .map(|(_, fraction)| fraction.len() as i32)
        .unwrap_or(0)
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderSnapshot {
    pub values: Vec<f64>,
    pub percents: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub orientation: Orientation,
    pub disabled: bool,
}

/// A slider with one or more thumbs.
///
/// Thumb values are kept sorted; moving a thumb stops at its neighbours.
#[derive(Debug, Clone)]
pub struct Slider {
    config: Arc<RwLock<SliderConfig>>,
    store: ControlledValueStore<Vec<f64>>,
}

impl Slider {
    /// Create a slider. `values` being `Some` makes it controlled.
    ///
    /// Initial values are snapped, clamped and sorted.
    pub fn new(
        config: SliderConfig,
        values: Option<Vec<f64>>,
        default: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalize = |mut values: Vec<f64>| {
            for value in values.iter_mut() {
                *value = config.snap(*value);
            }
            values.sort_by(f64::total_cmp);
            values
        };
        let store = ControlledValueStore::new(values.map(normalize), normalize(default));
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
        })
    }

    fn config(&self) -> SliderConfig {
        self.config
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    pub fn values(&self) -> Vec<f64> {
        self.store.current()
    }

    pub fn value(&self, thumb: usize) -> Option<f64> {
        self.store.with(|values| values.get(thumb).copied())
    }

    pub fn thumb_count(&self) -> usize {
        self.store.with(Vec::len)
    }

    pub fn is_disabled(&self) -> bool {
        self.config().disabled
    }

    pub fn is_controlled(&self) -> bool {
        self.store.is_controlled()
    }

    pub fn snapshot(&self) -> SliderSnapshot {
        let config = self.config();
        let values = self.values();
        SliderSnapshot {
            percents: values.iter().map(|v| config.percent(*v)).collect(),
            values,
            min: config.min,
            max: config.max,
            orientation: config.orientation,
            disabled: config.disabled,
        }
    }

    // -------------------------------------------------------------------------
    // Write methods
    // -------------------------------------------------------------------------

    /// Subscribe to value change requests.
    pub fn on_value_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Vec<f64>, &mut ChangeRequest<Vec<f64>>) + Send + Sync + 'static,
    {
        self.store.on_change(listener)
    }

    /// Move `thumb` toward `value`. The result is snapped, clamped and kept
    /// between the neighbouring thumbs.
    pub fn set_thumb(&self, thumb: usize, value: f64, reason: ChangeReason) -> bool {
        let config = self.config();
        if config.disabled {
            return false;
        }
        let mut values = self.values();
        if thumb >= values.len() {
            return false;
        }
        let gap = config.gap();
        let lower = match thumb {
            0 => config.min,
            _ => values[thumb - 1] + gap,
        };
        let upper = values.get(thumb + 1).map_or(config.max, |next| next - gap);
        let snapped = config.snap(value);
        values[thumb] = if lower <= upper {
            snapped.clamp(lower, upper)
        } else {
            values[thumb]
        };
        self.store.request_change(values, reason)
    }

    /// Keydown on `thumb`. Returns whether the value changed.
    pub fn handle_key(&self, thumb: usize, key: Key) -> bool {
        let config = self.config();
        let Some(current) = self.value(thumb) else {
            return false;
        };
        let rtl = config.orientation == Orientation::Horizontal
            && config.direction == Direction::Rtl;
        let target = match key {
            Key::ArrowUp => current + config.step,
            Key::ArrowDown => current - config.step,
            Key::ArrowRight if rtl => current - config.step,
            Key::ArrowRight => current + config.step,
            Key::ArrowLeft if rtl => current + config.step,
            Key::ArrowLeft => current - config.step,
            Key::PageUp => current + config.large_step,
            Key::PageDown => current - config.large_step,
            Key::Home => config.min,
            Key::End => config.max,
            _ => return false,
        };
        self.set_thumb(thumb, target, ChangeReason::Keyboard)
    }

    /// Re-supply the controlled values on a parent render.
    pub fn set_values(&self, values: Option<Vec<f64>>) -> Result<bool, ConfigError> {
        self.store.set_external(values)
    }

    pub fn set_disabled(&self, disabled: bool) {
        if let Ok(mut guard) = self.config.write() {
            guard.disabled = disabled;
        }
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.store.install_render(sender);
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn clear_dirty(&self) {
        self.store.clear_dirty();
    }
}
