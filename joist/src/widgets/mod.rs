//! Root and item state models for each widget.
//!
//! Widgets own no markup. Hosts read snapshots to render attributes and
//! forward pointer and keyboard events to the press and key handlers.

pub mod accordion;
pub mod checkbox;
pub mod collapsible;
pub mod meter;
pub mod navigation_menu;
pub mod progress;
pub mod radio;
pub mod slider;
pub mod switch;
pub mod toolbar;

pub use accordion::{Accordion, AccordionConfig, AccordionContext, AccordionItem};
pub use checkbox::{CheckedState, Checkbox, CheckboxSnapshot};
pub use collapsible::{Collapsible, CollapsibleConfig, CollapsibleContext};
pub use meter::{Meter, MeterSnapshot};
pub use navigation_menu::{NavigationMenu, NavigationMenuConfig, NavigationMenuItem};
pub use progress::{Progress, ProgressSnapshot, ProgressStatus};
pub use radio::{Radio, RadioConfig, RadioContext, RadioGroup};
pub use slider::{Slider, SliderConfig, SliderSnapshot};
pub use switch::{Switch, SwitchSnapshot};
pub use toolbar::{Toolbar, ToolbarConfig, ToolbarContext, ToolbarItem};

use serde::Serialize;

use crate::error::ConfigError;

/// Numeric bounds shared by progress and meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

impl RangeConfig {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Reject non-finite bounds and `min >= max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Clamp `value` into the range. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the range, 0 to 100.
    pub fn percent(&self, value: f64) -> f64 {
        (self.clamp(value) - self.min) / (self.max - self.min) * 100.0
    }
}
